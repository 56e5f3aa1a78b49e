//! # Menu Item Repository
//!
//! Menu items plus their many-to-many relations to addons, charges and
//! variants.
//!
//! ## Relations
//! ```text
//! menu_items ──< item_addons   >── addons
//!            ──< item_charges  >── charges
//!            ──< item_variants >── variants ──< variant_options
//! ```
//! Relation lists are replaced wholesale (`set_addons` etc.), matching how
//! the dashboard edits them.

use chrono::Utc;
use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use super::{like_pattern, Page, PageRequest};
use crate::error::{DbError, DbResult};
use bistro_core::{
    Addon, AdjustmentKind, Charge, MenuItem, MenuItemDetail, Variant, VariantOption,
    VariantWithOptions,
};

#[derive(Debug, Clone, Deserialize)]
pub struct MenuItemInput {
    pub category_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub discount_type: Option<AdjustmentKind>,
    #[serde(default)]
    pub discount_value: i64,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub sort_order: i64,
}

fn default_true() -> bool {
    true
}

/// Filters for listing menu items.
#[derive(Debug, Clone, Default)]
pub struct MenuItemFilter {
    pub category_id: Option<String>,
    /// Substring match on the name.
    pub search: Option<String>,
    pub available_only: bool,
}

/// Which pivot table a relation lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Addons,
    Charges,
    Variants,
}

impl Relation {
    fn table(&self) -> &'static str {
        match self {
            Relation::Addons => "item_addons",
            Relation::Charges => "item_charges",
            Relation::Variants => "item_variants",
        }
    }

    fn column(&self) -> &'static str {
        match self {
            Relation::Addons => "addon_id",
            Relation::Charges => "charge_id",
            Relation::Variants => "variant_id",
        }
    }
}

const COLUMNS: &str = "id, category_id, name, description, price_cents, discount_type, \
                       discount_value, is_available, is_featured, sort_order, created_at, updated_at";

const FILTER: &str = "(?1 IS NULL OR category_id = ?1)
     AND (?2 IS NULL OR name LIKE ?2 ESCAPE '\\')
     AND (?3 = 0 OR is_available = 1)";

#[derive(Debug, Clone)]
pub struct MenuItemRepository {
    pool: SqlitePool,
}

impl MenuItemRepository {
    pub fn new(pool: SqlitePool) -> Self {
        MenuItemRepository { pool }
    }

    pub async fn list(&self, filter: &MenuItemFilter, page: PageRequest) -> DbResult<Page<MenuItem>> {
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);

        let items: Vec<MenuItem> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM menu_items WHERE {FILTER}
             ORDER BY sort_order, name LIMIT ?4 OFFSET ?5"
        ))
        .bind(&filter.category_id)
        .bind(&search)
        .bind(filter.available_only)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM menu_items WHERE {FILTER}"))
            .bind(&filter.category_id)
            .bind(&search)
            .bind(filter.available_only)
            .fetch_one(&self.pool)
            .await?;

        Ok(Page {
            items,
            total,
            request: page,
        })
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<MenuItem>> {
        let item = sqlx::query_as(&format!("SELECT {COLUMNS} FROM menu_items WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    /// Loads an item with its addons, charges and variants (with options).
    pub async fn get_detail(&self, id: &str) -> DbResult<Option<MenuItemDetail>> {
        let Some(item) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let addons: Vec<Addon> = sqlx::query_as(
            "SELECT a.id, a.name, a.price_cents, a.is_active, a.created_at, a.updated_at
             FROM addons a JOIN item_addons ia ON ia.addon_id = a.id
             WHERE ia.menu_item_id = ?1 ORDER BY a.name",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let charges: Vec<Charge> = sqlx::query_as(
            "SELECT c.id, c.name, c.charge_type, c.value, c.is_active, c.created_at, c.updated_at
             FROM charges c JOIN item_charges ic ON ic.charge_id = c.id
             WHERE ic.menu_item_id = ?1 ORDER BY c.name",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let variant_rows: Vec<Variant> = sqlx::query_as(
            "SELECT v.id, v.name, v.created_at, v.updated_at
             FROM variants v JOIN item_variants iv ON iv.variant_id = v.id
             WHERE iv.menu_item_id = ?1 ORDER BY v.name",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let mut variants = Vec::with_capacity(variant_rows.len());
        for variant in variant_rows {
            let options: Vec<VariantOption> = sqlx::query_as(
                "SELECT id, variant_id, name, price_cents, sort_order FROM variant_options
                 WHERE variant_id = ?1 ORDER BY sort_order, name",
            )
            .bind(&variant.id)
            .fetch_all(&self.pool)
            .await?;
            variants.push(VariantWithOptions { variant, options });
        }

        Ok(Some(MenuItemDetail {
            item,
            addons,
            charges,
            variants,
        }))
    }

    pub async fn insert(&self, input: &MenuItemInput) -> DbResult<MenuItem> {
        let now = Utc::now();
        let item = MenuItem {
            id: Uuid::new_v4().to_string(),
            category_id: input.category_id.clone(),
            name: input.name.trim().to_string(),
            description: input.description.clone(),
            price_cents: input.price_cents,
            discount_type: input.discount_type,
            discount_value: input.discount_value,
            is_available: input.is_available,
            is_featured: input.is_featured,
            sort_order: input.sort_order,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %item.id, name = %item.name, "Inserting menu item");

        sqlx::query(&format!(
            "INSERT INTO menu_items ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
        ))
        .bind(&item.id)
        .bind(&item.category_id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price_cents)
        .bind(item.discount_type)
        .bind(item.discount_value)
        .bind(item.is_available)
        .bind(item.is_featured)
        .bind(item.sort_order)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(item)
    }

    pub async fn update(&self, id: &str, input: &MenuItemInput) -> DbResult<MenuItem> {
        let result = sqlx::query(
            "UPDATE menu_items SET
                category_id = ?2, name = ?3, description = ?4, price_cents = ?5,
                discount_type = ?6, discount_value = ?7, is_available = ?8,
                is_featured = ?9, sort_order = ?10, updated_at = ?11
             WHERE id = ?1",
        )
        .bind(id)
        .bind(&input.category_id)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.price_cents)
        .bind(input.discount_type)
        .bind(input.discount_value)
        .bind(input.is_available)
        .bind(input.is_featured)
        .bind(input.sort_order)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("MenuItem", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("MenuItem", id))
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM menu_items WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("MenuItem", id));
        }
        Ok(())
    }

    /// Switches availability for many items at once. Returns rows changed.
    pub async fn bulk_set_available(&self, ids: &[String], is_available: bool) -> DbResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE menu_items SET is_available = ");
        query.push_bind(is_available);
        query.push(", updated_at = ");
        query.push_bind(Utc::now());
        query.push(" WHERE id IN (");
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        let result = query.build().execute(&self.pool).await?;

        info!(requested = ids.len(), updated = result.rows_affected(), is_available, "Bulk availability update");
        Ok(result.rows_affected())
    }

    /// Deletes many items at once. Returns rows deleted.
    pub async fn bulk_delete(&self, ids: &[String]) -> DbResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("DELETE FROM menu_items WHERE id IN (");
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        let result = query.build().execute(&self.pool).await?;

        info!(requested = ids.len(), deleted = result.rows_affected(), "Bulk delete of menu items");
        Ok(result.rows_affected())
    }

    /// Replaces the item's related ids for one relation.
    ///
    /// Unknown ids fail the whole call with a foreign key violation.
    pub async fn set_relation(&self, id: &str, relation: Relation, related_ids: &[String]) -> DbResult<()> {
        if self.get_by_id(id).await?.is_none() {
            return Err(DbError::not_found("MenuItem", id));
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!("DELETE FROM {} WHERE menu_item_id = ?1", relation.table()))
            .bind(id)
            .execute(&mut *tx)
            .await?;

        for related in related_ids {
            sqlx::query(&format!(
                "INSERT OR IGNORE INTO {} (menu_item_id, {}) VALUES (?1, ?2)",
                relation.table(),
                relation.column()
            ))
            .bind(id)
            .bind(related)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        debug!(menu_item_id = %id, relation = relation.table(), count = related_ids.len(), "Relation replaced");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::addon::AddonInput;
    use crate::test_support::{menu_item_input, test_db};

    use super::*;

    #[tokio::test]
    async fn test_list_filters() {
        let db = test_db().await;
        let repo = db.menu_items();
        repo.insert(&menu_item_input("Margherita", 900)).await.unwrap();
        repo.insert(&menu_item_input("Marinara", 800)).await.unwrap();
        let mut hidden = menu_item_input("Calzone", 1100);
        hidden.is_available = false;
        repo.insert(&hidden).await.unwrap();

        let all = repo.list(&MenuItemFilter::default(), PageRequest::default()).await.unwrap();
        assert_eq!(all.total, 3);

        let filter = MenuItemFilter {
            search: Some("mar".into()),
            ..Default::default()
        };
        assert_eq!(repo.list(&filter, PageRequest::default()).await.unwrap().total, 2);

        let filter = MenuItemFilter {
            available_only: true,
            ..Default::default()
        };
        assert_eq!(repo.list(&filter, PageRequest::default()).await.unwrap().total, 2);
    }

    #[tokio::test]
    async fn test_pagination() {
        let db = test_db().await;
        let repo = db.menu_items();
        for i in 0..5 {
            repo.insert(&menu_item_input(&format!("Dish {}", i), 100)).await.unwrap();
        }

        let page = repo
            .list(&MenuItemFilter::default(), PageRequest::new(Some(2), Some(2)))
            .await
            .unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.last_page(), 3);
    }

    #[tokio::test]
    async fn test_bulk_operations() {
        let db = test_db().await;
        let repo = db.menu_items();
        let a = repo.insert(&menu_item_input("A", 100)).await.unwrap();
        let b = repo.insert(&menu_item_input("B", 100)).await.unwrap();
        let c = repo.insert(&menu_item_input("C", 100)).await.unwrap();

        let changed = repo
            .bulk_set_available(&[a.id.clone(), b.id.clone()], false)
            .await
            .unwrap();
        assert_eq!(changed, 2);
        assert!(!repo.get_by_id(&a.id).await.unwrap().unwrap().is_available);
        assert!(repo.get_by_id(&c.id).await.unwrap().unwrap().is_available);

        let deleted = repo.bulk_delete(&[a.id.clone(), c.id.clone()]).await.unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(repo.bulk_delete(&[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_relations_and_detail() {
        let db = test_db().await;
        let item = db.menu_items().insert(&menu_item_input("Burger", 1000)).await.unwrap();
        let cheese = db
            .addons()
            .insert(&AddonInput {
                name: "Cheese".into(),
                price_cents: 100,
                is_active: true,
            })
            .await
            .unwrap();

        db.menu_items()
            .set_relation(&item.id, Relation::Addons, &[cheese.id.clone()])
            .await
            .unwrap();

        let detail = db.menu_items().get_detail(&item.id).await.unwrap().unwrap();
        assert_eq!(detail.addons.len(), 1);
        assert!(detail.charges.is_empty());

        let unknown = db
            .menu_items()
            .set_relation(&item.id, Relation::Charges, &["missing".to_string()])
            .await;
        assert!(matches!(unknown, Err(DbError::ForeignKeyViolation { .. })));

        // Deleting the addon removes the pivot row
        db.addons().delete(&cheese.id).await.unwrap();
        let detail = db.menu_items().get_detail(&item.id).await.unwrap().unwrap();
        assert!(detail.addons.is_empty());
    }
}
