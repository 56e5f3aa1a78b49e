//! # Category Repository

use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use super::{Page, PageRequest};
use crate::error::{DbError, DbResult};
use bistro_core::Category;

/// Fields an admin may set on a category. Used for create and full update.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i64,
}

fn default_true() -> bool {
    true
}

const COLUMNS: &str = "id, name, description, is_active, sort_order, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    pub async fn list(&self, active_only: bool, page: PageRequest) -> DbResult<Page<Category>> {
        let items: Vec<Category> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM categories
             WHERE (?1 = 0 OR is_active = 1)
             ORDER BY sort_order, name
             LIMIT ?2 OFFSET ?3"
        ))
        .bind(active_only)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE (?1 = 0 OR is_active = 1)")
                .bind(active_only)
                .fetch_one(&self.pool)
                .await?;

        Ok(Page {
            items,
            total,
            request: page,
        })
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as(&format!("SELECT {COLUMNS} FROM categories WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    pub async fn insert(&self, input: &CategoryInput) -> DbResult<Category> {
        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            description: input.description.clone(),
            is_active: input.is_active,
            sort_order: input.sort_order,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %category.id, name = %category.name, "Inserting category");

        sqlx::query(
            "INSERT INTO categories (id, name, description, is_active, sort_order, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.is_active)
        .bind(category.sort_order)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(category)
    }

    pub async fn update(&self, id: &str, input: &CategoryInput) -> DbResult<Category> {
        let result = sqlx::query(
            "UPDATE categories
             SET name = ?2, description = ?3, is_active = ?4, sort_order = ?5, updated_at = ?6
             WHERE id = ?1",
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.is_active)
        .bind(input.sort_order)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Category", id))
    }

    /// Deletes a category. Its menu items keep existing without a category.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::test_db;

    use super::*;

    fn input(name: &str, is_active: bool) -> CategoryInput {
        CategoryInput {
            name: name.to_string(),
            description: None,
            is_active,
            sort_order: 0,
        }
    }

    #[tokio::test]
    async fn test_crud() {
        let db = test_db().await;
        let repo = db.categories();

        let created = repo.insert(&input(" Pasta ", true)).await.unwrap();
        assert_eq!(created.name, "Pasta");

        let updated = repo.update(&created.id, &input("Pizza", false)).await.unwrap();
        assert_eq!(updated.name, "Pizza");
        assert!(!updated.is_active);

        repo.delete(&created.id).await.unwrap();
        assert!(repo.get_by_id(&created.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(&created.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_active_only() {
        let db = test_db().await;
        let repo = db.categories();
        repo.insert(&input("Starters", true)).await.unwrap();
        repo.insert(&input("Hidden", false)).await.unwrap();

        let all = repo.list(false, PageRequest::default()).await.unwrap();
        assert_eq!(all.total, 2);

        let active = repo.list(true, PageRequest::default()).await.unwrap();
        assert_eq!(active.total, 1);
        assert_eq!(active.items[0].name, "Starters");
    }
}
