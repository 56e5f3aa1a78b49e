//! # Addon Repository

use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use super::{Page, PageRequest};
use crate::error::{DbError, DbResult};
use bistro_core::Addon;

#[derive(Debug, Clone, Deserialize)]
pub struct AddonInput {
    pub name: String,
    pub price_cents: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

const COLUMNS: &str = "id, name, price_cents, is_active, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct AddonRepository {
    pool: SqlitePool,
}

impl AddonRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AddonRepository { pool }
    }

    pub async fn list(&self, page: PageRequest) -> DbResult<Page<Addon>> {
        let items: Vec<Addon> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM addons ORDER BY name LIMIT ?1 OFFSET ?2"
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM addons")
            .fetch_one(&self.pool)
            .await?;

        Ok(Page {
            items,
            total,
            request: page,
        })
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Addon>> {
        let addon = sqlx::query_as(&format!("SELECT {COLUMNS} FROM addons WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(addon)
    }

    pub async fn insert(&self, input: &AddonInput) -> DbResult<Addon> {
        let now = Utc::now();
        let addon = Addon {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            price_cents: input.price_cents,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %addon.id, name = %addon.name, "Inserting addon");

        sqlx::query(
            "INSERT INTO addons (id, name, price_cents, is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&addon.id)
        .bind(&addon.name)
        .bind(addon.price_cents)
        .bind(addon.is_active)
        .bind(addon.created_at)
        .bind(addon.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(addon)
    }

    pub async fn update(&self, id: &str, input: &AddonInput) -> DbResult<Addon> {
        let result = sqlx::query(
            "UPDATE addons SET name = ?2, price_cents = ?3, is_active = ?4, updated_at = ?5
             WHERE id = ?1",
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.price_cents)
        .bind(input.is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Addon", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Addon", id))
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM addons WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Addon", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::test_db;

    use super::*;

    #[tokio::test]
    async fn test_crud() {
        let db = test_db().await;
        let repo = db.addons();

        let addon = repo
            .insert(&AddonInput {
                name: "Extra cheese".into(),
                price_cents: 150,
                is_active: true,
            })
            .await
            .unwrap();

        let updated = repo
            .update(
                &addon.id,
                &AddonInput {
                    name: "Extra cheese".into(),
                    price_cents: 200,
                    is_active: true,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.price_cents, 200);
        assert_eq!(repo.list(PageRequest::default()).await.unwrap().total, 1);

        repo.delete(&addon.id).await.unwrap();
        assert!(repo.get_by_id(&addon.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_negative_price_rejected_by_schema() {
        let db = test_db().await;
        let result = db
            .addons()
            .insert(&AddonInput {
                name: "Broken".into(),
                price_cents: -1,
                is_active: true,
            })
            .await;
        assert!(matches!(result, Err(DbError::CheckViolation { .. })));
    }
}
