//! # Variant Repository
//!
//! Variants own their options: saving a variant replaces its option list in
//! one transaction, deleting it cascades to the options.

use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use super::{Page, PageRequest};
use crate::error::{DbError, DbResult};
use bistro_core::{Variant, VariantOption, VariantWithOptions};

#[derive(Debug, Clone, Deserialize)]
pub struct VariantOptionInput {
    pub name: String,
    #[serde(default)]
    pub price_cents: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VariantInput {
    pub name: String,
    #[serde(default)]
    pub options: Vec<VariantOptionInput>,
}

#[derive(Debug, Clone)]
pub struct VariantRepository {
    pool: SqlitePool,
}

impl VariantRepository {
    pub fn new(pool: SqlitePool) -> Self {
        VariantRepository { pool }
    }

    pub async fn list(&self, page: PageRequest) -> DbResult<Page<VariantWithOptions>> {
        let variants: Vec<Variant> = sqlx::query_as(
            "SELECT id, name, created_at, updated_at FROM variants
             ORDER BY name LIMIT ?1 OFFSET ?2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM variants")
            .fetch_one(&self.pool)
            .await?;

        let mut items = Vec::with_capacity(variants.len());
        for variant in variants {
            let options = self.options_of(&variant.id).await?;
            items.push(VariantWithOptions { variant, options });
        }

        Ok(Page {
            items,
            total,
            request: page,
        })
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<VariantWithOptions>> {
        let variant: Option<Variant> =
            sqlx::query_as("SELECT id, name, created_at, updated_at FROM variants WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match variant {
            Some(variant) => {
                let options = self.options_of(&variant.id).await?;
                Ok(Some(VariantWithOptions { variant, options }))
            }
            None => Ok(None),
        }
    }

    pub async fn options_of(&self, variant_id: &str) -> DbResult<Vec<VariantOption>> {
        let options = sqlx::query_as(
            "SELECT id, variant_id, name, price_cents, sort_order FROM variant_options
             WHERE variant_id = ?1 ORDER BY sort_order, name",
        )
        .bind(variant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(options)
    }

    pub async fn insert(&self, input: &VariantInput) -> DbResult<VariantWithOptions> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(id = %id, name = %input.name, options = input.options.len(), "Inserting variant");

        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO variants (id, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)")
            .bind(&id)
            .bind(input.name.trim())
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        replace_options(&mut tx, &id, &input.options).await?;

        tx.commit().await?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| DbError::not_found("Variant", &id))
    }

    /// Renames the variant and replaces all of its options.
    pub async fn update(&self, id: &str, input: &VariantInput) -> DbResult<VariantWithOptions> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE variants SET name = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(input.name.trim())
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Variant", id));
        }

        replace_options(&mut tx, id, &input.options).await?;

        tx.commit().await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Variant", id))
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM variants WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Variant", id));
        }
        Ok(())
    }
}

async fn replace_options(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    variant_id: &str,
    options: &[VariantOptionInput],
) -> DbResult<()> {
    sqlx::query("DELETE FROM variant_options WHERE variant_id = ?1")
        .bind(variant_id)
        .execute(&mut **tx)
        .await?;

    for (position, option) in options.iter().enumerate() {
        sqlx::query(
            "INSERT INTO variant_options (id, variant_id, name, price_cents, sort_order)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(variant_id)
        .bind(option.name.trim())
        .bind(option.price_cents)
        .bind(position as i64)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}
