//! # Charge Repository
//!
//! Taxes and service fees. A charge is either a fixed amount in cents or a
//! percentage in basis points, see [`bistro_core::money::Adjustment`].

use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use super::{Page, PageRequest};
use crate::error::{DbError, DbResult};
use bistro_core::{AdjustmentKind, Charge};

#[derive(Debug, Clone, Deserialize)]
pub struct ChargeInput {
    pub name: String,
    pub charge_type: AdjustmentKind,
    pub value: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

const COLUMNS: &str = "id, name, charge_type, value, is_active, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct ChargeRepository {
    pool: SqlitePool,
}

impl ChargeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ChargeRepository { pool }
    }

    pub async fn list(&self, page: PageRequest) -> DbResult<Page<Charge>> {
        let items: Vec<Charge> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM charges ORDER BY name LIMIT ?1 OFFSET ?2"
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM charges")
            .fetch_one(&self.pool)
            .await?;

        Ok(Page {
            items,
            total,
            request: page,
        })
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Charge>> {
        let charge = sqlx::query_as(&format!("SELECT {COLUMNS} FROM charges WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(charge)
    }

    pub async fn insert(&self, input: &ChargeInput) -> DbResult<Charge> {
        let now = Utc::now();
        let charge = Charge {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            charge_type: input.charge_type,
            value: input.value,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %charge.id, name = %charge.name, "Inserting charge");

        sqlx::query(
            "INSERT INTO charges (id, name, charge_type, value, is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&charge.id)
        .bind(&charge.name)
        .bind(charge.charge_type)
        .bind(charge.value)
        .bind(charge.is_active)
        .bind(charge.created_at)
        .bind(charge.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(charge)
    }

    pub async fn update(&self, id: &str, input: &ChargeInput) -> DbResult<Charge> {
        let result = sqlx::query(
            "UPDATE charges
             SET name = ?2, charge_type = ?3, value = ?4, is_active = ?5, updated_at = ?6
             WHERE id = ?1",
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.charge_type)
        .bind(input.value)
        .bind(input.is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Charge", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Charge", id))
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM charges WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Charge", id));
        }
        Ok(())
    }
}
