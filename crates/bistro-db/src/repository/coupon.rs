//! # Coupon Repository
//!
//! Codes are unique case-insensitively (`COLLATE NOCASE`) and stored
//! upper-case.
//!
//! ## Redemption
//! `used_count` is only ever incremented through [`redeem`], a conditional
//! `UPDATE` that refuses once the limit is hit. Two checkouts racing for the
//! last use cannot both succeed.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use super::{Page, PageRequest};
use crate::error::{DbError, DbResult};
use bistro_core::{AdjustmentKind, Coupon};

#[derive(Debug, Clone, Deserialize)]
pub struct CouponInput {
    pub code: String,
    pub discount_type: AdjustmentKind,
    pub discount_value: i64,
    #[serde(default)]
    pub min_order_cents: i64,
    pub max_discount_cents: Option<i64>,
    pub usage_limit: Option<i64>,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

const COLUMNS: &str = "id, code, discount_type, discount_value, min_order_cents, max_discount_cents, \
                       usage_limit, used_count, starts_at, expires_at, is_active, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct CouponRepository {
    pool: SqlitePool,
}

impl CouponRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CouponRepository { pool }
    }

    pub async fn list(&self, page: PageRequest) -> DbResult<Page<Coupon>> {
        let items: Vec<Coupon> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM coupons ORDER BY created_at DESC LIMIT ?1 OFFSET ?2"
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM coupons")
            .fetch_one(&self.pool)
            .await?;

        Ok(Page {
            items,
            total,
            request: page,
        })
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Coupon>> {
        let coupon = sqlx::query_as(&format!("SELECT {COLUMNS} FROM coupons WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(coupon)
    }

    /// Case-insensitive lookup.
    pub async fn find_by_code(&self, code: &str) -> DbResult<Option<Coupon>> {
        let coupon = sqlx::query_as(&format!("SELECT {COLUMNS} FROM coupons WHERE code = ?1"))
            .bind(code.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(coupon)
    }

    pub async fn insert(&self, input: &CouponInput) -> DbResult<Coupon> {
        let now = Utc::now();
        let coupon = Coupon {
            id: Uuid::new_v4().to_string(),
            code: input.code.trim().to_uppercase(),
            discount_type: input.discount_type,
            discount_value: input.discount_value,
            min_order_cents: input.min_order_cents,
            max_discount_cents: input.max_discount_cents,
            usage_limit: input.usage_limit,
            used_count: 0,
            starts_at: input.starts_at,
            expires_at: input.expires_at,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %coupon.id, code = %coupon.code, "Inserting coupon");

        sqlx::query(&format!(
            "INSERT INTO coupons ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
        ))
        .bind(&coupon.id)
        .bind(&coupon.code)
        .bind(coupon.discount_type)
        .bind(coupon.discount_value)
        .bind(coupon.min_order_cents)
        .bind(coupon.max_discount_cents)
        .bind(coupon.usage_limit)
        .bind(coupon.used_count)
        .bind(coupon.starts_at)
        .bind(coupon.expires_at)
        .bind(coupon.is_active)
        .bind(coupon.created_at)
        .bind(coupon.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(coupon)
    }

    /// Updates everything but `used_count`.
    pub async fn update(&self, id: &str, input: &CouponInput) -> DbResult<Coupon> {
        let result = sqlx::query(
            "UPDATE coupons SET
                code = ?2, discount_type = ?3, discount_value = ?4, min_order_cents = ?5,
                max_discount_cents = ?6, usage_limit = ?7, starts_at = ?8, expires_at = ?9,
                is_active = ?10, updated_at = ?11
             WHERE id = ?1",
        )
        .bind(id)
        .bind(input.code.trim().to_uppercase())
        .bind(input.discount_type)
        .bind(input.discount_value)
        .bind(input.min_order_cents)
        .bind(input.max_discount_cents)
        .bind(input.usage_limit)
        .bind(input.starts_at)
        .bind(input.expires_at)
        .bind(input.is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Coupon", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Coupon", id))
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM coupons WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Coupon", id));
        }
        Ok(())
    }
}

/// Consumes one use of a coupon inside an open transaction.
///
/// Returns `false` when the usage limit is already reached.
pub async fn redeem(tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>, coupon_id: &str) -> DbResult<bool> {
    let result = sqlx::query(
        "UPDATE coupons SET used_count = used_count + 1, updated_at = ?2
         WHERE id = ?1 AND (usage_limit IS NULL OR used_count < usage_limit)",
    )
    .bind(coupon_id)
    .bind(Utc::now())
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected() == 1)
}
