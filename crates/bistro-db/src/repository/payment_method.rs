//! # Payment Method Repository
//!
//! The set of methods is fixed by the migration (`cash`, `stripe`,
//! `paypal`); staff only switch them on and off.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};
use bistro_core::PaymentMethod;

const COLUMNS: &str = "code, name, is_enabled, sort_order, updated_at";

#[derive(Debug, Clone)]
pub struct PaymentMethodRepository {
    pool: SqlitePool,
}

impl PaymentMethodRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PaymentMethodRepository { pool }
    }

    pub async fn list(&self, enabled_only: bool) -> DbResult<Vec<PaymentMethod>> {
        let methods = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM payment_methods
             WHERE (?1 = 0 OR is_enabled = 1)
             ORDER BY sort_order, code"
        ))
        .bind(enabled_only)
        .fetch_all(&self.pool)
        .await?;
        Ok(methods)
    }

    pub async fn get(&self, code: &str) -> DbResult<Option<PaymentMethod>> {
        let method = sqlx::query_as(&format!("SELECT {COLUMNS} FROM payment_methods WHERE code = ?1"))
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(method)
    }

    pub async fn set_enabled(&self, code: &str, is_enabled: bool) -> DbResult<PaymentMethod> {
        let result = sqlx::query("UPDATE payment_methods SET is_enabled = ?2, updated_at = ?3 WHERE code = ?1")
            .bind(code)
            .bind(is_enabled)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PaymentMethod", code));
        }

        info!(code = %code, is_enabled, "Payment method toggled");

        self.get(code)
            .await?
            .ok_or_else(|| DbError::not_found("PaymentMethod", code))
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::test_db;

    use super::*;

    #[tokio::test]
    async fn test_seeded_methods() {
        let db = test_db().await;
        let all = db.payment_methods().list(false).await.unwrap();
        let codes: Vec<&str> = all.iter().map(|m| m.code.as_str()).collect();
        assert_eq!(codes, vec!["cash", "stripe", "paypal"]);

        let enabled = db.payment_methods().list(true).await.unwrap();
        assert_eq!(enabled.len(), 1);
    }

    #[tokio::test]
    async fn test_toggle() {
        let db = test_db().await;
        let stripe = db.payment_methods().set_enabled("stripe", true).await.unwrap();
        assert!(stripe.is_enabled);
        assert_eq!(db.payment_methods().list(true).await.unwrap().len(), 2);

        assert!(matches!(
            db.payment_methods().set_enabled("venmo", true).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
