//! # Setting Repository
//!
//! A small key/value table for store-wide settings such as the delivery fee
//! and the currency.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::error::DbResult;
use bistro_core::{Money, Setting, DEFAULT_CURRENCY, SETTING_CURRENCY, SETTING_DELIVERY_CHARGE};

#[derive(Debug, Clone)]
pub struct SettingRepository {
    pool: SqlitePool,
}

impl SettingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SettingRepository { pool }
    }

    pub async fn all(&self) -> DbResult<Vec<Setting>> {
        let settings = sqlx::query_as("SELECT key, value, updated_at FROM settings ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(settings)
    }

    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    /// Inserts or overwrites a setting.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<Setting> {
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await?;

        info!(key = %key, "Setting updated");

        Ok(Setting {
            key: key.to_string(),
            value: value.to_string(),
            updated_at: now,
        })
    }

    /// Delivery fee. Missing or malformed values count as zero.
    pub async fn delivery_charge(&self) -> DbResult<Money> {
        let cents = match self.get(SETTING_DELIVERY_CHARGE).await? {
            Some(raw) => raw.trim().parse::<i64>().unwrap_or_else(|_| {
                warn!(value = %raw, "Ignoring malformed delivery charge setting");
                0
            }),
            None => 0,
        };
        Ok(Money::from_cents(cents).non_negative())
    }

    /// Store currency code, upper-case.
    pub async fn currency(&self) -> DbResult<String> {
        let currency = self
            .get(SETTING_CURRENCY)
            .await?
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        Ok(currency)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::test_db;

    use super::*;

    #[tokio::test]
    async fn test_defaults_from_migration() {
        let db = test_db().await;
        assert_eq!(db.settings().delivery_charge().await.unwrap(), Money::zero());
        assert_eq!(db.settings().currency().await.unwrap(), "USD");
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let db = test_db().await;
        db.settings().set(SETTING_DELIVERY_CHARGE, "350").await.unwrap();
        db.settings().set(SETTING_CURRENCY, "jpy").await.unwrap();

        assert_eq!(db.settings().delivery_charge().await.unwrap().cents(), 350);
        assert_eq!(db.settings().currency().await.unwrap(), "JPY");

        db.settings().set(SETTING_DELIVERY_CHARGE, "abc").await.unwrap();
        assert_eq!(db.settings().delivery_charge().await.unwrap(), Money::zero());
    }
}
