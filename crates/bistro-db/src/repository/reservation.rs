//! # Reservation Repository

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use super::{Page, PageRequest};
use crate::error::{DbError, DbResult};
use bistro_core::{Reservation, ReservationStatus};

#[derive(Debug, Clone, Deserialize)]
pub struct ReservationInput {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub party_size: i64,
    pub reserved_for: DateTime<Utc>,
    pub notes: Option<String>,
}

const COLUMNS: &str = "id, customer_name, customer_phone, customer_email, party_size, reserved_for, \
                       status, notes, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct ReservationRepository {
    pool: SqlitePool,
}

impl ReservationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReservationRepository { pool }
    }

    /// Upcoming first.
    pub async fn list(&self, status: Option<ReservationStatus>, page: PageRequest) -> DbResult<Page<Reservation>> {
        let items: Vec<Reservation> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM reservations
             WHERE (?1 IS NULL OR status = ?1)
             ORDER BY reserved_for LIMIT ?2 OFFSET ?3"
        ))
        .bind(status)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservations WHERE (?1 IS NULL OR status = ?1)")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;

        Ok(Page {
            items,
            total,
            request: page,
        })
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Reservation>> {
        let reservation = sqlx::query_as(&format!("SELECT {COLUMNS} FROM reservations WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(reservation)
    }

    /// New reservations always start as `pending`.
    pub async fn insert(&self, input: &ReservationInput) -> DbResult<Reservation> {
        let now = Utc::now();
        let reservation = Reservation {
            id: Uuid::new_v4().to_string(),
            customer_name: input.customer_name.trim().to_string(),
            customer_phone: input.customer_phone.trim().to_string(),
            customer_email: input.customer_email.clone(),
            party_size: input.party_size,
            reserved_for: input.reserved_for,
            status: ReservationStatus::Pending,
            notes: input.notes.clone(),
            created_at: now,
            updated_at: now,
        };

        debug!(id = %reservation.id, party_size = reservation.party_size, "Inserting reservation");

        sqlx::query(&format!(
            "INSERT INTO reservations ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
        ))
        .bind(&reservation.id)
        .bind(&reservation.customer_name)
        .bind(&reservation.customer_phone)
        .bind(&reservation.customer_email)
        .bind(reservation.party_size)
        .bind(reservation.reserved_for)
        .bind(reservation.status)
        .bind(&reservation.notes)
        .bind(reservation.created_at)
        .bind(reservation.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(reservation)
    }

    pub async fn set_status(&self, id: &str, status: ReservationStatus) -> DbResult<Reservation> {
        let result = sqlx::query("UPDATE reservations SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Reservation", id));
        }

        info!(reservation_id = %id, status = ?status, "Reservation status changed");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Reservation", id))
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Reservation", id));
        }
        Ok(())
    }
}
