//! Table bookings. Customers submit; staff confirm or cancel.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use bistro_core::{Reservation, ReservationStatus};
use bistro_db::{PageRequest, ReservationInput};

use crate::auth::StaffUser;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::pagination::Paginated;
use crate::state::AppState;
use crate::validate::Validate;

#[derive(Debug, Deserialize)]
struct ReservationQuery {
    status: Option<ReservationStatus>,
    page: Option<u32>,
    limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct StatusChange {
    status: ReservationStatus,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/reservations", post(create))
        .route("/api/admin/reservations", get(list))
        .route("/api/admin/reservations/{id}", get(show).delete(destroy))
        .route("/api/admin/reservations/{id}/status", patch(change_status))
}

async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ReservationInput>,
) -> ApiResult<(StatusCode, Json<Reservation>)> {
    input.validate()?;
    let reservation = state.db.reservations().insert(&input).await?;
    info!(
        reservation_id = %reservation.id,
        party_size = reservation.party_size,
        reserved_for = %reservation.reserved_for,
        "Reservation requested"
    );
    Ok((StatusCode::CREATED, Json(reservation)))
}

async fn list(
    State(state): State<AppState>,
    _staff: StaffUser,
    ApiQuery(query): ApiQuery<ReservationQuery>,
) -> ApiResult<Json<Paginated<Reservation>>> {
    let page = state
        .db
        .reservations()
        .list(query.status, PageRequest::new(query.page, query.limit))
        .await?;
    Ok(Json(page.into()))
}

async fn show(State(state): State<AppState>, _staff: StaffUser, Path(id): Path<String>) -> ApiResult<Json<Reservation>> {
    let reservation = state
        .db
        .reservations()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Reservation", &id))?;
    Ok(Json(reservation))
}

async fn change_status(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<StatusChange>,
) -> ApiResult<Json<Reservation>> {
    Ok(Json(state.db.reservations().set_status(&id, req.status).await?))
}

async fn destroy(State(state): State<AppState>, _staff: StaffUser, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.db.reservations().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
