use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use bistro_core::validation::{validate_coupon_code, validate_price_cents};
use bistro_core::{CoreError, Coupon, Money};
use bistro_db::CouponInput;

use crate::auth::StaffUser;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::pagination::{PageQuery, Paginated};
use crate::state::AppState;
use crate::validate::Validate;

#[derive(Debug, Deserialize)]
struct CheckRequest {
    code: String,
    subtotal_cents: i64,
}

#[derive(Debug, Serialize)]
struct CheckResponse {
    code: String,
    subtotal_cents: i64,
    discount_cents: i64,
    total_cents: i64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/coupons/check", post(check))
        .route("/api/admin/coupons", get(list).post(create))
        .route("/api/admin/coupons/{id}", get(show).put(update).delete(destroy))
}

/// Loads a coupon by code; an unknown code is a rejected coupon.
pub(super) async fn lookup(state: &AppState, code: &str) -> ApiResult<Coupon> {
    let code = validate_coupon_code(code)?;
    state.db.coupons().find_by_code(&code).await?.ok_or_else(|| ApiError::Rule {
        code: "coupon_rejected",
        message: format!("Coupon {} does not exist", code),
    })
}

async fn check(State(state): State<AppState>, ApiJson(req): ApiJson<CheckRequest>) -> ApiResult<Json<CheckResponse>> {
    validate_price_cents("subtotal_cents", req.subtotal_cents)?;
    let coupon = lookup(&state, &req.code).await?;

    let subtotal = Money::from_cents(req.subtotal_cents);
    let discount = coupon
        .discount_for(subtotal, Utc::now())
        .map_err(|reason| CoreError::CouponRejected {
            code: coupon.code.clone(),
            reason,
        })?;

    Ok(Json(CheckResponse {
        code: coupon.code,
        subtotal_cents: subtotal.cents(),
        discount_cents: discount.cents(),
        total_cents: (subtotal - discount).cents(),
    }))
}

async fn list(
    State(state): State<AppState>,
    _staff: StaffUser,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<Json<Paginated<Coupon>>> {
    Ok(Json(state.db.coupons().list(page.into()).await?.into()))
}

async fn show(State(state): State<AppState>, _staff: StaffUser, Path(id): Path<String>) -> ApiResult<Json<Coupon>> {
    let coupon = state
        .db
        .coupons()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Coupon", &id))?;
    Ok(Json(coupon))
}

async fn create(
    State(state): State<AppState>,
    StaffUser(user): StaffUser,
    ApiJson(input): ApiJson<CouponInput>,
) -> ApiResult<(StatusCode, Json<Coupon>)> {
    input.validate()?;
    let coupon = state.db.coupons().insert(&input).await?;
    info!(coupon = %coupon.code, by = %user.id, "Coupon created");
    Ok((StatusCode::CREATED, Json(coupon)))
}

async fn update(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<CouponInput>,
) -> ApiResult<Json<Coupon>> {
    input.validate()?;
    Ok(Json(state.db.coupons().update(&id, &input).await?))
}

async fn destroy(State(state): State<AppState>, _staff: StaffUser, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.db.coupons().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
