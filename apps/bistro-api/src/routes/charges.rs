use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use bistro_core::Charge;
use bistro_db::ChargeInput;

use crate::auth::StaffUser;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::pagination::{PageQuery, Paginated};
use crate::state::AppState;
use crate::validate::Validate;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/charges", get(list).post(create))
        .route("/api/admin/charges/{id}", get(show).put(update).delete(destroy))
}

async fn list(
    State(state): State<AppState>,
    _staff: StaffUser,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<Json<Paginated<Charge>>> {
    Ok(Json(state.db.charges().list(page.into()).await?.into()))
}

async fn show(State(state): State<AppState>, _staff: StaffUser, Path(id): Path<String>) -> ApiResult<Json<Charge>> {
    let charge = state
        .db
        .charges()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Charge", &id))?;
    Ok(Json(charge))
}

async fn create(
    State(state): State<AppState>,
    _staff: StaffUser,
    ApiJson(input): ApiJson<ChargeInput>,
) -> ApiResult<(StatusCode, Json<Charge>)> {
    input.validate()?;
    Ok((StatusCode::CREATED, Json(state.db.charges().insert(&input).await?)))
}

async fn update(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<ChargeInput>,
) -> ApiResult<Json<Charge>> {
    input.validate()?;
    Ok(Json(state.db.charges().update(&id, &input).await?))
}

async fn destroy(State(state): State<AppState>, _staff: StaffUser, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.db.charges().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
