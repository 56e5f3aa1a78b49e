use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use bistro_core::Addon;
use bistro_db::AddonInput;

use crate::auth::StaffUser;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::pagination::{PageQuery, Paginated};
use crate::state::AppState;
use crate::validate::Validate;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/addons", get(list).post(create))
        .route("/api/admin/addons/{id}", get(show).put(update).delete(destroy))
}

async fn list(
    State(state): State<AppState>,
    _staff: StaffUser,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<Json<Paginated<Addon>>> {
    Ok(Json(state.db.addons().list(page.into()).await?.into()))
}

async fn show(State(state): State<AppState>, _staff: StaffUser, Path(id): Path<String>) -> ApiResult<Json<Addon>> {
    let addon = state
        .db
        .addons()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Addon", &id))?;
    Ok(Json(addon))
}

async fn create(
    State(state): State<AppState>,
    _staff: StaffUser,
    ApiJson(input): ApiJson<AddonInput>,
) -> ApiResult<(StatusCode, Json<Addon>)> {
    input.validate()?;
    Ok((StatusCode::CREATED, Json(state.db.addons().insert(&input).await?)))
}

async fn update(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<AddonInput>,
) -> ApiResult<Json<Addon>> {
    input.validate()?;
    Ok(Json(state.db.addons().update(&id, &input).await?))
}

async fn destroy(State(state): State<AppState>, _staff: StaffUser, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.db.addons().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
