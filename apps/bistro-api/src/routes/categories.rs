use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::info;

use bistro_core::Category;
use bistro_db::CategoryInput;

use crate::auth::StaffUser;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::pagination::{PageQuery, Paginated};
use crate::state::AppState;
use crate::validate::Validate;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/categories", get(list_active))
        .route("/api/admin/categories", get(list_all).post(create))
        .route("/api/admin/categories/{id}", get(show).put(update).delete(destroy))
}

async fn list_active(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<Json<Paginated<Category>>> {
    let page = state.db.categories().list(true, page.into()).await?;
    Ok(Json(page.into()))
}

async fn list_all(
    State(state): State<AppState>,
    _staff: StaffUser,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<Json<Paginated<Category>>> {
    let page = state.db.categories().list(false, page.into()).await?;
    Ok(Json(page.into()))
}

async fn show(State(state): State<AppState>, _staff: StaffUser, Path(id): Path<String>) -> ApiResult<Json<Category>> {
    let category = state
        .db
        .categories()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category", &id))?;
    Ok(Json(category))
}

async fn create(
    State(state): State<AppState>,
    StaffUser(user): StaffUser,
    ApiJson(input): ApiJson<CategoryInput>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    input.validate()?;
    let category = state.db.categories().insert(&input).await?;
    info!(category_id = %category.id, by = %user.id, "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<CategoryInput>,
) -> ApiResult<Json<Category>> {
    input.validate()?;
    Ok(Json(state.db.categories().update(&id, &input).await?))
}

async fn destroy(State(state): State<AppState>, StaffUser(user): StaffUser, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.db.categories().delete(&id).await?;
    info!(category_id = %id, by = %user.id, "Category deleted");
    Ok(StatusCode::NO_CONTENT)
}
