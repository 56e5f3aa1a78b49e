//! Public menu and menu item administration.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use bistro_core::validation::{validate_search_query, validate_uuid};
use bistro_core::{MenuItem, MenuItemDetail, ValidationError, ValidationErrors};
use bistro_db::{MenuItemFilter, MenuItemInput, PageRequest, Relation};

use crate::auth::StaffUser;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::pagination::Paginated;
use crate::state::AppState;
use crate::validate::Validate;

/// Largest id list accepted by bulk endpoints.
const MAX_BULK_IDS: usize = 500;

#[derive(Debug, Default, Deserialize)]
struct MenuQuery {
    category_id: Option<String>,
    search: Option<String>,
    /// Admin listing only; the public menu always hides unavailable items.
    #[serde(default)]
    available_only: bool,
    page: Option<u32>,
    limit: Option<u32>,
}

impl MenuQuery {
    fn into_parts(self, force_available: bool) -> ApiResult<(MenuItemFilter, PageRequest)> {
        let search = self.search.as_deref().map(validate_search_query).transpose()?;
        let filter = MenuItemFilter {
            category_id: self.category_id.filter(|id| !id.is_empty()),
            search,
            available_only: force_available || self.available_only,
        };
        Ok((filter, PageRequest::new(self.page, self.limit)))
    }
}

#[derive(Debug, Deserialize)]
struct BulkAvailability {
    ids: Vec<String>,
    is_available: bool,
}

#[derive(Debug, Deserialize)]
struct BulkIds {
    ids: Vec<String>,
}

#[derive(Debug, Serialize)]
struct BulkResult {
    affected: u64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/menu", get(public_menu))
        .route("/api/menu/{id}", get(public_item))
        .route("/api/admin/menu-items", get(list).post(create))
        .route("/api/admin/menu-items/bulk", patch(bulk_availability))
        .route("/api/admin/menu-items/bulk-delete", post(bulk_delete))
        .route("/api/admin/menu-items/{id}", get(show).put(update).delete(destroy))
        .route("/api/admin/menu-items/{id}/addons", put(set_addons))
        .route("/api/admin/menu-items/{id}/charges", put(set_charges))
        .route("/api/admin/menu-items/{id}/variants", put(set_variants))
}

// =============================================================================
// Public
// =============================================================================

async fn public_menu(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<MenuQuery>,
) -> ApiResult<Json<Paginated<MenuItem>>> {
    let (filter, page) = query.into_parts(true)?;
    let page = state.db.menu_items().list(&filter, page).await?;
    Ok(Json(page.into()))
}

/// Available item with its active addons and charges.
async fn public_item(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<MenuItemDetail>> {
    let mut detail = state
        .db
        .menu_items()
        .get_detail(&id)
        .await?
        .filter(|d| d.item.is_available)
        .ok_or_else(|| ApiError::not_found("Menu item", &id))?;

    detail.addons.retain(|a| a.is_active);
    detail.charges.retain(|c| c.is_active);
    Ok(Json(detail))
}

// =============================================================================
// Admin
// =============================================================================

async fn list(
    State(state): State<AppState>,
    _staff: StaffUser,
    ApiQuery(query): ApiQuery<MenuQuery>,
) -> ApiResult<Json<Paginated<MenuItem>>> {
    let (filter, page) = query.into_parts(false)?;
    let page = state.db.menu_items().list(&filter, page).await?;
    Ok(Json(page.into()))
}

async fn show(State(state): State<AppState>, _staff: StaffUser, Path(id): Path<String>) -> ApiResult<Json<MenuItemDetail>> {
    let detail = state
        .db
        .menu_items()
        .get_detail(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Menu item", &id))?;
    Ok(Json(detail))
}

async fn create(
    State(state): State<AppState>,
    StaffUser(user): StaffUser,
    ApiJson(input): ApiJson<MenuItemInput>,
) -> ApiResult<(StatusCode, Json<MenuItem>)> {
    input.validate()?;
    let item = state.db.menu_items().insert(&input).await?;
    info!(menu_item_id = %item.id, by = %user.id, "Menu item created");
    Ok((StatusCode::CREATED, Json(item)))
}

async fn update(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<MenuItemInput>,
) -> ApiResult<Json<MenuItem>> {
    input.validate()?;
    Ok(Json(state.db.menu_items().update(&id, &input).await?))
}

async fn destroy(State(state): State<AppState>, StaffUser(user): StaffUser, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.db.menu_items().delete(&id).await?;
    info!(menu_item_id = %id, by = %user.id, "Menu item deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn bulk_availability(
    State(state): State<AppState>,
    _staff: StaffUser,
    ApiJson(req): ApiJson<BulkAvailability>,
) -> ApiResult<Json<BulkResult>> {
    validate_ids(&req.ids)?;
    let affected = state.db.menu_items().bulk_set_available(&req.ids, req.is_available).await?;
    Ok(Json(BulkResult { affected }))
}

async fn bulk_delete(
    State(state): State<AppState>,
    StaffUser(user): StaffUser,
    ApiJson(req): ApiJson<BulkIds>,
) -> ApiResult<Json<BulkResult>> {
    validate_ids(&req.ids)?;
    let affected = state.db.menu_items().bulk_delete(&req.ids).await?;
    info!(affected, by = %user.id, "Menu items bulk deleted");
    Ok(Json(BulkResult { affected }))
}

async fn set_addons(state: State<AppState>, staff: StaffUser, id: Path<String>, body: ApiJson<BulkIds>) -> ApiResult<Json<MenuItemDetail>> {
    set_relation(state, staff, id, body, Relation::Addons).await
}

async fn set_charges(state: State<AppState>, staff: StaffUser, id: Path<String>, body: ApiJson<BulkIds>) -> ApiResult<Json<MenuItemDetail>> {
    set_relation(state, staff, id, body, Relation::Charges).await
}

async fn set_variants(state: State<AppState>, staff: StaffUser, id: Path<String>, body: ApiJson<BulkIds>) -> ApiResult<Json<MenuItemDetail>> {
    set_relation(state, staff, id, body, Relation::Variants).await
}

async fn set_relation(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<BulkIds>,
    relation: Relation,
) -> ApiResult<Json<MenuItemDetail>> {
    if req.ids.len() > MAX_BULK_IDS {
        return Err(too_many_ids().into());
    }
    state.db.menu_items().set_relation(&id, relation, &req.ids).await?;
    let detail = state
        .db
        .menu_items()
        .get_detail(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Menu item", &id))?;
    Ok(Json(detail))
}

fn validate_ids(ids: &[String]) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if ids.is_empty() {
        errors.push(ValidationError::Required { field: "ids".into() });
    }
    if ids.len() > MAX_BULK_IDS {
        errors.push(too_many_ids());
    }
    for (i, id) in ids.iter().enumerate() {
        errors.check(validate_uuid(&format!("ids.{}", i), id));
    }
    errors.into_result()
}

fn too_many_ids() -> ValidationError {
    ValidationError::OutOfRange {
        field: "ids".into(),
        min: 1,
        max: MAX_BULK_IDS as i64,
    }
}
