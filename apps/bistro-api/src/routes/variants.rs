//! Variants and their options. An update replaces the option list.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use bistro_core::VariantWithOptions;
use bistro_db::VariantInput;

use crate::auth::StaffUser;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::pagination::{PageQuery, Paginated};
use crate::state::AppState;
use crate::validate::Validate;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/variants", get(list).post(create))
        .route("/api/admin/variants/{id}", get(show).put(update).delete(destroy))
}

async fn list(
    State(state): State<AppState>,
    _staff: StaffUser,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<Json<Paginated<VariantWithOptions>>> {
    Ok(Json(state.db.variants().list(page.into()).await?.into()))
}

async fn show(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<String>,
) -> ApiResult<Json<VariantWithOptions>> {
    let variant = state
        .db
        .variants()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Variant", &id))?;
    Ok(Json(variant))
}

async fn create(
    State(state): State<AppState>,
    _staff: StaffUser,
    ApiJson(input): ApiJson<VariantInput>,
) -> ApiResult<(StatusCode, Json<VariantWithOptions>)> {
    input.validate()?;
    Ok((StatusCode::CREATED, Json(state.db.variants().insert(&input).await?)))
}

async fn update(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<VariantInput>,
) -> ApiResult<Json<VariantWithOptions>> {
    input.validate()?;
    Ok(Json(state.db.variants().update(&id, &input).await?))
}

async fn destroy(State(state): State<AppState>, _staff: StaffUser, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.db.variants().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use bistro_core::UserRole;

    use crate::routes::test_support::TestApp;

    #[tokio::test]
    async fn test_options_are_replaced() {
        let app = TestApp::new().await;
        let token = app.token(UserRole::Staff).await;

        let (status, created) = app
            .json(
                Method::POST,
                "/api/admin/variants",
                Some(&token),
                json!({ "name": "Size", "options": [
                    { "name": "Small" },
                    { "name": "Large", "price_cents": 300 }
                ] }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["options"].as_array().map(Vec::len), Some(2));
        let id = created["id"].as_str().unwrap().to_string();

        let (status, updated) = app
            .json(
                Method::PUT,
                &format!("/api/admin/variants/{}", id),
                Some(&token),
                json!({ "name": "Size", "options": [{ "name": "One size" }] }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["options"].as_array().map(Vec::len), Some(1));
        assert_eq!(updated["options"][0]["name"], "One size");
    }
}
