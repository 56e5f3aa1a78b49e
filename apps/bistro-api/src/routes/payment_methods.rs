use axum::{
    extract::{Path, State},
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use bistro_core::PaymentMethod;

use crate::auth::AdminUser;
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct Toggle {
    is_enabled: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/payment-methods", get(list_enabled))
        .route("/api/admin/payment-methods", get(list_all))
        .route("/api/admin/payment-methods/{code}", patch(toggle))
}

async fn list_enabled(State(state): State<AppState>) -> ApiResult<Json<Vec<PaymentMethod>>> {
    Ok(Json(state.db.payment_methods().list(true).await?))
}

async fn list_all(State(state): State<AppState>, _admin: AdminUser) -> ApiResult<Json<Vec<PaymentMethod>>> {
    Ok(Json(state.db.payment_methods().list(false).await?))
}

async fn toggle(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Path(code): Path<String>,
    ApiJson(req): ApiJson<Toggle>,
) -> ApiResult<Json<PaymentMethod>> {
    let method = state.db.payment_methods().set_enabled(&code, req.is_enabled).await?;
    info!(method = %method.code, enabled = method.is_enabled, by = %user.id, "Payment method toggled");
    Ok(Json(method))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use bistro_core::UserRole;

    use crate::routes::test_support::TestApp;

    #[tokio::test]
    async fn test_enable_method() {
        let app = TestApp::new().await;
        let admin = app.token(UserRole::Admin).await;

        let (_, body) = app.get("/api/payment-methods", None).await;
        assert_eq!(body.as_array().map(Vec::len), Some(1));
        assert_eq!(body[0]["code"], "cash");

        let staff = app.token(UserRole::Staff).await;
        let (status, _) = app
            .json(
                Method::PATCH,
                "/api/admin/payment-methods/stripe",
                Some(&staff),
                json!({ "is_enabled": true }),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app
            .json(
                Method::PATCH,
                "/api/admin/payment-methods/stripe",
                Some(&admin),
                json!({ "is_enabled": true }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_enabled"], true);

        let (_, body) = app.get("/api/payment-methods", None).await;
        assert_eq!(body.as_array().map(Vec::len), Some(2));

        let (status, _) = app
            .json(
                Method::PATCH,
                "/api/admin/payment-methods/bitcoin",
                Some(&admin),
                json!({ "is_enabled": true }),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
