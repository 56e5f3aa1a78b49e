use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use bistro_core::User;
use bistro_db::verify_password;

use crate::auth::{AuthError, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    access_token: String,
    token_type: &'static str,
    expires_in: i64,
    user: User,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
}

async fn login(State(state): State<AppState>, ApiJson(req): ApiJson<LoginRequest>) -> ApiResult<Json<LoginResponse>> {
    let user = state.db.users().find_by_email(&req.email.to_lowercase()).await?;

    // Hash verification is CPU-bound
    let candidate = user.as_ref().map(|u| u.password_hash.clone());
    let password = req.password;
    let valid = tokio::task::spawn_blocking(move || {
        candidate.map_or(false, |hash| verify_password(&password, &hash))
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Password check failed: {}", e)))?;

    let user = match user {
        Some(user) if valid => user,
        _ => {
            warn!(email = %req.email, "Failed login attempt");
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    if !user.is_active {
        return Err(AuthError::AccountDisabled.into());
    }

    let access_token = state.jwt.issue(&user)?;
    info!(user_id = %user.id, role = user.role.as_str(), "User logged in");

    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.jwt.lifetime_secs(),
        user,
    }))
}

async fn me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<User>> {
    let user = state
        .db
        .users()
        .get_by_id(&auth.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", &auth.id))?;
    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use bistro_core::UserRole;
    use bistro_db::{hash_password, NewUser};

    use crate::routes::test_support::TestApp;

    async fn seed_user(app: &TestApp) {
        app.db()
            .users()
            .insert(&NewUser {
                name: "Owner".into(),
                email: "owner@example.com".into(),
                password_hash: hash_password("secret-pass").unwrap(),
                role: UserRole::Admin,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_login_and_me() {
        let app = TestApp::new().await;
        seed_user(&app).await;

        let (status, body) = app
            .json(
                Method::POST,
                "/api/auth/login",
                None,
                json!({ "email": "Owner@Example.com", "password": "secret-pass" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["token_type"], "Bearer");
        assert!(body["user"].get("password_hash").is_none());

        let token = body["access_token"].as_str().unwrap().to_string();
        let (status, body) = app.get("/api/auth/me", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "owner@example.com");
        assert_eq!(body["role"], "admin");
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let app = TestApp::new().await;
        seed_user(&app).await;

        let (status, body) = app
            .json(
                Method::POST,
                "/api/auth/login",
                None,
                json!({ "email": "owner@example.com", "password": "nope-nope" }),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "invalid_credentials");
    }

    #[tokio::test]
    async fn test_me_requires_token() {
        let app = TestApp::new().await;
        let (status, _) = app.get("/api/auth/me", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = app.get("/api/auth/me", Some("garbage")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "invalid_token");
    }
}
