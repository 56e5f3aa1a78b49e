//! Dashboard accounts. Admin only.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use bistro_core::validation::{validate_email, validate_name, validate_password};
use bistro_core::{User, UserRole, ValidationErrors};
use bistro_db::{hash_password, NewUser};

use crate::auth::AdminUser;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::pagination::{PageQuery, Paginated};
use crate::state::AppState;
use crate::validate::NAME_MAX;

#[derive(Debug, Deserialize)]
struct CreateUser {
    name: String,
    email: String,
    password: String,
    #[serde(default = "default_role")]
    role: UserRole,
}

fn default_role() -> UserRole {
    UserRole::Staff
}

impl CreateUser {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(validate_name("name", &self.name, NAME_MAX));
        errors.check(validate_email("email", &self.email));
        errors.check(validate_password(&self.password));
        errors.into_result()
    }
}

#[derive(Debug, Deserialize)]
struct UpdateUser {
    role: Option<UserRole>,
    is_active: Option<bool>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/users", get(list).post(create))
        .route("/api/admin/users/{id}", patch(update))
}

async fn list(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<Json<Paginated<User>>> {
    Ok(Json(state.db.users().list(page.into()).await?.into()))
}

async fn create(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiJson(req): ApiJson<CreateUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    req.validate()?;

    let password = req.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("Password hashing failed: {}", e)))??;

    let user = state
        .db
        .users()
        .insert(&NewUser {
            name: req.name.trim().to_string(),
            email: req.email.trim().to_lowercase(),
            password_hash,
            role: req.role,
        })
        .await?;

    info!(user_id = %user.id, role = user.role.as_str(), by = %admin.id, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

async fn update(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateUser>,
) -> ApiResult<Json<User>> {
    if id == admin.id && (req.is_active == Some(false) || req.role.is_some_and(|r| r != UserRole::Admin)) {
        return Err(ApiError::Conflict("Admins cannot demote or disable themselves".into()));
    }

    let users = state.db.users();
    let mut user = users
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", &id))?;
    if let Some(role) = req.role {
        user = users.set_role(&id, role).await?;
    }
    if let Some(is_active) = req.is_active {
        user = users.set_active(&id, is_active).await?;
    }

    info!(user_id = %id, role = user.role.as_str(), is_active = user.is_active, by = %admin.id, "User updated");
    Ok(Json(user))
}
