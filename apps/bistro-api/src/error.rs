//! # API Error Types
//!
//! Every handler returns [`ApiResult`]. Lower-layer errors convert with `?`
//! and are rendered as a JSON body:
//!
//! ```json
//! { "code": "validation_error", "message": "2 validation error(s)",
//!   "errors": { "name": ["name is required"] } }
//! ```
//!
//! ## Status Mapping
//! ```text
//! ValidationError(s)              → 422  (field map in "errors")
//! CoreError business rule         → 422  (coupon, availability, selection)
//! InvalidStatusTransition         → 409
//! DbError::UniqueViolation        → 409
//! DbError::NotFound / *NotFound   → 404
//! AuthError                       → 401 / 403
//! Bad webhook signature           → 400
//! Anything else                   → 500  (logged with tracing::error!)
//! ```

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::error;

use bistro_core::{CoreError, ValidationError, ValidationErrors};
use bistro_db::DbError;

use crate::auth::AuthError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// A business rule refused the request (422).
    #[error("{message}")]
    Rule { code: &'static str, message: String },

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    InvalidSignature(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ApiError {
    pub fn not_found(entity: &str, id: &str) -> Self {
        ApiError::NotFound(format!("{} not found: {}", entity, id))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Rule { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::BadRequest(_) | ApiError::InvalidSignature(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(e) => e.status(),
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Rule { code, .. } => code,
            ApiError::BadRequest(_) => "bad_request",
            ApiError::InvalidSignature(_) => "invalid_signature",
            ApiError::Auth(e) => e.code(),
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let body = ErrorBody {
            code: self.code(),
            message: self.to_string(),
            errors: match &self {
                ApiError::Validation(errors) => Some(errors.by_field()),
                _ => None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        ApiError::Validation(error.into())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::Validation(e) => e.into(),
            CoreError::MenuItemNotFound(_) | CoreError::OrderNotFound(_) => ApiError::NotFound(message),
            CoreError::InvalidStatusTransition { .. } => ApiError::Conflict(message),
            CoreError::CouponRejected { .. } => ApiError::Rule {
                code: "coupon_rejected",
                message,
            },
            CoreError::PaymentMethodUnavailable(_) => ApiError::Rule {
                code: "payment_method_unavailable",
                message,
            },
            CoreError::MenuItemUnavailable { .. } | CoreError::InvalidSelection { .. } => ApiError::Rule {
                code: "invalid_cart",
                message,
            },
            CoreError::CartTooLarge { .. }
            | CoreError::EmptyCart
            | CoreError::QuantityTooLarge { .. }
            | CoreError::AmountOverflow => {
                ApiError::Rule {
                    code: "invalid_cart",
                    message,
                }
            }
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DbError::UniqueViolation { .. } => ApiError::Conflict(err.to_string()),
            DbError::ForeignKeyViolation { .. } => ApiError::Rule {
                code: "unknown_reference",
                message: "A referenced record does not exist".to_string(),
            },
            DbError::CheckViolation { .. } => ApiError::Rule {
                code: "constraint_violation",
                message: err.to_string(),
            },
            DbError::Rule(core) => core.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => ApiError::Rule {
                code: "invalid_body",
                message: e.body_text(),
            },
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
