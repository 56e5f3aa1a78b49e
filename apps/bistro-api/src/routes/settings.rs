use std::collections::BTreeMap;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::Value;
use tracing::info;

use bistro_core::validation::{validate_currency_code, validate_price_cents};
use bistro_core::{Setting, ValidationError, ValidationErrors, SETTING_CURRENCY, SETTING_DELIVERY_CHARGE};

use crate::auth::StaffUser;
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;

const KNOWN_KEYS: [&str; 2] = [SETTING_CURRENCY, SETTING_DELIVERY_CHARGE];

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/admin/settings", get(list).put(update))
}

async fn list(State(state): State<AppState>, _staff: StaffUser) -> ApiResult<Json<Vec<Setting>>> {
    Ok(Json(state.db.settings().all().await?))
}

/// Writes every key in the body; nothing is written if any value is invalid.
async fn update(
    State(state): State<AppState>,
    StaffUser(user): StaffUser,
    ApiJson(body): ApiJson<BTreeMap<String, Value>>,
) -> ApiResult<Json<Vec<Setting>>> {
    let normalized = normalize(&body)?;

    let settings = state.db.settings();
    for (key, value) in &normalized {
        settings.set(key, value).await?;
    }
    info!(keys = ?normalized.keys().collect::<Vec<_>>(), by = %user.id, "Settings updated");

    Ok(Json(settings.all().await?))
}

/// Checks each value and renders it as the stored string.
fn normalize(body: &BTreeMap<String, Value>) -> Result<BTreeMap<String, String>, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut out = BTreeMap::new();

    for (key, value) in body {
        match key.as_str() {
            SETTING_CURRENCY => match value.as_str().map(validate_currency_code) {
                Some(Ok(code)) => {
                    out.insert(key.clone(), code);
                }
                Some(Err(e)) => errors.push(e),
                None => errors.push(invalid(key, "must be a string")),
            },
            SETTING_DELIVERY_CHARGE => {
                let cents = value
                    .as_i64()
                    .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()));
                match cents {
                    Some(cents) => match validate_price_cents(key, cents) {
                        Ok(()) => {
                            out.insert(key.clone(), cents.to_string());
                        }
                        Err(e) => errors.push(e),
                    },
                    None => errors.push(invalid(key, "must be an integer amount in cents")),
                }
            }
            _ => errors.push(ValidationError::NotAllowed {
                field: key.clone(),
                allowed: KNOWN_KEYS.iter().map(|k| k.to_string()).collect(),
            }),
        }
    }

    errors.into_result().map(|()| out)
}

fn invalid(field: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
