//! Shared application state.

use std::sync::Arc;

use bistro_db::Database;

use crate::auth::JwtManager;
use crate::config::ApiConfig;
use crate::gateway::paypal::{HttpPaypalVerifier, PaypalVerifier};

/// Cloned into every handler; all fields are cheap handles.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<ApiConfig>,
    pub jwt: Arc<JwtManager>,
    pub paypal: Arc<dyn PaypalVerifier>,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> Self {
        let paypal = Arc::new(HttpPaypalVerifier::new(config.paypal.clone()));
        Self::with_paypal(db, config, paypal)
    }

    /// Builds the state around a custom PayPal verifier.
    pub fn with_paypal(db: Database, config: ApiConfig, paypal: Arc<dyn PaypalVerifier>) -> Self {
        let jwt = Arc::new(JwtManager::new(&config.auth.jwt_secret, config.auth.access_token_ttl_secs));
        AppState {
            db,
            config: Arc::new(config),
            jwt,
            paypal,
        }
    }
}
