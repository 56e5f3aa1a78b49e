//! # API Configuration
//!
//! ## Load Order (later overrides earlier)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Defaults (ApiConfig::default)                                       │
//! │  2. TOML file                                                           │
//! │       --config <path>  or  BISTRO_CONFIG                                │
//! │       else ~/.config/bistro/bistro.toml (Linux)                         │
//! │            ~/Library/Application Support/com.bistro.bistro/... (macOS)  │
//! │  3. Environment variables (BISTRO_*, STRIPE_*, PAYPAL_*)                │
//! │  4. validate()                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Config File
//! ```toml
//! [server]
//! bind_addr = "0.0.0.0"
//! port = 8080
//!
//! [database]
//! path = "/var/lib/bistro/bistro.db"
//! max_connections = 5
//!
//! [auth]
//! jwt_secret = "a-long-random-string"
//! access_token_ttl_secs = 86400
//!
//! [store]
//! currency = "EUR"
//!
//! [stripe]
//! webhook_secret = "whsec_..."
//!
//! [paypal]
//! client_id = "..."
//! client_secret = "..."
//! webhook_id = "..."
//! api_base = "https://api-m.paypal.com"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use bistro_core::validation::validate_currency_code;

/// Secret used when none is configured. Refused outside of debug builds.
pub const DEV_JWT_SECRET: &str = "bistro-dev-secret-change-in-production";

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            path: PathBuf::from("./bistro.db"),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Access token lifetime. Default: 24 hours.
    pub access_token_ttl_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            jwt_secret: DEV_JWT_SECRET.to_string(),
            access_token_ttl_secs: 86_400,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// When set, written to the `currency` setting at startup.
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StripeConfig {
    /// `whsec_...` signing secret. Without it the Stripe webhook rejects
    /// every request.
    pub webhook_secret: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaypalConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub webhook_id: Option<String>,
    pub api_base: String,
}

impl Default for PaypalConfig {
    fn default() -> Self {
        PaypalConfig {
            client_id: None,
            client_secret: None,
            webhook_id: None,
            api_base: "https://api-m.sandbox.paypal.com".to_string(),
        }
    }
}

impl PaypalConfig {
    pub fn is_configured(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some() && self.webhook_id.is_some()
    }
}

/// Complete API configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub stripe: StripeConfig,
    #[serde(default)]
    pub paypal: PaypalConfig,
}

impl ApiConfig {
    /// Loads configuration from defaults, file and environment.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = config_path
            .or_else(|| std::env::var_os("BISTRO_CONFIG").map(PathBuf::from))
            .or_else(Self::default_config_path);

        let mut config = match path {
            Some(path) if path.exists() => {
                info!(?path, "Loading config from file");
                Self::from_file(&path)?
            }
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Applies overrides from a variable lookup (the process environment in
    /// production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("BISTRO_BIND_ADDR") {
            self.server.bind_addr = addr;
        }
        if let Some(port) = lookup("BISTRO_PORT") {
            self.server.port = parse_var("BISTRO_PORT", &port)?;
        }
        if let Some(path) = lookup("BISTRO_DB_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Some(max) = lookup("BISTRO_DB_MAX_CONNECTIONS") {
            self.database.max_connections = parse_var("BISTRO_DB_MAX_CONNECTIONS", &max)?;
        }
        if let Some(secret) = lookup("BISTRO_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(ttl) = lookup("BISTRO_JWT_TTL_SECS") {
            self.auth.access_token_ttl_secs = parse_var("BISTRO_JWT_TTL_SECS", &ttl)?;
        }
        if let Some(currency) = lookup("BISTRO_CURRENCY") {
            self.store.currency = Some(currency);
        }
        if let Some(secret) = lookup("STRIPE_WEBHOOK_SECRET") {
            self.stripe.webhook_secret = Some(secret);
        }
        if let Some(id) = lookup("PAYPAL_CLIENT_ID") {
            self.paypal.client_id = Some(id);
        }
        if let Some(secret) = lookup("PAYPAL_CLIENT_SECRET") {
            self.paypal.client_secret = Some(secret);
        }
        if let Some(id) = lookup("PAYPAL_WEBHOOK_ID") {
            self.paypal.webhook_id = Some(id);
        }
        if let Some(base) = lookup("PAYPAL_API_BASE") {
            self.paypal.api_base = base;
        }
        Ok(())
    }

    /// Validates the configuration and normalizes the currency code.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("auth.jwt_secret".into()));
        }
        if self.auth.jwt_secret == DEV_JWT_SECRET {
            if cfg!(debug_assertions) {
                warn!("Using the development JWT secret; set BISTRO_JWT_SECRET in production");
            } else {
                return Err(ConfigError::MissingRequired("auth.jwt_secret".into()));
            }
        }
        if self.auth.access_token_ttl_secs <= 0 {
            return Err(ConfigError::InvalidValue("auth.access_token_ttl_secs".into()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue("database.max_connections".into()));
        }
        if let Some(currency) = &self.store.currency {
            let code = validate_currency_code(currency)
                .map_err(|_| ConfigError::InvalidValue("store.currency".into()))?;
            self.store.currency = Some(code);
        }
        if !self.paypal.api_base.starts_with("https://") && !self.paypal.api_base.starts_with("http://") {
            return Err(ConfigError::InvalidValue("paypal.api_base".into()));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.bind_addr, self.server.port)
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "bistro", "bistro")
            .map(|dirs| dirs.config_dir().join("bistro.toml"))
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_file_then_env() {
        let mut config: ApiConfig = toml::from_str(
            r#"
            [server]
            port = 9000

            [store]
            currency = "eur"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind_addr, "0.0.0.0");

        config
            .apply_overrides(lookup(&[
                ("BISTRO_PORT", "9100"),
                ("STRIPE_WEBHOOK_SECRET", "whsec_test"),
            ]))
            .unwrap();
        config.validate().unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:9100");
        assert_eq!(config.store.currency.as_deref(), Some("EUR"));
        assert_eq!(config.stripe.webhook_secret.as_deref(), Some("whsec_test"));
    }

    #[test]
    fn test_invalid_env_value() {
        let mut config = ApiConfig::default();
        let result = config.apply_overrides(lookup(&[("BISTRO_PORT", "eighty")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue(name)) if name == "BISTRO_PORT"));
    }

    #[test]
    fn test_validation() {
        let mut config = ApiConfig::default();
        config.auth.jwt_secret = "  ".into();
        assert!(matches!(config.validate(), Err(ConfigError::MissingRequired(_))));

        let mut config = ApiConfig::default();
        config.auth.jwt_secret = "test-secret-test-secret".into();
        config.store.currency = Some("EURO".into());
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_paypal_configured() {
        let mut config = ApiConfig::default();
        assert!(!config.paypal.is_configured());
        config
            .apply_overrides(lookup(&[
                ("PAYPAL_CLIENT_ID", "id"),
                ("PAYPAL_CLIENT_SECRET", "secret"),
                ("PAYPAL_WEBHOOK_ID", "wh"),
            ]))
            .unwrap();
        assert!(config.paypal.is_configured());
    }
}
