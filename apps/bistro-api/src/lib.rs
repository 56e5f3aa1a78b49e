//! # Bistro API
//!
//! JSON HTTP server for the restaurant storefront and the staff dashboard.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Bistro API Server                               │
//! │                                                                         │
//! │  Storefront ──┐                                                         │
//! │  Dashboard  ──┼──► axum Router ──► handlers ──► bistro-db ──► SQLite    │
//! │  Stripe     ──┤     (TraceLayer,      │                                 │
//! │  PayPal     ──┘      CorsLayer)       ▼                                 │
//! │                                  bistro-core                            │
//! │                           (pricing, status machine,                     │
//! │                            currency conversion)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`config`] - TOML file plus environment overrides
//! - [`auth`] - JWT issue/validate and the `AuthUser`/`StaffUser`/`AdminUser` extractors
//! - [`error`] - `ApiError`, the JSON error body every handler returns
//! - [`gateway`] - Stripe signatures and PayPal verification
//! - [`routes`] - the HTTP surface

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod gateway;
pub mod pagination;
pub mod routes;
pub mod state;
pub mod validate;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
