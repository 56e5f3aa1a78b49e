//! # bistro-core: Pure Business Logic for Bistro
//!
//! This crate holds the ordering rules of the restaurant backend as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bistro Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │             Storefront / Dashboard (HTTP clients)               │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │                    bistro-api (axum)                            │    │
//! │  │    place_order, update_status, stripe_webhook, etc.             │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │               ★ bistro-core (THIS CRATE) ★                      │    │
//! │  │                                                                 │    │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────────┐    │    │
//! │  │   │  money   │  │ pricing  │  │  status  │  │   currency   │    │    │
//! │  │   │  Money   │  │ LineInput│  │ Order    │  │ precision    │    │    │
//! │  │   │  Rate    │  │ Totals   │  │ Status   │  │ Stripe units │    │    │
//! │  │   └──────────┘  └──────────┘  └──────────┘  └──────────────┘    │    │
//! │  │                                                                 │    │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │                    bistro-db (Database Layer)                   │    │
//! │  │       SQLite queries, migrations, order number counter          │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Catalog and order entities
//! - [`money`] - Money, Rate and Adjustment with integer arithmetic
//! - [`currency`] - Precision formatting and Stripe minor units
//! - [`order_number`] - `ORD-YYMMDD-N` formatting and parsing
//! - [`pricing`] - Line and order totals
//! - [`status`] - Order status state machine
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use bistro_core::money::{Money, Rate};
//!
//! // Create money from cents (never from floats!)
//! let price = Money::from_cents(1099); // 10.99
//!
//! // 8.25% service charge, rounded half up
//! let charge = price.percentage(Rate::from_bps(825));
//! assert_eq!(charge.cents(), 91);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod currency;
pub mod error;
pub mod money;
pub mod order_number;
pub mod pricing;
pub mod status;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, CouponRejection, ValidationError, ValidationErrors};
pub use money::{Adjustment, AdjustmentKind, Money, Rate};
pub use order_number::OrderNumber;
pub use status::{OrderStatus, OrderType, PaymentStatus};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single order.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Largest price, addon, option or fixed charge accepted by the catalog,
/// in cents (1,000,000.00). Also caps the delivery fee setting.
pub const MAX_PRICE_CENTS: i64 = 100_000_000;

/// Largest party a single reservation may book.
pub const MAX_PARTY_SIZE: i64 = 50;

/// Store currency when no setting has been saved.
pub const DEFAULT_CURRENCY: &str = "USD";
