//! # bistro-db: Database Layer for Bistro
//!
//! SQLite storage for the restaurant backend, accessed through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bistro Data Flow                                 │
//! │                                                                         │
//! │  HTTP handler (POST /api/orders)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  bistro-core: resolve_line / price_order (pure)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     bistro-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│ MenuItemRepo   │    │  (embedded)  │  │   │
//! │  │   │  SqlitePool   │    │ OrderRepo      │    │ 001_initial  │  │   │
//! │  │   │               │    │ CouponRepo ... │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (WAL)                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - One repository per table family
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bistro_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("bistro.db")).await?;
//! let page = db.menu_items().list(&MenuItemFilter::default(), PageRequest::default()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::{Page, PageRequest};

pub use repository::addon::{AddonInput, AddonRepository};
pub use repository::category::{CategoryInput, CategoryRepository};
pub use repository::charge::{ChargeInput, ChargeRepository};
pub use repository::coupon::{CouponInput, CouponRepository};
pub use repository::menu_item::{MenuItemFilter, MenuItemInput, MenuItemRepository, Relation};
pub use repository::order::{NewOrder, OrderFilter, OrderRepository, PaymentUpdate};
pub use repository::payment_method::PaymentMethodRepository;
pub use repository::reservation::{ReservationInput, ReservationRepository};
pub use repository::setting::SettingRepository;
pub use repository::user::{hash_password, verify_password, NewUser, UserRepository};
pub use repository::variant::{VariantInput, VariantOptionInput, VariantRepository};

#[cfg(test)]
pub(crate) mod test_support {
    use bistro_core::AdjustmentKind;

    use crate::repository::coupon::CouponInput;
    use crate::repository::menu_item::MenuItemInput;
    use crate::{Database, DbConfig};

    /// Fresh, migrated in-memory database.
    pub async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub fn menu_item_input(name: &str, price_cents: i64) -> MenuItemInput {
        MenuItemInput {
            category_id: None,
            name: name.to_string(),
            description: None,
            price_cents,
            discount_type: None,
            discount_value: 0,
            is_available: true,
            is_featured: false,
            sort_order: 0,
        }
    }

    /// A 10% coupon without limits.
    pub fn coupon_input(code: &str) -> CouponInput {
        CouponInput {
            code: code.to_string(),
            discount_type: AdjustmentKind::Percentage,
            discount_value: 1000,
            min_order_cents: 0,
            max_discount_cents: None,
            usage_limit: None,
            starts_at: None,
            expires_at: None,
            is_active: true,
        }
    }
}
