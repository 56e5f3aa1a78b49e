//! # Repository Module
//!
//! Database repository implementations for Bistro.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler                                                           │
//! │       │  db.orders().get_detail(id)                                     │
//! │       ▼                                                                 │
//! │  OrderRepository                                                        │
//! │  ├── create(&self, order, totals)   one transaction                     │
//! │  ├── get_detail(&self, id)                                              │
//! │  ├── update_status(&self, id, next)                                     │
//! │  └── mark_paid(&self, id, info)     idempotent                          │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`category::CategoryRepository`]
//! - [`menu_item::MenuItemRepository`] - items, bulk actions, relations
//! - [`addon::AddonRepository`]
//! - [`charge::ChargeRepository`]
//! - [`variant::VariantRepository`] - variants and their options
//! - [`coupon::CouponRepository`]
//! - [`order::OrderRepository`] - placement, status, payment
//! - [`payment_method::PaymentMethodRepository`]
//! - [`reservation::ReservationRepository`]
//! - [`user::UserRepository`]
//! - [`setting::SettingRepository`]

pub mod addon;
pub mod category;
pub mod charge;
pub mod coupon;
pub mod menu_item;
pub mod order;
pub mod payment_method;
pub mod reservation;
pub mod setting;
pub mod user;
pub mod variant;

/// Default page size of list endpoints.
pub const DEFAULT_PAGE_SIZE: u32 = 15;
/// Largest page a client may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A 1-based page request, clamped to sane bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        PageRequest {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }

    pub fn limit(&self) -> i64 {
        self.limit as i64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::new(None, None)
    }
}

/// One page of rows plus the total row count.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub request: PageRequest,
}

impl<T> Page<T> {
    pub fn last_page(&self) -> i64 {
        let limit = self.request.limit();
        ((self.total + limit - 1) / limit).max(1)
    }
}

/// Escapes `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
