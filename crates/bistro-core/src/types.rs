//! # Domain Types
//!
//! Core domain types used throughout Bistro.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Catalog                          Ordering                              │
//! │  ─────────────────────────        ─────────────────────────             │
//! │  Category ──< MenuItem            Order ──< OrderItem                   │
//! │                 │  │  │             │                                   │
//! │        Addon >──┘  │  └──< Variant  └──< OrderCharge                    │
//! │       Charge >─────┘       └──< VariantOption                           │
//! │                                                                         │
//! │  Coupon, PaymentMethod, Reservation, User, Setting                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Money Columns
//! Every amount is stored as `*_cents: i64`. Accessors such as
//! [`MenuItem::price`] wrap them in [`Money`] for arithmetic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CouponRejection, ValidationError};
use crate::money::{Adjustment, AdjustmentKind, Money};
use crate::pricing::{AddonSnapshot, ChargeSnapshot, VariantSnapshot};
use crate::status::{OrderStatus, OrderType, PaymentStatus};

// =============================================================================
// Category
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub sort_order: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Menu Item
// =============================================================================

/// A dish or drink on the menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct MenuItem {
    pub id: String,
    pub category_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    /// Base price in cents.
    pub price_cents: i64,
    /// `None` when the item has no discount.
    pub discount_type: Option<AdjustmentKind>,
    /// Cents for fixed discounts, bps for percentage discounts.
    pub discount_value: i64,
    pub is_available: bool,
    pub is_featured: bool,
    pub sort_order: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl MenuItem {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// The item discount, if one is configured with a non-zero value.
    pub fn discount(&self) -> Option<Adjustment> {
        let kind = self.discount_type?;
        if self.discount_value <= 0 {
            return None;
        }
        Some(Adjustment::clamped(kind, self.discount_value))
    }

    /// Per-unit discount off the base price, never more than the price itself.
    ///
    /// ```text
    /// price 12.00, 25%   → 3.00
    /// price 12.00, 15.00 → 12.00 (capped)
    /// ```
    pub fn unit_discount(&self) -> Money {
        let price = self.price();
        self.discount()
            .map(|d| d.amount_on(price).min(price).non_negative())
            .unwrap_or_default()
    }
}

// =============================================================================
// Addon
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Addon {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Addon {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Charge
// =============================================================================

/// A tax or service fee attached to menu items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Charge {
    pub id: String,
    pub name: String,
    pub charge_type: AdjustmentKind,
    /// Cents for fixed charges, bps for percentage charges.
    pub value: i64,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Charge {
    pub fn adjustment(&self) -> Adjustment {
        Adjustment::clamped(self.charge_type, self.value)
    }
}

// =============================================================================
// Variants
// =============================================================================

/// A configurable attribute of a menu item, e.g. "Size".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Variant {
    pub id: String,
    pub name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A selectable value of a variant, e.g. "Large" for +2.00.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct VariantOption {
    pub id: String,
    pub variant_id: String,
    pub name: String,
    pub price_cents: i64,
    pub sort_order: i64,
}

impl VariantOption {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VariantWithOptions {
    #[serde(flatten)]
    pub variant: Variant,
    pub options: Vec<VariantOption>,
}

/// A menu item with everything needed to price it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MenuItemDetail {
    #[serde(flatten)]
    pub item: MenuItem,
    pub addons: Vec<Addon>,
    pub charges: Vec<Charge>,
    pub variants: Vec<VariantWithOptions>,
}

// =============================================================================
// Coupon
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Coupon {
    pub id: String,
    /// Stored upper-case; lookups are case-insensitive.
    pub code: String,
    pub discount_type: AdjustmentKind,
    pub discount_value: i64,
    pub min_order_cents: i64,
    pub max_discount_cents: Option<i64>,
    pub usage_limit: Option<i64>,
    pub used_count: i64,
    #[ts(as = "Option<String>")]
    pub starts_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Coupon {
    pub fn adjustment(&self) -> Adjustment {
        Adjustment::clamped(self.discount_type, self.discount_value)
    }

    /// Checks whether the coupon can be redeemed at `now` for `subtotal`.
    ///
    /// ## Check Order
    /// ```text
    /// is_active ─► starts_at ─► expires_at ─► usage_limit ─► min_order
    /// ```
    pub fn check(&self, subtotal: Money, now: DateTime<Utc>) -> Result<(), CouponRejection> {
        if !self.is_active {
            return Err(CouponRejection::Inactive);
        }
        if matches!(self.starts_at, Some(start) if now < start) {
            return Err(CouponRejection::NotStarted);
        }
        if matches!(self.expires_at, Some(end) if now > end) {
            return Err(CouponRejection::Expired);
        }
        if matches!(self.usage_limit, Some(limit) if self.used_count >= limit) {
            return Err(CouponRejection::UsageLimitReached);
        }
        if subtotal.cents() < self.min_order_cents {
            return Err(CouponRejection::MinimumNotMet);
        }
        Ok(())
    }

    /// Discount this coupon grants on `subtotal`.
    ///
    /// Capped at `max_discount_cents` and at the subtotal itself.
    pub fn discount_for(&self, subtotal: Money, now: DateTime<Utc>) -> Result<Money, CouponRejection> {
        self.check(subtotal, now)?;

        let mut discount = self.adjustment().amount_on(subtotal);
        if let Some(max) = self.max_discount_cents {
            discount = discount.min(Money::from_cents(max));
        }
        Ok(discount.min(subtotal.non_negative()).non_negative())
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// A way customers can pay, switched on or off by staff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PaymentMethod {
    /// `cash`, `stripe` or `paypal`.
    pub code: String,
    pub name: String,
    pub is_enabled: bool,
    pub sort_order: i64,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Reservation
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl Default for ReservationStatus {
    fn default() -> Self {
        ReservationStatus::Pending
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Reservation {
    pub id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub party_size: i64,
    #[ts(as = "String")]
    pub reserved_for: DateTime<Utc>,
    pub status: ReservationStatus,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// User
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Staff,
    Customer,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Staff => "staff",
            UserRole::Customer => "customer",
        }
    }

    /// Admin and staff may use the dashboard endpoints.
    pub fn is_staff(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Staff)
    }
}

impl FromStr for UserRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "staff" => Ok(UserRole::Staff),
            "customer" => Ok(UserRole::Customer),
            _ => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: vec!["admin".into(), "staff".into(), "customer".into()],
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string. Never serialized.
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub password_hash: String,
    pub role: UserRole,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Order
// =============================================================================

/// A placed order. Totals are frozen at placement time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    /// `ORD-YYMMDD-N`, unique.
    pub order_number: String,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    /// Raw gateway payload of the last payment event, `null` until paid.
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    #[ts(type = "unknown")]
    pub payment_info: serde_json::Value,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub delivery_address: Option<String>,
    pub table_number: Option<String>,
    pub notes: Option<String>,
    pub coupon_id: Option<String>,
    pub coupon_code: Option<String>,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub charges_cents: i64,
    pub coupon_discount_cents: i64,
    pub delivery_charge_cents: i64,
    pub total_cents: i64,
    pub user_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A line of an order, frozen at placement time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    /// Null once the menu item is deleted.
    pub menu_item_id: Option<String>,
    pub name: String,
    pub unit_price_cents: i64,
    pub variant_amount_cents: i64,
    /// Per unit.
    pub discount_cents: i64,
    pub addons_amount_cents: i64,
    pub charges_cents: i64,
    pub quantity: i64,
    pub subtotal_cents: i64,
    pub total_cents: i64,
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub variant_options: Vec<VariantSnapshot>,
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub addons: Vec<AddonSnapshot>,
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub charges: Vec<ChargeSnapshot>,
}

/// Order-level breakdown of one applied charge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderCharge {
    pub id: String,
    pub order_id: String,
    pub charge_id: Option<String>,
    pub name: String,
    pub charge_type: AdjustmentKind,
    /// Cents or bps, as configured when the order was placed.
    pub rate: i64,
    pub amount_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub charges: Vec<OrderCharge>,
}

// =============================================================================
// Settings
// =============================================================================

/// Key of the delivery fee setting, in cents.
pub const SETTING_DELIVERY_CHARGE: &str = "delivery_charge_cents";
/// Key of the store currency setting (ISO 4217).
pub const SETTING_CURRENCY: &str = "currency";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Setting {
    pub key: String,
    pub value: String,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}
