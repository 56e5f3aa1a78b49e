//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely, plus the
//! `Rate` (basis points) and `Adjustment` (fixed or percentage) types that
//! discounts, charges and coupons are expressed in.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004                                      │
//! │    1.1 * 100 = 110.00000000000001  → ceil() = 111  ❌                   │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units                                      │
//! │    110 cents + 0 = 110 cents, always                                    │
//! │    Rounding happens only when a percentage is applied                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bistro_core::money::{Adjustment, Money, Rate};
//!
//! let price = Money::from_cents(1250); // 12.50
//! let service = Adjustment::Percentage(Rate::from_bps(1000)); // 10%
//! assert_eq!(service.amount_on(price).cents(), 125);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::MAX_PRICE_CENTS;

/// Basis points in 100%.
pub const BPS_SCALE: i64 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest unit of the store currency (cents).
///
/// ## Where Money is Used
/// ```text
/// MenuItem.price_cents ──► PricedLine.unit_price ──► PricedLine.subtotal
///                                                          │
/// Charge / Coupon ───────► Adjustment::amount_on() ────────┤
///                                                          ▼
///                              OrderTotals.grand_total ──► Stripe minor units
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use bistro_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the smaller of two amounts.
    #[inline]
    pub fn min(self, other: Money) -> Money {
        Money(self.0.min(other.0))
    }

    /// Clamps negative amounts to zero.
    #[inline]
    pub fn non_negative(self) -> Money {
        Money(self.0.max(0))
    }

    /// Applies a rate and returns the resulting amount, rounding half up.
    ///
    /// Integer formula: `(cents * bps + 5000) / 10000`.
    ///
    /// ```rust
    /// use bistro_core::money::{Money, Rate};
    ///
    /// // 10.00 at 8.25% = 0.825 → 0.83
    /// let tax = Money::from_cents(1000).percentage(Rate::from_bps(825));
    /// assert_eq!(tax.cents(), 83);
    /// ```
    pub fn percentage(&self, rate: Rate) -> Money {
        // i128 so large totals times 10000 cannot overflow
        let cents = (self.0 as i128 * rate.bps() as i128 + 5000) / BPS_SCALE as i128;
        Money::from_cents(cents as i64)
    }

    /// Multiplies money by a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// `None` when the sum leaves the `i64` range.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_sub(self, other: Money) -> Option<Money> {
        match self.0.checked_sub(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_mul(self, qty: i64) -> Option<Money> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Sums amounts, `None` on overflow.
    ///
    /// ```rust
    /// use bistro_core::money::Money;
    ///
    /// let parts = [Money::from_cents(100), Money::from_cents(250)];
    /// assert_eq!(Money::checked_sum(parts), Some(Money::from_cents(350)));
    /// assert_eq!(Money::checked_sum([Money::from_cents(i64::MAX), Money::from_cents(1)]), None);
    /// ```
    pub fn checked_sum(amounts: impl IntoIterator<Item = Money>) -> Option<Money> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, m| acc.checked_add(m))
    }

    /// Returns the amount as an exact decimal in major units.
    ///
    /// ```rust
    /// use bistro_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).to_decimal().to_string(), "10.99");
    /// ```
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Rate
// =============================================================================

/// A rate in basis points. 825 bps = 8.25%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a percentage, for config files and tests.
    pub fn from_percentage(pct: f64) -> Self {
        Rate((pct * 100.0).round() as u32)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

// =============================================================================
// Adjustment
// =============================================================================

/// How an adjustment value is interpreted. Stored as a TEXT column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    /// `value` is an amount in cents.
    Fixed,
    /// `value` is a rate in basis points.
    Percentage,
}

/// A price adjustment: a menu item discount, a charge, or a coupon.
///
/// ```text
/// Fixed(2.00)        on 12.50 → 2.00
/// Percentage(10%)    on 12.50 → 1.25
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Adjustment {
    Fixed(Money),
    Percentage(Rate),
}

impl Adjustment {
    /// Builds an adjustment from its stored `(kind, value)` columns.
    pub fn from_parts(kind: AdjustmentKind, value: i64) -> Result<Self, ValidationError> {
        match kind {
            AdjustmentKind::Fixed => {
                if !(0..=MAX_PRICE_CENTS).contains(&value) {
                    return Err(ValidationError::OutOfRange {
                        field: "value".to_string(),
                        min: 0,
                        max: MAX_PRICE_CENTS,
                    });
                }
                Ok(Adjustment::Fixed(Money::from_cents(value)))
            }
            AdjustmentKind::Percentage => {
                if !(0..=BPS_SCALE).contains(&value) {
                    return Err(ValidationError::OutOfRange {
                        field: "value".to_string(),
                        min: 0,
                        max: BPS_SCALE,
                    });
                }
                Ok(Adjustment::Percentage(Rate::from_bps(value as u32)))
            }
        }
    }

    /// Builds an adjustment from trusted stored columns, clamping values
    /// that fall outside the valid range.
    pub fn clamped(kind: AdjustmentKind, value: i64) -> Self {
        match kind {
            AdjustmentKind::Fixed => Adjustment::Fixed(Money::from_cents(value.max(0))),
            AdjustmentKind::Percentage => {
                Adjustment::Percentage(Rate::from_bps(value.clamp(0, BPS_SCALE) as u32))
            }
        }
    }

    pub fn kind(&self) -> AdjustmentKind {
        match self {
            Adjustment::Fixed(_) => AdjustmentKind::Fixed,
            Adjustment::Percentage(_) => AdjustmentKind::Percentage,
        }
    }

    /// The raw stored value: cents for fixed, bps for percentage.
    pub fn value(&self) -> i64 {
        match self {
            Adjustment::Fixed(m) => m.cents(),
            Adjustment::Percentage(r) => r.bps() as i64,
        }
    }

    /// Amount this adjustment yields against `base`.
    ///
    /// Fixed amounts ignore the base.
    pub fn amount_on(&self, base: Money) -> Money {
        match self {
            Adjustment::Fixed(m) => *m,
            Adjustment::Percentage(r) => base.percentage(*r),
        }
    }
}
