//! # Currency Module
//!
//! Two presentation-boundary helpers:
//!
//! - [`format_precision`] rounds a value to a fixed number of decimals the
//!   way the storefront displays prices.
//! - [`to_stripe_amount`] converts a decimal amount into the integer minor
//!   unit a card processor expects for a given ISO currency.
//!
//! ## Stripe Minor Units
//! ```text
//! ┌──────────────────┬───────────────────────────┬─────────────────────────┐
//! │ Class            │ Currencies                │ Formula                 │
//! ├──────────────────┼───────────────────────────┼─────────────────────────┤
//! │ Zero-decimal     │ JPY, KRW, VND, ...        │ ceil(amount)            │
//! │ Three-decimal    │ BHD, JOD, KWD, OMR, TND   │ ceil(amount×100) × 10   │
//! │ Special          │ HUF, ISK, TWD, UGX        │ ceil(amount) × 100      │
//! │ Standard         │ everything else           │ ceil(amount×100)        │
//! └──────────────────┴───────────────────────────┴─────────────────────────┘
//! ```
//! Three-decimal results are always a multiple of 10, special results a
//! multiple of 100.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::money::Money;

/// Decimals used when no precision is given.
pub const DEFAULT_PRECISION: u32 = 2;

const ZERO_DECIMAL_CURRENCIES: &[&str] = &[
    "BIF", "CLP", "DJF", "GNF", "JPY", "KMF", "KRW", "MGA", "PYG", "RWF", "VND", "VUV", "XAF",
    "XOF", "XPF",
];

const THREE_DECIMAL_CURRENCIES: &[&str] = &["BHD", "JOD", "KWD", "OMR", "TND"];

/// Charged in two decimals, but settled in whole units divisible by 100 minor units.
const SPECIAL_CASE_CURRENCIES: &[&str] = &["HUF", "ISK", "TWD", "UGX"];

// =============================================================================
// Precision Formatting
// =============================================================================

/// A value accepted by [`format_precision`]: a number or numeric text.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericValue {
    Number(f64),
    Text(String),
}

impl NumericValue {
    /// Coerces to `f64`. Blank text is zero, unparsable text is NaN.
    pub fn to_f64(&self) -> f64 {
        match self {
            NumericValue::Number(n) => *n,
            NumericValue::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    0.0
                } else {
                    s.parse::<f64>().unwrap_or(f64::NAN)
                }
            }
        }
    }
}

impl From<f64> for NumericValue {
    fn from(value: f64) -> Self {
        NumericValue::Number(value)
    }
}

impl From<i64> for NumericValue {
    fn from(value: i64) -> Self {
        NumericValue::Number(value as f64)
    }
}

impl From<&str> for NumericValue {
    fn from(value: &str) -> Self {
        NumericValue::Text(value.to_string())
    }
}

impl From<String> for NumericValue {
    fn from(value: String) -> Self {
        NumericValue::Text(value)
    }
}

impl From<Money> for NumericValue {
    fn from(value: Money) -> Self {
        NumericValue::Number(value.to_decimal().to_f64().unwrap_or(f64::NAN))
    }
}

/// Rounds `value` to `precision` decimals (default 2).
///
/// The exact binary value of the float is rounded half away from zero, so
/// `1.005` (stored as `1.00499999…`) becomes `1.0` while the exactly
/// representable `0.125` becomes `0.13`. NaN and infinities pass through.
///
/// ```rust
/// use bistro_core::currency::format_precision;
///
/// assert_eq!(format_precision(3.14159, None), 3.14);
/// assert_eq!(format_precision("2.5", Some(0)), 3.0);
/// assert_eq!(format_precision(1.005, Some(2)), 1.0);
/// assert!(format_precision("abc", None).is_nan());
/// ```
pub fn format_precision(value: impl Into<NumericValue>, precision: Option<u32>) -> f64 {
    let precision = precision.unwrap_or(DEFAULT_PRECISION);
    let number = value.into().to_f64();

    if !number.is_finite() {
        return number;
    }

    match Decimal::from_f64_retain(number) {
        Some(exact) => exact
            .round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero)
            .to_f64()
            .unwrap_or(number),
        // Outside Decimal's range there are no fractional digits left to round
        None => number,
    }
}

// =============================================================================
// Stripe Minor Units
// =============================================================================

/// How a currency maps to processor minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencyClass {
    ZeroDecimal,
    ThreeDecimal,
    Special,
    Standard,
}

impl CurrencyClass {
    /// Classifies an ISO 4217 code, case-insensitively.
    ///
    /// The special table is consulted first: UGX is zero-decimal for
    /// display but must be sent with the special rounding.
    pub fn of(currency: &str) -> Self {
        let code = currency.trim().to_ascii_uppercase();
        let code = code.as_str();

        if SPECIAL_CASE_CURRENCIES.contains(&code) {
            CurrencyClass::Special
        } else if ZERO_DECIMAL_CURRENCIES.contains(&code) {
            CurrencyClass::ZeroDecimal
        } else if THREE_DECIMAL_CURRENCIES.contains(&code) {
            CurrencyClass::ThreeDecimal
        } else {
            CurrencyClass::Standard
        }
    }
}

/// Converts a decimal amount to the processor's integer minor unit.
///
/// ```rust
/// use bistro_core::currency::to_stripe_amount;
/// use rust_decimal::Decimal;
///
/// assert_eq!(to_stripe_amount("usd", Decimal::new(1999, 2)), 1999);
/// assert_eq!(to_stripe_amount("JPY", Decimal::new(5001, 1)), 501);
/// assert_eq!(to_stripe_amount("KWD", Decimal::new(12345, 3)), 12350);
/// assert_eq!(to_stripe_amount("HUF", Decimal::new(1234, 2)), 1300);
/// ```
pub fn to_stripe_amount(currency: &str, amount: Decimal) -> i64 {
    let hundred = Decimal::ONE_HUNDRED;
    let minor = match CurrencyClass::of(currency) {
        CurrencyClass::ZeroDecimal => amount.ceil(),
        CurrencyClass::ThreeDecimal => (amount * hundred).ceil() * Decimal::TEN,
        CurrencyClass::Special => amount.ceil() * hundred,
        CurrencyClass::Standard => (amount * hundred).ceil(),
    };

    minor.to_i64().unwrap_or(if minor.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// Converts a stored `Money` value (two-decimal store currency) for checkout.
pub fn money_to_stripe_amount(currency: &str, amount: Money) -> i64 {
    to_stripe_amount(currency, amount.to_decimal())
}

/// Converts a float amount, as received from loosely-typed clients.
///
/// Returns `None` for NaN or infinite input.
pub fn f64_to_stripe_amount(currency: &str, amount: f64) -> Option<i64> {
    Decimal::from_f64(amount).map(|d| to_stripe_amount(currency, d))
}
