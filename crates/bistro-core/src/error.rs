//! # Error Types
//!
//! Domain-specific error types for bistro-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bistro-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                        │
//! │  ├── CouponRejection  - Why a coupon cannot be applied                  │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  bistro-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  bistro-api errors (in app)                                             │
//! │  └── ApiError         - What HTTP clients see (JSON)                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised while pricing or updating orders.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Menu item not found: {0}")]
    MenuItemNotFound(String),

    /// The item exists but is switched off in the catalog.
    #[error("{name} is currently unavailable")]
    MenuItemUnavailable { name: String },

    /// A selected variant option or addon is not attached to the item.
    ///
    /// ## When This Occurs
    /// - Stale cart after an admin detached an addon
    /// - Two options chosen for the same variant
    /// - Client sends an option id belonging to another item
    #[error("Invalid selection for {item}: {reason}")]
    InvalidSelection { item: String, reason: String },

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// ## User Workflow
    /// ```text
    /// PATCH /api/admin/orders/{id}/status { "status": "completed" }
    ///      │
    ///      ▼
    /// current: pending
    ///      │
    ///      ▼
    /// InvalidStatusTransition { from: "pending", to: "completed" }
    ///      │
    ///      ▼
    /// 409 Conflict
    /// ```
    #[error("Cannot change order status from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Coupon {code} cannot be applied: {reason}")]
    CouponRejected { code: String, reason: CouponRejection },

    #[error("Payment method {0} is not available")]
    PaymentMethodUnavailable(String),

    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Line or order arithmetic left the `i64` range.
    #[error("Order amount is too large")]
    AmountOverflow,

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Reasons a coupon is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponRejection {
    Inactive,
    NotStarted,
    Expired,
    UsageLimitReached,
    MinimumNotMet,
}

impl std::fmt::Display for CouponRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            CouponRejection::Inactive => "coupon is not active",
            CouponRejection::NotStarted => "coupon is not valid yet",
            CouponRejection::Expired => "coupon has expired",
            CouponRejection::UsageLimitReached => "coupon usage limit reached",
            CouponRejection::MinimumNotMet => "order does not reach the minimum amount",
        };
        f.write_str(msg)
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Every variant names the offending field so the API can build a
/// `{ field: [messages] }` map.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., coupon code already in use).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    /// The field this error is reported against.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. }
            | ValidationError::Duplicate { field, .. } => field,
        }
    }

    /// Re-targets the error at a nested field, e.g. `items.0.quantity`.
    pub fn with_prefix(self, prefix: &str) -> Self {
        let rename = |field: String| format!("{}.{}", prefix, field);
        match self {
            ValidationError::Required { field } => ValidationError::Required { field: rename(field) },
            ValidationError::TooShort { field, min } => ValidationError::TooShort {
                field: rename(field),
                min,
            },
            ValidationError::TooLong { field, max } => ValidationError::TooLong {
                field: rename(field),
                max,
            },
            ValidationError::OutOfRange { field, min, max } => ValidationError::OutOfRange {
                field: rename(field),
                min,
                max,
            },
            ValidationError::MustBePositive { field } => {
                ValidationError::MustBePositive { field: rename(field) }
            }
            ValidationError::InvalidFormat { field, reason } => ValidationError::InvalidFormat {
                field: rename(field),
                reason,
            },
            ValidationError::NotAllowed { field, allowed } => ValidationError::NotAllowed {
                field: rename(field),
                allowed,
            },
            ValidationError::Duplicate { field, value } => ValidationError::Duplicate {
                field: rename(field),
                value,
            },
        }
    }
}

/// Collects every failing field of a request before rejecting it.
///
/// ```rust
/// use bistro_core::error::{ValidationError, ValidationErrors};
///
/// let mut errors = ValidationErrors::new();
/// errors.check::<()>(Err(ValidationError::Required { field: "name".into() }));
/// errors.check(Ok(()));
/// assert_eq!(errors.len(), 1);
/// assert!(errors.into_result().is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Error)]
#[error("{} validation error(s)", .errors.len())]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Records the error of `result`, if any, and discards the value.
    pub fn check<T>(&mut self, result: Result<T, ValidationError>) {
        if let Err(e) = result {
            self.errors.push(e);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Groups messages by field, in field order.
    pub fn by_field(&self) -> BTreeMap<String, Vec<String>> {
        let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for error in &self.errors {
            map.entry(error.field().to_string())
                .or_default()
                .push(error.to_string());
        }
        map
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        ValidationErrors { errors: vec![error] }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::MenuItemUnavailable {
            name: "Margherita".to_string(),
        };
        assert_eq!(err.to_string(), "Margherita is currently unavailable");

        let err = CoreError::CouponRejected {
            code: "SAVE10".to_string(),
            reason: CouponRejection::Expired,
        };
        assert_eq!(err.to_string(), "Coupon SAVE10 cannot be applied: coupon has expired");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");
        assert_eq!(err.field(), "name");

        let err = ValidationError::TooShort {
            field: "password".to_string(),
            min: 8,
        };
        assert_eq!(err.to_string(), "password must be at least 8 characters");
    }

    #[test]
    fn test_with_prefix() {
        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }
        .with_prefix("items.2");
        assert_eq!(err.field(), "items.2.quantity");
    }

    #[test]
    fn test_validation_errors_group_by_field() {
        let mut errors = ValidationErrors::new();
        errors.push(ValidationError::Required { field: "name".into() });
        errors.push(ValidationError::TooLong { field: "name".into(), max: 3 });
        errors.push(ValidationError::MustBePositive { field: "price".into() });

        let map = errors.by_field();
        assert_eq!(map["name"].len(), 2);
        assert_eq!(map["price"], vec!["price must be positive".to_string()]);
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
