//! # Order Status
//!
//! Order type, order status with its transition table, and payment status.
//!
//! ## Status Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  pending ──► processing ──► ready ──┬──► completed   (dine-in/pickup)   │
//! │     │            │            │     │                                   │
//! │     │            │            │     └──► on_delivery ──► completed      │
//! │     │            │            │          (delivery)   └─► failed        │
//! │     ▼            ▼            ▼                                         │
//! │  canceled / failed       canceled                                       │
//! │                                                                         │
//! │  completed, canceled and failed are terminal                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};

// =============================================================================
// Order Type
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    DineIn,
    Delivery,
    Pickup,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::DineIn => "dine_in",
            OrderType::Delivery => "delivery",
            OrderType::Pickup => "pickup",
        }
    }
}

impl FromStr for OrderType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dine_in" => Ok(OrderType::DineIn),
            "delivery" => Ok(OrderType::Delivery),
            "pickup" => Ok(OrderType::Pickup),
            _ => Err(ValidationError::NotAllowed {
                field: "order_type".to_string(),
                allowed: vec!["dine_in".into(), "delivery".into(), "pickup".into()],
            }),
        }
    }
}

// =============================================================================
// Order Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Ready,
    OnDelivery,
    Completed,
    Canceled,
    Failed,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Ready,
        OrderStatus::OnDelivery,
        OrderStatus::Completed,
        OrderStatus::Canceled,
        OrderStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Ready => "ready",
            OrderStatus::OnDelivery => "on_delivery",
            OrderStatus::Completed => "completed",
            OrderStatus::Canceled => "canceled",
            OrderStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Completed | OrderStatus::Canceled | OrderStatus::Failed
        )
    }

    /// The statuses reachable from `self` for an order of `order_type`.
    pub fn next_statuses(&self, order_type: OrderType) -> &'static [OrderStatus] {
        use OrderStatus::*;

        let delivery = order_type == OrderType::Delivery;
        match self {
            Pending => &[Processing, Canceled, Failed],
            Processing => &[Ready, Canceled, Failed],
            Ready if delivery => &[OnDelivery, Canceled],
            Ready => &[Completed, Canceled],
            OnDelivery => &[Completed, Failed],
            Completed | Canceled | Failed => &[],
        }
    }

    pub fn can_transition_to(&self, next: OrderStatus, order_type: OrderType) -> bool {
        self.next_statuses(order_type).contains(&next)
    }

    /// Validates a transition and returns the new status.
    pub fn transition(self, next: OrderStatus, order_type: OrderType) -> CoreResult<OrderStatus> {
        if self.can_transition_to(next, order_type) {
            Ok(next)
        } else {
            Err(CoreError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: next.as_str().to_string(),
            })
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: OrderStatus::ALL.iter().map(|s| s.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Payment Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Failed,
    Refunded,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Unpaid
    }
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_dine_in() {
        let status = OrderStatus::Pending
            .transition(OrderStatus::Processing, OrderType::DineIn)
            .and_then(|s| s.transition(OrderStatus::Ready, OrderType::DineIn))
            .and_then(|s| s.transition(OrderStatus::Completed, OrderType::DineIn))
            .unwrap();
        assert_eq!(status, OrderStatus::Completed);
    }

    #[test]
    fn test_happy_path_delivery() {
        let status = OrderStatus::Pending
            .transition(OrderStatus::Processing, OrderType::Delivery)
            .and_then(|s| s.transition(OrderStatus::Ready, OrderType::Delivery))
            .and_then(|s| s.transition(OrderStatus::OnDelivery, OrderType::Delivery))
            .and_then(|s| s.transition(OrderStatus::Completed, OrderType::Delivery))
            .unwrap();
        assert_eq!(status, OrderStatus::Completed);
    }

    #[test]
    fn test_on_delivery_only_for_delivery_orders() {
        assert!(!OrderStatus::Ready.can_transition_to(OrderStatus::OnDelivery, OrderType::Pickup));
        assert!(!OrderStatus::Ready.can_transition_to(OrderStatus::Completed, OrderType::Delivery));
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        for terminal in [OrderStatus::Completed, OrderStatus::Canceled, OrderStatus::Failed] {
            assert!(terminal.is_terminal());
            for next in OrderStatus::ALL {
                assert!(terminal.transition(next, OrderType::Delivery).is_err());
            }
        }
    }

    #[test]
    fn test_skipping_and_self_transitions_rejected() {
        assert!(OrderStatus::Pending
            .transition(OrderStatus::Completed, OrderType::Pickup)
            .is_err());
        assert!(OrderStatus::Processing
            .transition(OrderStatus::Processing, OrderType::Pickup)
            .is_err());
        let err = OrderStatus::Ready
            .transition(OrderStatus::Pending, OrderType::Pickup)
            .unwrap_err();
        assert_eq!(err.to_string(), "Cannot change order status from ready to pending");
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("on_delivery".parse::<OrderStatus>().unwrap(), OrderStatus::OnDelivery);
        assert!("shipped".parse::<OrderStatus>().is_err());
        assert_eq!("dine_in".parse::<OrderType>().unwrap(), OrderType::DineIn);
        assert_eq!(
            serde_json::to_string(&OrderStatus::OnDelivery).unwrap(),
            "\"on_delivery\""
        );
    }
}
