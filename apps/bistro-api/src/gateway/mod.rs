//! Payment gateway integration: webhook signature checks and event decoding.
//!
//! Creating remote checkout sessions is left to the gateway SDKs on the
//! client; this side only learns about payments through signed webhooks.

pub mod paypal;
pub mod stripe;

/// What a webhook event means for the order it references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    Paid,
    Failed,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("{0} webhook is not configured")]
    NotConfigured(&'static str),

    #[error("Gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected gateway response: {0}")]
    UnexpectedResponse(String),
}
