//! Stripe webhook signatures and event decoding.
//!
//! `Stripe-Signature: t=1700000000,v1=5257a869...,v1=...`
//!
//! The signed payload is `"{t}.{raw body}"`, HMAC-SHA256 with the endpoint
//! secret. Any of the `v1` entries may match (Stripe sends several while a
//! secret is being rolled).

use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;

use super::PaymentOutcome;

/// Events older (or newer) than this are refused.
pub const TIMESTAMP_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("Invalid Stripe-Signature header")]
    MalformedHeader,

    #[error("Webhook signature mismatch")]
    Mismatch,

    #[error("Webhook timestamp outside tolerance")]
    TimestampOutOfRange,
}

/// Verifies a webhook body against its `Stripe-Signature` header.
pub fn verify_webhook_signature(payload: &[u8], sig_header: &str, secret: &str) -> Result<(), SignatureError> {
    verify_at(payload, sig_header, secret, chrono::Utc::now().timestamp())
}

fn verify_at(payload: &[u8], sig_header: &str, secret: &str, now: i64) -> Result<(), SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in sig_header.split(',') {
        let part = part.trim();
        if let Some(t) = part.strip_prefix("t=") {
            timestamp = Some(t);
        } else if let Some(v) = part.strip_prefix("v1=") {
            signatures.push(v);
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::MalformedHeader)?;
    if signatures.is_empty() {
        return Err(SignatureError::MalformedHeader);
    }

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::MalformedHeader)?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);

    // Constant-time comparison via verify_slice
    let matched = signatures.iter().any(|sig| {
        hex::decode(sig)
            .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });
    if !matched {
        return Err(SignatureError::Mismatch);
    }

    let ts: i64 = timestamp.parse().map_err(|_| SignatureError::MalformedHeader)?;
    if (now - ts).abs() > TIMESTAMP_TOLERANCE_SECS {
        return Err(SignatureError::TimestampOutOfRange);
    }

    Ok(())
}

/// Maps a Stripe event type to its effect on the order.
pub fn outcome(event_type: &str) -> Option<PaymentOutcome> {
    match event_type {
        "checkout.session.completed" | "payment_intent.succeeded" => Some(PaymentOutcome::Paid),
        "payment_intent.payment_failed" => Some(PaymentOutcome::Failed),
        _ => None,
    }
}

/// The order id carried by the event object.
pub fn order_reference(event: &Value) -> Option<&str> {
    let object = &event["data"]["object"];
    object["metadata"]["order_id"]
        .as_str()
        .or_else(|| object["client_reference_id"].as_str())
        .filter(|id| !id.is_empty())
}

/// Builds a valid header for `payload`. Test helper.
#[cfg(test)]
pub(crate) fn signature_header(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{}.", timestamp).as_bytes());
    mac.update(payload);
    format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "whsec_test";
    const NOW: i64 = 1_700_000_000;

    #[test]
    fn test_valid_signature() {
        let body = br#"{"id":"evt_1"}"#;
        let header = signature_header(body, SECRET, NOW);
        assert_eq!(verify_at(body, &header, SECRET, NOW + 10), Ok(()));
    }

    #[test]
    fn test_any_v1_may_match() {
        let body = br#"{"id":"evt_1"}"#;
        let valid = signature_header(body, SECRET, NOW);
        let header = format!("t={},v1=deadbeef,{}", NOW, valid.split(',').nth(1).unwrap());
        assert_eq!(verify_at(body, &header, SECRET, NOW), Ok(()));
    }

    #[test]
    fn test_tampered_body() {
        let header = signature_header(br#"{"amount":100}"#, SECRET, NOW);
        assert_eq!(
            verify_at(br#"{"amount":1}"#, &header, SECRET, NOW),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_stale_timestamp() {
        let body = b"{}";
        let header = signature_header(body, SECRET, NOW);
        assert_eq!(
            verify_at(body, &header, SECRET, NOW + TIMESTAMP_TOLERANCE_SECS + 1),
            Err(SignatureError::TimestampOutOfRange)
        );
    }

    #[test]
    fn test_malformed_header() {
        assert_eq!(verify_at(b"{}", "v1=abc", SECRET, NOW), Err(SignatureError::MalformedHeader));
        assert_eq!(verify_at(b"{}", "t=1", SECRET, NOW), Err(SignatureError::MalformedHeader));
        assert_eq!(verify_at(b"{}", "t=1,v1=zz", SECRET, 1), Err(SignatureError::Mismatch));
    }

    #[test]
    fn test_event_decoding() {
        assert_eq!(outcome("payment_intent.succeeded"), Some(PaymentOutcome::Paid));
        assert_eq!(outcome("payment_intent.payment_failed"), Some(PaymentOutcome::Failed));
        assert_eq!(outcome("customer.created"), None);

        let event = json!({ "data": { "object": { "metadata": { "order_id": "o-1" } } } });
        assert_eq!(order_reference(&event), Some("o-1"));

        let event = json!({ "data": { "object": { "client_reference_id": "o-2", "metadata": {} } } });
        assert_eq!(order_reference(&event), Some("o-2"));

        assert_eq!(order_reference(&json!({})), None);
    }
}
