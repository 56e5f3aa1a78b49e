//! PayPal webhook verification.
//!
//! PayPal signs with a certificate chain, so verification is delegated to
//! its `verify-webhook-signature` endpoint. The [`PaypalVerifier`] trait is
//! the seam that lets tests swap the HTTP call out.

use async_trait::async_trait;
use axum::http::HeaderMap;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{GatewayError, PaymentOutcome};
use crate::config::PaypalConfig;

/// Transmission headers PayPal attaches to each delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransmissionHeaders {
    pub transmission_id: String,
    pub transmission_time: String,
    pub transmission_sig: String,
    pub cert_url: String,
    pub auth_algo: String,
}

impl TransmissionHeaders {
    /// `None` when any header is absent.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Some(TransmissionHeaders {
            transmission_id: get("paypal-transmission-id")?,
            transmission_time: get("paypal-transmission-time")?,
            transmission_sig: get("paypal-transmission-sig")?,
            cert_url: get("paypal-cert-url")?,
            auth_algo: get("paypal-auth-algo")?,
        })
    }
}

#[async_trait]
pub trait PaypalVerifier: Send + Sync {
    /// `Ok(false)` means PayPal answered and rejected the signature.
    async fn verify(&self, headers: &TransmissionHeaders, event: &Value) -> Result<bool, GatewayError>;
}

/// Verifier backed by the PayPal REST API.
pub struct HttpPaypalVerifier {
    client: reqwest::Client,
    config: PaypalConfig,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct VerifyResponse {
    verification_status: String,
}

impl HttpPaypalVerifier {
    pub fn new(config: PaypalConfig) -> Self {
        HttpPaypalVerifier {
            client: reqwest::Client::new(),
            config,
        }
    }

    async fn access_token(&self, client_id: &str, client_secret: &str) -> Result<String, GatewayError> {
        let response = self
            .client
            .post(format!("{}/v1/oauth2/token", self.config.api_base))
            .basic_auth(client_id, Some(client_secret))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials")
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<TokenResponse>().await?.access_token)
    }
}

#[async_trait]
impl PaypalVerifier for HttpPaypalVerifier {
    async fn verify(&self, headers: &TransmissionHeaders, event: &Value) -> Result<bool, GatewayError> {
        let (Some(client_id), Some(client_secret), Some(webhook_id)) = (
            self.config.client_id.as_deref(),
            self.config.client_secret.as_deref(),
            self.config.webhook_id.as_deref(),
        ) else {
            return Err(GatewayError::NotConfigured("PayPal"));
        };

        let token = self.access_token(client_id, client_secret).await?;

        let body = json!({
            "auth_algo": headers.auth_algo,
            "cert_url": headers.cert_url,
            "transmission_id": headers.transmission_id,
            "transmission_sig": headers.transmission_sig,
            "transmission_time": headers.transmission_time,
            "webhook_id": webhook_id,
            "webhook_event": event,
        });

        let response = self
            .client
            .post(format!("{}/v1/notifications/verify-webhook-signature", self.config.api_base))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<VerifyResponse>()
            .await?;

        debug!(status = %response.verification_status, "PayPal verification answered");

        match response.verification_status.as_str() {
            "SUCCESS" => Ok(true),
            "FAILURE" => Ok(false),
            other => Err(GatewayError::UnexpectedResponse(other.to_string())),
        }
    }
}

/// Maps a PayPal event type to its effect on the order.
pub fn outcome(event_type: &str) -> Option<PaymentOutcome> {
    match event_type {
        "CHECKOUT.ORDER.APPROVED" | "PAYMENT.CAPTURE.COMPLETED" => Some(PaymentOutcome::Paid),
        "PAYMENT.CAPTURE.DENIED" => Some(PaymentOutcome::Failed),
        _ => None,
    }
}

/// The order id set as `custom_id` when the PayPal order was created.
pub fn order_reference(event: &Value) -> Option<&str> {
    let resource = &event["resource"];
    resource["custom_id"]
        .as_str()
        .or_else(|| resource["purchase_units"][0]["custom_id"].as_str())
        .filter(|id| !id.is_empty())
}
