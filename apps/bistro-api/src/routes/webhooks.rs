//! Signed payment callbacks from Stripe and PayPal.
//!
//! Both handlers take the raw body: Stripe signs the exact bytes, and
//! PayPal needs the event echoed back for verification.

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use bistro_db::PaymentUpdate;

use crate::error::{ApiError, ApiResult};
use crate::gateway::paypal::{self, TransmissionHeaders};
use crate::gateway::{stripe, GatewayError, PaymentOutcome};
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct Ack {
    received: bool,
    duplicate: bool,
}

impl Ack {
    fn new(duplicate: bool) -> Json<Ack> {
        Json(Ack {
            received: true,
            duplicate,
        })
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/webhook/stripe", post(stripe_webhook))
        .route("/api/webhook/paypal", post(paypal_webhook))
}

async fn stripe_webhook(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> ApiResult<Json<Ack>> {
    let Some(secret) = state.config.stripe.webhook_secret.as_deref() else {
        warn!("Stripe webhook received but no webhook secret is configured");
        return Err(ApiError::InvalidSignature("Stripe webhook is not configured".into()));
    };

    let sig_header = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::InvalidSignature("Missing Stripe-Signature header".into()))?;

    stripe::verify_webhook_signature(&body, sig_header, secret).map_err(|e| {
        warn!(error = %e, "Stripe signature verification failed");
        ApiError::InvalidSignature(e.to_string())
    })?;

    let event = parse_event(&body)?;
    let event_type = event["type"].as_str().unwrap_or_default();
    info!(event_type, event_id = event["id"].as_str().unwrap_or_default(), "Received Stripe webhook");

    let Some(outcome) = stripe::outcome(event_type) else {
        return Ok(Ack::new(false));
    };
    let order_id = stripe::order_reference(&event)
        .ok_or_else(|| ApiError::BadRequest("Event does not reference an order".into()))?;

    let info = json!({
        "gateway": "stripe",
        "event_id": event["id"],
        "event_type": event_type,
        "object": event["data"]["object"],
    });
    apply_outcome(&state, order_id, outcome, &info).await
}

async fn paypal_webhook(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> ApiResult<Json<Ack>> {
    let transmission = TransmissionHeaders::from_headers(&headers)
        .ok_or_else(|| ApiError::InvalidSignature("Missing PayPal transmission headers".into()))?;
    let event = parse_event(&body)?;

    match state.paypal.verify(&transmission, &event).await {
        Ok(true) => {}
        Ok(false) => {
            warn!(transmission_id = %transmission.transmission_id, "PayPal signature rejected");
            return Err(ApiError::InvalidSignature("PayPal signature verification failed".into()));
        }
        Err(e @ GatewayError::NotConfigured(_)) => {
            warn!(error = %e, "PayPal webhook received but PayPal is not configured");
            return Err(ApiError::InvalidSignature(e.to_string()));
        }
        // 5xx makes PayPal redeliver later
        Err(e) => {
            error!(error = %e, "PayPal verification call failed");
            return Err(ApiError::Internal(e.to_string()));
        }
    }

    let event_type = event["event_type"].as_str().unwrap_or_default();
    info!(event_type, event_id = event["id"].as_str().unwrap_or_default(), "Received PayPal webhook");

    let Some(outcome) = paypal::outcome(event_type) else {
        return Ok(Ack::new(false));
    };
    let order_id = paypal::order_reference(&event)
        .ok_or_else(|| ApiError::BadRequest("Event does not reference an order".into()))?;

    let info = json!({
        "gateway": "paypal",
        "event_id": event["id"],
        "event_type": event_type,
        "resource": event["resource"],
    });
    apply_outcome(&state, order_id, outcome, &info).await
}

fn parse_event(body: &[u8]) -> ApiResult<Value> {
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("Invalid event JSON: {}", e)))
}

async fn apply_outcome(state: &AppState, order_id: &str, outcome: PaymentOutcome, info: &Value) -> ApiResult<Json<Ack>> {
    let orders = state.db.orders();
    match outcome {
        PaymentOutcome::Paid => match orders.mark_paid(order_id, info).await? {
            PaymentUpdate::Updated(_) => Ok(Ack::new(false)),
            PaymentUpdate::AlreadyPaid(_) => Ok(Ack::new(true)),
        },
        PaymentOutcome::Failed => {
            let order = orders.mark_failed(order_id, info).await?;
            info!(order_id, payment_status = order.payment_status.as_str(), "Payment failure recorded");
            Ok(Ack::new(false))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{HeaderValue, Method, Request, StatusCode};
    use serde_json::{json, Value};

    use bistro_db::MenuItemInput;

    use crate::config::ApiConfig;
    use crate::routes::create_router;
    use crate::routes::test_support::{StaticPaypalVerifier, TestApp, STRIPE_SECRET};
    use crate::state::AppState;

    async fn place_order(app: &TestApp) -> String {
        let item = app
            .db()
            .menu_items()
            .insert(&MenuItemInput {
                category_id: None,
                name: "Ramen".into(),
                description: None,
                price_cents: 1250,
                discount_type: None,
                discount_value: 0,
                is_available: true,
                is_featured: false,
                sort_order: 0,
            })
            .await
            .unwrap();
        let (status, body) = app
            .json(
                Method::POST,
                "/api/orders",
                None,
                json!({ "customer_name": "Lin", "items": [{ "menu_item_id": item.id, "quantity": 1 }] }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["order"]["id"].as_str().unwrap().to_string()
    }

    fn stripe_event(event_type: &str, order_id: &str) -> Value {
        json!({
            "id": "evt_1",
            "type": event_type,
            "data": { "object": { "id": "cs_1", "metadata": { "order_id": order_id } } },
        })
    }

    fn stripe_request(event: &Value, secret: &str) -> Request<Body> {
        let payload = event.to_string();
        let header = crate::gateway::stripe::signature_header(
            payload.as_bytes(),
            secret,
            chrono::Utc::now().timestamp(),
        );
        Request::builder()
            .method(Method::POST)
            .uri("/api/webhook/stripe")
            .header("stripe-signature", header)
            .body(Body::from(payload))
            .unwrap()
    }

    fn paypal_request(event: &Value) -> Request<Body> {
        let mut request = Request::builder()
            .method(Method::POST)
            .uri("/api/webhook/paypal")
            .body(Body::from(event.to_string()))
            .unwrap();
        let headers = request.headers_mut();
        for (name, value) in [
            ("paypal-transmission-id", "tx-1"),
            ("paypal-transmission-time", "2026-01-01T00:00:00Z"),
            ("paypal-transmission-sig", "c2ln"),
            ("paypal-cert-url", "https://api.paypal.com/cert.pem"),
            ("paypal-auth-algo", "SHA256withRSA"),
        ] {
            headers.insert(name, HeaderValue::from_static(value));
        }
        request
    }

    #[tokio::test]
    async fn test_stripe_paid_is_idempotent() {
        let app = TestApp::new().await;
        let order_id = place_order(&app).await;
        let event = stripe_event("checkout.session.completed", &order_id);

        let (status, body) = app.send(stripe_request(&event, STRIPE_SECRET)).await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body, json!({ "received": true, "duplicate": false }));

        let (status, body) = app.send(stripe_request(&event, STRIPE_SECRET)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["duplicate"], true);

        let order = app.db().orders().get_by_id(&order_id).await.unwrap().unwrap();
        assert_eq!(order.payment_status.as_str(), "paid");
        assert_eq!(order.payment_info["gateway"], "stripe");
    }

    #[tokio::test]
    async fn test_stripe_rejects_bad_signature() {
        let app = TestApp::new().await;
        let order_id = place_order(&app).await;
        let event = stripe_event("checkout.session.completed", &order_id);

        let (status, body) = app.send(stripe_request(&event, "whsec_wrong")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_signature");

        let order = app.db().orders().get_by_id(&order_id).await.unwrap().unwrap();
        assert_eq!(order.payment_status.as_str(), "unpaid");
    }

    #[tokio::test]
    async fn test_stripe_unknown_event_and_order() {
        let app = TestApp::new().await;

        let (status, body) = app
            .send(stripe_request(&stripe_event("customer.created", "x"), STRIPE_SECRET))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["received"], true);

        let missing = stripe_event("payment_intent.succeeded", "00000000-0000-4000-8000-000000000000");
        let (status, _) = app.send(stripe_request(&missing, STRIPE_SECRET)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_stripe_failure_does_not_downgrade_paid() {
        let app = TestApp::new().await;
        let order_id = place_order(&app).await;

        app.send(stripe_request(&stripe_event("payment_intent.succeeded", &order_id), STRIPE_SECRET))
            .await;
        let (status, _) = app
            .send(stripe_request(&stripe_event("payment_intent.payment_failed", &order_id), STRIPE_SECRET))
            .await;
        assert_eq!(status, StatusCode::OK);

        let order = app.db().orders().get_by_id(&order_id).await.unwrap().unwrap();
        assert_eq!(order.payment_status.as_str(), "paid");
    }

    #[tokio::test]
    async fn test_paypal_capture() {
        let app = TestApp::new().await;
        let order_id = place_order(&app).await;
        let event = json!({
            "id": "WH-1",
            "event_type": "PAYMENT.CAPTURE.COMPLETED",
            "resource": { "id": "CAP-1", "custom_id": order_id },
        });

        let (status, body) = app.send(paypal_request(&event)).await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["duplicate"], false);

        let (_, body) = app.send(paypal_request(&event)).await;
        assert_eq!(body["duplicate"], true);
    }

    #[tokio::test]
    async fn test_paypal_rejected_signature() {
        let app = TestApp::new().await;
        let order_id = place_order(&app).await;

        let mut config = ApiConfig::default();
        config.auth.jwt_secret = "router-test-secret".into();
        let state = AppState::with_paypal(app.db().clone(), config, Arc::new(StaticPaypalVerifier(false)));
        let rejecting = TestApp {
            router: create_router(state.clone()),
            state,
        };

        let event = json!({
            "event_type": "PAYMENT.CAPTURE.COMPLETED",
            "resource": { "purchase_units": [{ "custom_id": order_id }] },
        });
        let (status, body) = rejecting.send(paypal_request(&event)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_signature");

        let mut unsigned = paypal_request(&event);
        unsigned.headers_mut().remove("paypal-transmission-sig");
        let (status, _) = app.send(unsigned).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
