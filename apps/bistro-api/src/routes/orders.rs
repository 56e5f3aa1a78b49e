//! Cart pricing, order placement and the order lifecycle.
//!
//! ## Placement Flow
//! ```text
//! POST /api/orders
//!   │
//!   ├─ validate customer fields
//!   ├─ payment method enabled?
//!   ├─ load each item detail ─► resolve_line (options, addons, charges)
//!   ├─ coupon lookup ─► price_order (coupon checks, delivery fee)
//!   └─ OrderRepository::create (one transaction)
//!        sequence ─► coupon redeem ─► order ─► items ─► charges
//! ```

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use bistro_core::currency::{format_precision, money_to_stripe_amount};
use bistro_core::pricing::{price_order, resolve_line, CartLine, OrderPricingInput, OrderTotals};
use bistro_core::validation::{validate_cart_size, validate_delivery_address, validate_email, validate_name, validate_optional_text};
use bistro_core::{
    CoreError, Coupon, MenuItemDetail, Order, OrderDetail, OrderStatus, OrderType, PaymentStatus, ValidationErrors,
};
use bistro_db::{NewOrder, OrderFilter, PageRequest};

use super::coupons;
use crate::auth::StaffUser;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::pagination::Paginated;
use crate::state::AppState;
use crate::validate::{NAME_MAX, NOTES_MAX, PHONE_MAX};

#[derive(Debug, Clone, Deserialize)]
pub struct CartRequest {
    /// Dine-in when omitted.
    pub order_type: Option<OrderType>,
    pub items: Vec<CartLine>,
    pub coupon_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderRequest {
    #[serde(flatten)]
    pub cart: CartRequest,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub delivery_address: Option<String>,
    pub table_number: Option<String>,
    pub notes: Option<String>,
    pub payment_method: Option<String>,
}

impl PlaceOrderRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(validate_name("customer_name", &self.customer_name, NAME_MAX));
        errors.check(validate_optional_text("customer_phone", self.customer_phone.as_deref(), PHONE_MAX));
        if let Some(email) = &self.customer_email {
            errors.check(validate_email("customer_email", email));
        }
        errors.check(validate_delivery_address(
            self.cart.order_type.unwrap_or(OrderType::DineIn),
            self.delivery_address.as_deref(),
        ));
        errors.check(validate_optional_text("delivery_address", self.delivery_address.as_deref(), NOTES_MAX));
        errors.check(validate_optional_text("table_number", self.table_number.as_deref(), PHONE_MAX));
        errors.check(validate_optional_text("notes", self.notes.as_deref(), NOTES_MAX));
        errors.check(validate_cart_size(self.cart.items.len()));
        errors.into_result()
    }
}

#[derive(Debug, Deserialize)]
struct OrderListQuery {
    status: Option<OrderStatus>,
    order_type: Option<OrderType>,
    payment_status: Option<PaymentStatus>,
    page: Option<u32>,
    limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct StatusChange {
    status: OrderStatus,
}

/// What the storefront hands to the payment SDK.
#[derive(Debug, Serialize)]
struct Checkout {
    order_id: String,
    order_number: String,
    currency: String,
    /// Total in the processor's minor unit.
    amount: i64,
    /// Total in major units, rounded for display.
    display_amount: f64,
    payment_status: PaymentStatus,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/orders", post(place))
        .route("/api/orders/quote", post(quote))
        .route("/api/orders/{id}/checkout", get(checkout))
        .route("/api/admin/orders", get(list))
        .route("/api/admin/orders/{id}", get(show))
        .route("/api/admin/orders/{id}/status", patch(change_status))
}

/// Resolves the cart against the catalog and prices it.
async fn price_cart(state: &AppState, cart: &CartRequest) -> ApiResult<(OrderTotals, Option<Coupon>)> {
    validate_cart_size(cart.items.len())?;

    let mut details: HashMap<&str, MenuItemDetail> = HashMap::new();
    let mut lines = Vec::with_capacity(cart.items.len());
    for line in &cart.items {
        let id = line.menu_item_id.as_str();
        if !details.contains_key(id) {
            let detail = state
                .db
                .menu_items()
                .get_detail(id)
                .await?
                .ok_or_else(|| CoreError::MenuItemNotFound(id.to_string()))?;
            details.insert(id, detail);
        }
        lines.push(resolve_line(&details[id], line)?);
    }

    let coupon = match cart.coupon_code.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        Some(code) => Some(coupons::lookup(state, code).await?),
        None => None,
    };

    let totals = price_order(&OrderPricingInput {
        order_type: cart.order_type.unwrap_or(OrderType::DineIn),
        lines,
        coupon: coupon.clone(),
        delivery_charge: state.db.settings().delivery_charge().await?,
        now: Utc::now(),
    })?;

    Ok((totals, coupon))
}

async fn quote(State(state): State<AppState>, ApiJson(cart): ApiJson<CartRequest>) -> ApiResult<Json<OrderTotals>> {
    let (totals, _) = price_cart(&state, &cart).await?;
    Ok(Json(totals))
}

async fn place(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<PlaceOrderRequest>,
) -> ApiResult<(StatusCode, Json<OrderDetail>)> {
    req.validate()?;

    if let Some(code) = &req.payment_method {
        let enabled = state
            .db
            .payment_methods()
            .get(code)
            .await?
            .is_some_and(|m| m.is_enabled);
        if !enabled {
            return Err(CoreError::PaymentMethodUnavailable(code.clone()).into());
        }
    }

    let (totals, coupon) = price_cart(&state, &req.cart).await?;

    let new = NewOrder {
        order_type: req.cart.order_type,
        customer_name: req.customer_name,
        customer_phone: req.customer_phone,
        customer_email: req.customer_email,
        delivery_address: req.delivery_address,
        table_number: req.table_number,
        notes: req.notes,
        payment_method: req.payment_method,
        user_id: None,
    };

    let detail = state
        .db
        .orders()
        .create(&new, &totals, coupon.as_ref().map(|c| c.id.as_str()))
        .await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

async fn checkout(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Checkout>> {
    let order = state
        .db
        .orders()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", &id))?;

    if order.payment_status == PaymentStatus::Paid {
        return Err(ApiError::Conflict(format!("Order {} is already paid", order.order_number)));
    }
    if matches!(order.status, OrderStatus::Canceled | OrderStatus::Failed) {
        return Err(ApiError::Conflict(format!(
            "Order {} is {} and cannot be paid",
            order.order_number, order.status
        )));
    }

    let currency = state.db.settings().currency().await?;
    Ok(Json(Checkout {
        amount: money_to_stripe_amount(&currency, order.total()),
        display_amount: format_precision(order.total(), None),
        order_id: order.id,
        order_number: order.order_number,
        currency,
        payment_status: order.payment_status,
    }))
}

async fn list(
    State(state): State<AppState>,
    _staff: StaffUser,
    ApiQuery(query): ApiQuery<OrderListQuery>,
) -> ApiResult<Json<Paginated<Order>>> {
    let filter = OrderFilter {
        status: query.status,
        order_type: query.order_type,
        payment_status: query.payment_status,
    };
    let page = state
        .db
        .orders()
        .list(&filter, PageRequest::new(query.page, query.limit))
        .await?;
    Ok(Json(page.into()))
}

async fn show(State(state): State<AppState>, _staff: StaffUser, Path(id): Path<String>) -> ApiResult<Json<OrderDetail>> {
    let detail = state
        .db
        .orders()
        .get_detail(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", &id))?;
    Ok(Json(detail))
}

async fn change_status(
    State(state): State<AppState>,
    StaffUser(user): StaffUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<StatusChange>,
) -> ApiResult<Json<Order>> {
    let order = state.db.orders().update_status(&id, req.status).await?;
    info!(order_id = %id, status = %order.status, by = %user.id, "Order status updated by staff");
    Ok(Json(order))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};

    use bistro_core::{AdjustmentKind, UserRole, SETTING_CURRENCY, SETTING_DELIVERY_CHARGE};
    use bistro_db::{ChargeInput, CouponInput, MenuItemInput, Relation};

    use crate::routes::test_support::TestApp;

    /// A 1000-cent item carrying a 10% charge.
    async fn seed_item(app: &TestApp) -> String {
        let db = app.db();
        let item = db
            .menu_items()
            .insert(&MenuItemInput {
                category_id: None,
                name: "Margherita".into(),
                description: None,
                price_cents: 1000,
                discount_type: None,
                discount_value: 0,
                is_available: true,
                is_featured: false,
                sort_order: 0,
            })
            .await
            .unwrap();
        let vat = db
            .charges()
            .insert(&ChargeInput {
                name: "VAT".into(),
                charge_type: AdjustmentKind::Percentage,
                value: 1000,
                is_active: true,
            })
            .await
            .unwrap();
        db.menu_items()
            .set_relation(&item.id, Relation::Charges, &[vat.id])
            .await
            .unwrap();
        item.id
    }

    fn order_body(item_id: &str, quantity: i64) -> Value {
        json!({
            "customer_name": "Grace",
            "items": [{ "menu_item_id": item_id, "quantity": quantity }],
        })
    }

    #[tokio::test]
    async fn test_quote_does_not_persist() {
        let app = TestApp::new().await;
        let item = seed_item(&app).await;

        let (status, body) = app
            .json(
                Method::POST,
                "/api/orders/quote",
                None,
                json!({ "items": [{ "menu_item_id": item, "quantity": 2 }] }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["subtotal_cents"], 2000);
        assert_eq!(body["charges_cents"], 200);
        assert_eq!(body["total_cents"], 2200);

        let staff = app.token(UserRole::Staff).await;
        let (_, list) = app.get("/api/admin/orders", Some(&staff)).await;
        assert_eq!(list["meta"]["total"], 0);
    }

    #[tokio::test]
    async fn test_sequential_order_numbers() {
        let app = TestApp::new().await;
        let item = seed_item(&app).await;

        let (status, first) = app.json(Method::POST, "/api/orders", None, order_body(&item, 1)).await;
        assert_eq!(status, StatusCode::CREATED, "{}", first);
        let (_, second) = app.json(Method::POST, "/api/orders", None, order_body(&item, 1)).await;

        let number = |v: &Value| v["order"]["order_number"].as_str().unwrap().to_string();
        let seq = |n: &str| n.rsplit('-').next().unwrap().parse::<u32>().unwrap();
        let (a, b) = (number(&first), number(&second));

        assert!(a.starts_with("ORD-") && a.len() >= "ORD-YYMMDD-1".len());
        assert_eq!(seq(&b), seq(&a) + 1);
        assert_eq!(first["order"]["status"], "pending");
        assert_eq!(first["order"]["total_cents"], 1100);
        // Order fields stay nested next to items and charges
        assert!(first.get("order_number").is_none());
        assert_eq!(first["items"].as_array().map(Vec::len), Some(1));

        let staff = app.token(UserRole::Staff).await;
        let id = first["order"]["id"].as_str().unwrap();
        let (status, shown) = app.get(&format!("/api/admin/orders/{}", id), Some(&staff)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(shown["order"]["order_number"], a.as_str());
        assert!(shown["charges"].is_array());
    }

    #[tokio::test]
    async fn test_place_order_validation() {
        let app = TestApp::new().await;
        let item = seed_item(&app).await;

        let mut body = order_body(&item, 1);
        body["order_type"] = json!("delivery");
        body["customer_name"] = json!("");
        let (status, resp) = app.json(Method::POST, "/api/orders", None, body).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(resp["errors"]["customer_name"].is_array());
        assert!(resp["errors"]["delivery_address"].is_array());

        let (status, resp) = app
            .json(
                Method::POST,
                "/api/orders",
                None,
                order_body("00000000-0000-4000-8000-000000000000", 1),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", resp);

        let mut body = order_body(&item, 1);
        body["payment_method"] = json!("bitcoin");
        let (status, resp) = app.json(Method::POST, "/api/orders", None, body).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(resp["code"], "payment_method_unavailable");
    }

    #[tokio::test]
    async fn test_delivery_fee_only_for_delivery() {
        let app = TestApp::new().await;
        let item = seed_item(&app).await;
        app.db().settings().set(SETTING_DELIVERY_CHARGE, "300").await.unwrap();

        let mut body = order_body(&item, 1);
        body["order_type"] = json!("delivery");
        body["delivery_address"] = json!("1 Main St");
        let (_, delivery) = app.json(Method::POST, "/api/orders", None, body).await;
        assert_eq!(delivery["order"]["delivery_charge_cents"], 300);
        assert_eq!(delivery["order"]["total_cents"], 1400);

        let (_, pickup) = app.json(Method::POST, "/api/orders", None, order_body(&item, 1)).await;
        assert_eq!(pickup["order"]["delivery_charge_cents"], 0);
    }

    #[tokio::test]
    async fn test_coupon_usage_limit() {
        let app = TestApp::new().await;
        let item = seed_item(&app).await;
        app.db()
            .coupons()
            .insert(&CouponInput {
                code: "ONCE".into(),
                discount_type: AdjustmentKind::Fixed,
                discount_value: 100,
                min_order_cents: 0,
                max_discount_cents: None,
                usage_limit: Some(1),
                starts_at: None,
                expires_at: None,
                is_active: true,
            })
            .await
            .unwrap();

        let mut body = order_body(&item, 1);
        body["coupon_code"] = json!("once");
        let (status, first) = app.json(Method::POST, "/api/orders", None, body.clone()).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(first["order"]["coupon_discount_cents"], 100);
        assert_eq!(first["order"]["total_cents"], 1000);

        let (status, second) = app.json(Method::POST, "/api/orders", None, body).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(second["code"], "coupon_rejected");

        let coupon = app.db().coupons().find_by_code("ONCE").await.unwrap().unwrap();
        assert_eq!(coupon.used_count, 1);
    }

    #[tokio::test]
    async fn test_status_transitions() {
        let app = TestApp::new().await;
        let item = seed_item(&app).await;
        let staff = app.token(UserRole::Staff).await;
        let (_, placed) = app.json(Method::POST, "/api/orders", None, order_body(&item, 1)).await;
        let uri = format!("/api/admin/orders/{}/status", placed["order"]["id"].as_str().unwrap());

        let (status, body) = app
            .json(Method::PATCH, &uri, Some(&staff), json!({ "status": "completed" }))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "conflict");

        for next in ["processing", "ready", "completed"] {
            let (status, body) = app.json(Method::PATCH, &uri, Some(&staff), json!({ "status": next })).await;
            assert_eq!(status, StatusCode::OK, "{} -> {}", next, body);
            assert_eq!(body["status"], next);
        }

        let (status, _) = app
            .json(Method::PATCH, &uri, Some(&staff), json!({ "status": "canceled" }))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, list) = app.get("/api/admin/orders?status=completed", Some(&staff)).await;
        assert_eq!(list["meta"]["total"], 1);
    }

    #[tokio::test]
    async fn test_checkout_amount() {
        let app = TestApp::new().await;
        let item = seed_item(&app).await;
        app.db().settings().set(SETTING_CURRENCY, "jpy").await.unwrap();

        let (_, placed) = app.json(Method::POST, "/api/orders", None, order_body(&item, 1)).await;
        let id = placed["order"]["id"].as_str().unwrap();

        let (status, body) = app.get(&format!("/api/orders/{}/checkout", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["currency"], "JPY");
        // 11.00 in a zero-decimal currency
        assert_eq!(body["amount"], 11);
        assert_eq!(body["display_amount"], 11.0);
    }
}
