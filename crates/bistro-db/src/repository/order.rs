//! # Order Repository
//!
//! Order placement, status changes and payment state.
//!
//! ## Placement Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │   1. order_sequences: upsert today's row, RETURNING last_value          │
//! │      └─► ORD-YYMMDD-N                                                   │
//! │   2. coupons: used_count + 1 (only while under usage_limit)             │
//! │   3. orders: header with frozen totals                                  │
//! │   4. order_items: one row per priced line (JSON snapshots)              │
//! │   5. order_charges: one row per distinct charge                         │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Any failure rolls everything back, the sequence increment included.
//!
//! ## Payment Idempotency
//! Gateways retry webhooks. [`OrderRepository::mark_paid`] only flips rows
//! that are not yet paid, so a repeated event reports
//! [`PaymentUpdate::AlreadyPaid`] instead of writing twice.

use chrono::Utc;
use sqlx::types::Json;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{coupon, Page, PageRequest};
use crate::error::{DbError, DbResult};
use bistro_core::pricing::OrderTotals;
use bistro_core::{
    CoreError, CouponRejection, Order, OrderCharge, OrderDetail, OrderItem, OrderNumber,
    OrderStatus, OrderType, PaymentStatus,
};

/// Customer-supplied fields of a new order. Totals come from pricing.
#[derive(Debug, Clone, Default)]
pub struct NewOrder {
    pub order_type: Option<OrderType>,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub delivery_address: Option<String>,
    pub table_number: Option<String>,
    pub notes: Option<String>,
    pub payment_method: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub order_type: Option<OrderType>,
    pub payment_status: Option<PaymentStatus>,
}

/// Outcome of recording a successful payment.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentUpdate {
    Updated(Order),
    /// The order was already paid; nothing was written.
    AlreadyPaid(Order),
}

impl PaymentUpdate {
    pub fn order(&self) -> &Order {
        match self {
            PaymentUpdate::Updated(order) | PaymentUpdate::AlreadyPaid(order) => order,
        }
    }
}

const COLUMNS: &str = "id, order_number, order_type, status, payment_status, payment_method, payment_info, \
                       customer_name, customer_phone, customer_email, delivery_address, table_number, notes, \
                       coupon_id, coupon_code, subtotal_cents, discount_cents, charges_cents, \
                       coupon_discount_cents, delivery_charge_cents, total_cents, user_id, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, order_id, menu_item_id, name, unit_price_cents, variant_amount_cents, \
                            discount_cents, addons_amount_cents, charges_cents, quantity, subtotal_cents, \
                            total_cents, variant_options, addons, charges";

const FILTER: &str = "(?1 IS NULL OR status = ?1)
     AND (?2 IS NULL OR order_type = ?2)
     AND (?3 IS NULL OR payment_status = ?3)";

#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Persists a priced order in one transaction.
    ///
    /// ## Errors
    /// - `DbError::Rule(CouponRejected { UsageLimitReached })` when another
    ///   checkout consumed the coupon's last use first
    /// - `DbError::ForeignKeyViolation` for an unknown payment method
    pub async fn create(
        &self,
        new: &NewOrder,
        totals: &OrderTotals,
        coupon_id: Option<&str>,
    ) -> DbResult<OrderDetail> {
        let order_type = new.order_type.unwrap_or(OrderType::DineIn);
        let now = Utc::now();
        let today = now.date_naive();

        let mut tx = self.pool.begin().await?;

        // Atomic per-day counter
        let sequence: i64 = sqlx::query_scalar(
            "INSERT INTO order_sequences (day, last_value) VALUES (?1, 1)
             ON CONFLICT(day) DO UPDATE SET last_value = last_value + 1
             RETURNING last_value",
        )
        .bind(OrderNumber::day_key(today))
        .fetch_one(&mut *tx)
        .await?;

        let sequence = u32::try_from(sequence)
            .map_err(|_| DbError::Internal(format!("order sequence out of range: {}", sequence)))?;
        let order_number = OrderNumber::new(today, sequence).map_err(CoreError::from)?;

        if let Some(coupon_id) = coupon_id {
            if !coupon::redeem(&mut tx, coupon_id).await? {
                warn!(coupon_id = %coupon_id, "Coupon exhausted during checkout");
                return Err(CoreError::CouponRejected {
                    code: totals.coupon_code.clone().unwrap_or_default(),
                    reason: CouponRejection::UsageLimitReached,
                }
                .into());
            }
        }

        let order = Order {
            id: Uuid::new_v4().to_string(),
            order_number: order_number.to_string(),
            order_type,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            payment_method: new.payment_method.clone(),
            payment_info: serde_json::Value::Null,
            customer_name: new.customer_name.trim().to_string(),
            customer_phone: new.customer_phone.clone(),
            customer_email: new.customer_email.clone(),
            delivery_address: new.delivery_address.clone(),
            table_number: new.table_number.clone(),
            notes: new.notes.clone(),
            coupon_id: coupon_id.map(str::to_string),
            coupon_code: totals.coupon_code.clone(),
            subtotal_cents: totals.subtotal_cents,
            discount_cents: totals.discount_cents,
            charges_cents: totals.charges_cents,
            coupon_discount_cents: totals.coupon_discount_cents,
            delivery_charge_cents: totals.delivery_charge_cents,
            total_cents: totals.total_cents,
            user_id: new.user_id.clone(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(&format!(
            "INSERT INTO orders ({COLUMNS}) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24)"
        ))
        .bind(&order.id)
        .bind(&order.order_number)
        .bind(order.order_type)
        .bind(order.status)
        .bind(order.payment_status)
        .bind(&order.payment_method)
        .bind(Json(&order.payment_info))
        .bind(&order.customer_name)
        .bind(&order.customer_phone)
        .bind(&order.customer_email)
        .bind(&order.delivery_address)
        .bind(&order.table_number)
        .bind(&order.notes)
        .bind(&order.coupon_id)
        .bind(&order.coupon_code)
        .bind(order.subtotal_cents)
        .bind(order.discount_cents)
        .bind(order.charges_cents)
        .bind(order.coupon_discount_cents)
        .bind(order.delivery_charge_cents)
        .bind(order.total_cents)
        .bind(&order.user_id)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(totals.lines.len());
        for (position, line) in totals.lines.iter().enumerate() {
            let item = OrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: order.id.clone(),
                menu_item_id: Some(line.menu_item_id.clone()),
                name: line.name.clone(),
                unit_price_cents: line.unit_price_cents,
                variant_amount_cents: line.variant_amount_cents,
                discount_cents: line.discount_cents,
                addons_amount_cents: line.addons_amount_cents,
                charges_cents: line.charges_cents,
                quantity: line.quantity,
                subtotal_cents: line.subtotal_cents,
                total_cents: line.total_cents,
                variant_options: line.variant_options.clone(),
                addons: line.addons.clone(),
                charges: line.charges.clone(),
            };

            sqlx::query(&format!(
                "INSERT INTO order_items ({ITEM_COLUMNS}, position)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
            ))
            .bind(&item.id)
            .bind(&item.order_id)
            .bind(&item.menu_item_id)
            .bind(&item.name)
            .bind(item.unit_price_cents)
            .bind(item.variant_amount_cents)
            .bind(item.discount_cents)
            .bind(item.addons_amount_cents)
            .bind(item.charges_cents)
            .bind(item.quantity)
            .bind(item.subtotal_cents)
            .bind(item.total_cents)
            .bind(Json(&item.variant_options))
            .bind(Json(&item.addons))
            .bind(Json(&item.charges))
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;

            items.push(item);
        }

        let mut charges = Vec::with_capacity(totals.charges.len());
        for (position, applied) in totals.charges.iter().enumerate() {
            let charge = OrderCharge {
                id: Uuid::new_v4().to_string(),
                order_id: order.id.clone(),
                charge_id: Some(applied.charge_id.clone()),
                name: applied.name.clone(),
                charge_type: applied.charge_type,
                rate: applied.value,
                amount_cents: applied.amount_cents,
            };

            sqlx::query(
                "INSERT INTO order_charges (id, order_id, charge_id, position, name, charge_type, rate, amount_cents)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )
            .bind(&charge.id)
            .bind(&charge.order_id)
            .bind(&charge.charge_id)
            .bind(position as i64)
            .bind(&charge.name)
            .bind(charge.charge_type)
            .bind(charge.rate)
            .bind(charge.amount_cents)
            .execute(&mut *tx)
            .await?;

            charges.push(charge);
        }

        tx.commit().await?;

        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            total_cents = order.total_cents,
            items = items.len(),
            "Order placed"
        );

        Ok(OrderDetail { order, items, charges })
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as(&format!("SELECT {COLUMNS} FROM orders WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    pub async fn get_by_number(&self, order_number: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as(&format!("SELECT {COLUMNS} FROM orders WHERE order_number = ?1"))
            .bind(order_number)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    pub async fn get_detail(&self, id: &str) -> DbResult<Option<OrderDetail>> {
        let Some(order) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let items: Vec<OrderItem> = sqlx::query_as(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ?1 ORDER BY position"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let charges: Vec<OrderCharge> = sqlx::query_as(
            "SELECT id, order_id, charge_id, name, charge_type, rate, amount_cents
             FROM order_charges WHERE order_id = ?1 ORDER BY position",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(OrderDetail { order, items, charges }))
    }

    /// Newest first.
    pub async fn list(&self, filter: &OrderFilter, page: PageRequest) -> DbResult<Page<Order>> {
        let items: Vec<Order> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM orders WHERE {FILTER}
             ORDER BY created_at DESC, order_number DESC LIMIT ?4 OFFSET ?5"
        ))
        .bind(filter.status)
        .bind(filter.order_type)
        .bind(filter.payment_status)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM orders WHERE {FILTER}"))
            .bind(filter.status)
            .bind(filter.order_type)
            .bind(filter.payment_status)
            .fetch_one(&self.pool)
            .await?;

        Ok(Page {
            items,
            total,
            request: page,
        })
    }

    /// Moves an order to `next` if the lifecycle allows it.
    ///
    /// The `UPDATE` is guarded by the status that was read, so two staff
    /// members racing on the same order cannot both win.
    pub async fn update_status(&self, id: &str, next: OrderStatus) -> DbResult<Order> {
        let order = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))?;

        let next = order.status.transition(next, order.order_type)?;

        let result = sqlx::query(
            "UPDATE orders SET status = ?2, updated_at = ?3 WHERE id = ?1 AND status = ?4",
        )
        .bind(id)
        .bind(next)
        .bind(Utc::now())
        .bind(order.status)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Someone else changed it in between
            let current = self
                .get_by_id(id)
                .await?
                .ok_or_else(|| DbError::not_found("Order", id))?;
            return Err(CoreError::InvalidStatusTransition {
                from: current.status.to_string(),
                to: next.to_string(),
            }
            .into());
        }

        info!(order_id = %id, from = %order.status, to = %next, "Order status changed");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))
    }

    /// Records a successful payment. Safe to call repeatedly.
    pub async fn mark_paid(&self, id: &str, payment_info: &serde_json::Value) -> DbResult<PaymentUpdate> {
        let result = sqlx::query(
            "UPDATE orders SET payment_status = 'paid', payment_info = ?2, updated_at = ?3
             WHERE id = ?1 AND payment_status <> 'paid'",
        )
        .bind(id)
        .bind(Json(payment_info))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let order = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))?;

        if result.rows_affected() == 0 {
            debug!(order_id = %id, "Duplicate payment event ignored");
            return Ok(PaymentUpdate::AlreadyPaid(order));
        }

        info!(order_id = %id, order_number = %order.order_number, "Order paid");
        Ok(PaymentUpdate::Updated(order))
    }

    /// Records a failed payment attempt. A paid order stays paid.
    pub async fn mark_failed(&self, id: &str, payment_info: &serde_json::Value) -> DbResult<Order> {
        let result = sqlx::query(
            "UPDATE orders SET payment_status = 'failed', payment_info = ?2, updated_at = ?3
             WHERE id = ?1 AND payment_status <> 'paid'",
        )
        .bind(id)
        .bind(Json(payment_info))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let order = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))?;

        if result.rows_affected() == 0 {
            warn!(order_id = %id, "Payment failure reported for an order already paid");
        }
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use bistro_core::pricing::{price_order, LineInput, OrderPricingInput};
    use bistro_core::Money;

    use std::collections::HashSet;

    use crate::test_support::{coupon_input, menu_item_input, test_db};
    use crate::{Database, DbConfig};

    use super::*;

    async fn totals(db: &Database, price_cents: i64, quantity: i64) -> OrderTotals {
        let item = db
            .menu_items()
            .insert(&menu_item_input("Burger", price_cents))
            .await
            .unwrap();

        price_order(&OrderPricingInput {
            order_type: OrderType::Pickup,
            lines: vec![LineInput {
                item,
                quantity,
                options: vec![],
                addons: vec![],
                charges: vec![],
            }],
            coupon: None,
            delivery_charge: Money::zero(),
            now: Utc::now(),
        })
        .unwrap()
    }

    fn new_order() -> NewOrder {
        NewOrder {
            order_type: Some(OrderType::Pickup),
            customer_name: "Ada".into(),
            payment_method: Some("cash".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_read_back() {
        let db = test_db().await;
        let totals = totals(&db, 1250, 2).await;

        let placed = db.orders().create(&new_order(), &totals, None).await.unwrap();
        assert_eq!(placed.order.total_cents, 2500);
        assert_eq!(placed.order.status, OrderStatus::Pending);
        assert_eq!(placed.items.len(), 1);

        let loaded = db.orders().get_detail(&placed.order.id).await.unwrap().unwrap();
        assert_eq!(loaded.items[0].quantity, 2);
        assert_eq!(loaded.order.payment_info, serde_json::Value::Null);

        let by_number = db
            .orders()
            .get_by_number(&placed.order.order_number)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_number.id, placed.order.id);
    }

    #[tokio::test]
    async fn test_order_numbers_are_sequential() {
        let db = test_db().await;
        let totals = totals(&db, 500, 1).await;

        let first = db.orders().create(&new_order(), &totals, None).await.unwrap();
        let second = db.orders().create(&new_order(), &totals, None).await.unwrap();

        let first: OrderNumber = first.order.order_number.parse().unwrap();
        let second: OrderNumber = second.order.order_number.parse().unwrap();
        assert_eq!(first.date(), second.date());
        assert_eq!(second.sequence(), first.sequence() + 1);
    }

    #[tokio::test]
    async fn test_coupon_limit_never_exceeded() {
        let db = test_db().await;
        let totals = totals(&db, 500, 1).await;
        let mut input = coupon_input("LAST");
        input.usage_limit = Some(1);
        let coupon = db.coupons().insert(&input).await.unwrap();

        db.orders()
            .create(&new_order(), &totals, Some(&coupon.id))
            .await
            .unwrap();
        let second = db.orders().create(&new_order(), &totals, Some(&coupon.id)).await;
        assert!(matches!(
            second,
            Err(DbError::Rule(CoreError::CouponRejected {
                reason: CouponRejection::UsageLimitReached,
                ..
            }))
        ));

        // The failed checkout left nothing behind
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_checkouts_on_file_database() {
        let path = std::env::temp_dir().join(format!("bistro-orders-{}.db", Uuid::new_v4()));
        let db = Database::new(DbConfig::new(&path).max_connections(8)).await.unwrap();
        let totals = totals(&db, 500, 1).await;

        let handles: Vec<_> = (0..40)
            .map(|_| {
                let db = db.clone();
                let totals = totals.clone();
                tokio::spawn(async move { db.orders().create(&new_order(), &totals, None).await })
            })
            .collect();
        let mut numbers = HashSet::new();
        for handle in handles {
            let placed = handle.await.unwrap().unwrap();
            assert!(numbers.insert(placed.order.order_number));
        }
        assert_eq!(numbers.len(), 40);

        let mut input = coupon_input("ONCE");
        input.usage_limit = Some(1);
        let coupon = db.coupons().insert(&input).await.unwrap();
        let handles: Vec<_> = (0..10)
            .map(|_| {
                let db = db.clone();
                let totals = totals.clone();
                let coupon_id = coupon.id.clone();
                tokio::spawn(async move { db.orders().create(&new_order(), &totals, Some(&coupon_id)).await })
            })
            .collect();
        let mut redeemed = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => redeemed += 1,
                Err(DbError::Rule(CoreError::CouponRejected {
                    reason: CouponRejection::UsageLimitReached,
                    ..
                })) => {}
                Err(e) => panic!("unexpected error {:?}", e),
            }
        }
        assert_eq!(redeemed, 1);

        let coupon = db.coupons().get_by_id(&coupon.id).await.unwrap().unwrap();
        assert_eq!(coupon.used_count, 1);
        let with_coupon: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE coupon_id = ?1")
            .bind(&coupon.id)
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(with_coupon, 1);

        db.pool().close().await;
        drop(db);
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }

    #[tokio::test]
    async fn test_unknown_payment_method_rolls_back() {
        let db = test_db().await;
        let totals = totals(&db, 500, 1).await;
        let mut order = new_order();
        order.payment_method = Some("bitcoin".into());

        let result = db.orders().create(&order, &totals, None).await;
        assert!(matches!(result, Err(DbError::ForeignKeyViolation { .. })));

        let sequences: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_sequences")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(sequences, 0);
    }

    #[tokio::test]
    async fn test_status_transitions() {
        let db = test_db().await;
        let totals = totals(&db, 500, 1).await;
        let placed = db.orders().create(&new_order(), &totals, None).await.unwrap();
        let id = placed.order.id;

        let processing = db.orders().update_status(&id, OrderStatus::Processing).await.unwrap();
        assert_eq!(processing.status, OrderStatus::Processing);

        // Pickup orders never go out for delivery
        let invalid = db.orders().update_status(&id, OrderStatus::OnDelivery).await;
        assert!(matches!(
            invalid,
            Err(DbError::Rule(CoreError::InvalidStatusTransition { .. }))
        ));

        let missing = db.orders().update_status("nope", OrderStatus::Ready).await;
        assert!(matches!(missing, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_mark_paid_is_idempotent() {
        let db = test_db().await;
        let totals = totals(&db, 500, 1).await;
        let placed = db.orders().create(&new_order(), &totals, None).await.unwrap();
        let info = serde_json::json!({ "gateway": "stripe", "id": "evt_1" });

        let first = db.orders().mark_paid(&placed.order.id, &info).await.unwrap();
        assert!(matches!(first, PaymentUpdate::Updated(_)));
        assert_eq!(first.order().payment_status, PaymentStatus::Paid);
        assert_eq!(first.order().payment_info["id"], "evt_1");

        let retry = serde_json::json!({ "gateway": "stripe", "id": "evt_2" });
        let second = db.orders().mark_paid(&placed.order.id, &retry).await.unwrap();
        assert!(matches!(second, PaymentUpdate::AlreadyPaid(_)));
        assert_eq!(second.order().payment_info["id"], "evt_1");

        let failed = db.orders().mark_failed(&placed.order.id, &retry).await.unwrap();
        assert_eq!(failed.payment_status, PaymentStatus::Paid);

        assert!(matches!(
            db.orders().mark_paid("missing", &info).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let db = test_db().await;
        let totals = totals(&db, 500, 1).await;
        let a = db.orders().create(&new_order(), &totals, None).await.unwrap();
        db.orders().create(&new_order(), &totals, None).await.unwrap();
        db.orders()
            .update_status(&a.order.id, OrderStatus::Canceled)
            .await
            .unwrap();

        let filter = OrderFilter {
            status: Some(OrderStatus::Pending),
            ..Default::default()
        };
        let page = db.orders().list(&filter, PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 1);

        let all = db
            .orders()
            .list(&OrderFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(all.total, 2);
    }
}
