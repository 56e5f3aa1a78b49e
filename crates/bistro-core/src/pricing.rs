//! # Order Pricing
//!
//! Turns a cart into exact order totals. Everything here is integer cents;
//! rounding only happens inside percentage application (half up).
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CartLine (ids from client)                                             │
//! │       │  resolve_line(): options/addons must belong to the item         │
//! │       ▼                                                                 │
//! │  LineInput (catalog rows)                                               │
//! │       │  price_line()                                                   │
//! │       ▼                                                                 │
//! │  PricedLine                                                             │
//! │    variant_amount = Σ option prices                 (per unit)          │
//! │    discount       = item discount on base price     (per unit, capped)  │
//! │    unit_net       = base + variant_amount − discount                    │
//! │    addons_amount  = Σ addon prices × qty                                │
//! │    subtotal       = unit_net × qty + addons_amount                      │
//! │    charges        = Σ fixed × qty | rate × subtotal                     │
//! │    total          = subtotal + charges                                  │
//! │       │  price_order()                                                  │
//! │       ▼                                                                 │
//! │  OrderTotals                                                            │
//! │    grand_total = subtotal + charges − coupon + delivery                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::{Adjustment, AdjustmentKind, Money};
use crate::status::OrderType;
use crate::types::{Addon, Charge, Coupon, MenuItem, MenuItemDetail, VariantOption};
use crate::validation::validate_quantity;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Snapshots
// =============================================================================

/// A chosen variant option, frozen on the order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VariantSnapshot {
    pub variant_id: String,
    pub variant_name: String,
    pub option_id: String,
    pub option_name: String,
    pub price_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AddonSnapshot {
    pub addon_id: String,
    pub name: String,
    pub price_cents: i64,
}

/// A charge as applied to a line, or summed over an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChargeSnapshot {
    pub charge_id: String,
    pub name: String,
    pub charge_type: AdjustmentKind,
    /// Cents or bps.
    pub value: i64,
    pub amount_cents: i64,
}

// =============================================================================
// Inputs
// =============================================================================

/// A cart line as sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub menu_item_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub variant_option_ids: Vec<String>,
    #[serde(default)]
    pub addon_ids: Vec<String>,
}

/// A selected option together with the name of its variant.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedOption {
    pub variant_name: String,
    pub option: VariantOption,
}

/// A cart line resolved against the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct LineInput {
    pub item: MenuItem,
    pub quantity: i64,
    pub options: Vec<SelectedOption>,
    pub addons: Vec<Addon>,
    /// Active charges attached to the item.
    pub charges: Vec<Charge>,
}

/// Resolves the ids of a cart line against the item's catalog detail.
///
/// ## Rules
/// - Every option must belong to a variant attached to the item
/// - At most one option per variant
/// - Every addon must be attached to the item and active
/// - Inactive charges are dropped
pub fn resolve_line(detail: &MenuItemDetail, line: &CartLine) -> CoreResult<LineInput> {
    let invalid = |reason: String| CoreError::InvalidSelection {
        item: detail.item.name.clone(),
        reason,
    };

    let mut options = Vec::with_capacity(line.variant_option_ids.len());
    let mut seen_variants = HashSet::new();
    for option_id in &line.variant_option_ids {
        let found = detail.variants.iter().find_map(|v| {
            v.options
                .iter()
                .find(|o| &o.id == option_id)
                .map(|o| (v, o))
        });
        let Some((variant, option)) = found else {
            return Err(invalid(format!("option {} is not offered", option_id)));
        };
        if !seen_variants.insert(variant.variant.id.as_str()) {
            return Err(invalid(format!(
                "only one option may be chosen for {}",
                variant.variant.name
            )));
        }
        options.push(SelectedOption {
            variant_name: variant.variant.name.clone(),
            option: option.clone(),
        });
    }

    let mut addons = Vec::with_capacity(line.addon_ids.len());
    let mut seen_addons = HashSet::new();
    for addon_id in &line.addon_ids {
        let Some(addon) = detail.addons.iter().find(|a| &a.id == addon_id && a.is_active) else {
            return Err(invalid(format!("addon {} is not offered", addon_id)));
        };
        if !seen_addons.insert(addon.id.as_str()) {
            return Err(invalid(format!("addon {} selected twice", addon.name)));
        }
        addons.push(addon.clone());
    }

    Ok(LineInput {
        item: detail.item.clone(),
        quantity: line.quantity,
        options,
        addons,
        charges: detail.charges.iter().filter(|c| c.is_active).cloned().collect(),
    })
}

// =============================================================================
// Line Pricing
// =============================================================================

/// A fully priced cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricedLine {
    pub menu_item_id: String,
    pub name: String,
    pub quantity: i64,
    /// Base price of one unit.
    pub unit_price_cents: i64,
    pub variant_amount_cents: i64,
    /// Per unit.
    pub discount_cents: i64,
    pub addons_amount_cents: i64,
    pub subtotal_cents: i64,
    pub charges_cents: i64,
    pub total_cents: i64,
    pub variant_options: Vec<VariantSnapshot>,
    pub addons: Vec<AddonSnapshot>,
    pub charges: Vec<ChargeSnapshot>,
}

impl PricedLine {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// Prices one line.
///
/// ```rust
/// use bistro_core::pricing::{price_line, LineInput};
/// use bistro_core::types::MenuItem;
/// use chrono::Utc;
///
/// let item = MenuItem {
///     id: "m1".into(), category_id: None, name: "Soup".into(), description: None,
///     price_cents: 450, discount_type: None, discount_value: 0,
///     is_available: true, is_featured: false, sort_order: 0,
///     created_at: Utc::now(), updated_at: Utc::now(),
/// };
/// let line = LineInput { item, quantity: 2, options: vec![], addons: vec![], charges: vec![] };
/// assert_eq!(price_line(&line).unwrap().total_cents, 900);
/// ```
pub fn price_line(line: &LineInput) -> CoreResult<PricedLine> {
    let item = &line.item;

    if line.quantity > MAX_ITEM_QUANTITY {
        return Err(CoreError::QuantityTooLarge {
            requested: line.quantity,
            max: MAX_ITEM_QUANTITY,
        });
    }
    validate_quantity(line.quantity)?;

    if !item.is_available {
        return Err(CoreError::MenuItemUnavailable {
            name: item.name.clone(),
        });
    }

    let qty = line.quantity;
    let base = item.price();
    let variant_amount = Money::checked_sum(line.options.iter().map(|o| o.option.price())).ok_or(CoreError::AmountOverflow)?;
    let discount = item.unit_discount();
    let unit_net = base
        .checked_add(variant_amount)
        .and_then(|m| m.checked_sub(discount))
        .ok_or(CoreError::AmountOverflow)?;
    let addons_amount = Money::checked_sum(line.addons.iter().map(|a| a.price()))
        .and_then(|m| m.checked_mul(qty))
        .ok_or(CoreError::AmountOverflow)?;
    let subtotal = unit_net
        .checked_mul(qty)
        .and_then(|m| m.checked_add(addons_amount))
        .ok_or(CoreError::AmountOverflow)?;

    let charges = line
        .charges
        .iter()
        .map(|charge| {
            let adjustment = charge.adjustment();
            let amount = match adjustment {
                Adjustment::Fixed(m) => m.checked_mul(qty).ok_or(CoreError::AmountOverflow)?,
                Adjustment::Percentage(r) => subtotal.percentage(r),
            };
            Ok(ChargeSnapshot {
                charge_id: charge.id.clone(),
                name: charge.name.clone(),
                charge_type: adjustment.kind(),
                value: adjustment.value(),
                amount_cents: amount.cents(),
            })
        })
        .collect::<CoreResult<Vec<_>>>()?;
    let charges_total =
        Money::checked_sum(charges.iter().map(|c| Money::from_cents(c.amount_cents))).ok_or(CoreError::AmountOverflow)?;
    let total = subtotal.checked_add(charges_total).ok_or(CoreError::AmountOverflow)?;

    Ok(PricedLine {
        menu_item_id: item.id.clone(),
        name: item.name.clone(),
        quantity: qty,
        unit_price_cents: base.cents(),
        variant_amount_cents: variant_amount.cents(),
        discount_cents: discount.cents(),
        addons_amount_cents: addons_amount.cents(),
        subtotal_cents: subtotal.cents(),
        charges_cents: charges_total.cents(),
        total_cents: total.cents(),
        variant_options: line
            .options
            .iter()
            .map(|o| VariantSnapshot {
                variant_id: o.option.variant_id.clone(),
                variant_name: o.variant_name.clone(),
                option_id: o.option.id.clone(),
                option_name: o.option.name.clone(),
                price_cents: o.option.price_cents,
            })
            .collect(),
        addons: line
            .addons
            .iter()
            .map(|a| AddonSnapshot {
                addon_id: a.id.clone(),
                name: a.name.clone(),
                price_cents: a.price_cents,
            })
            .collect(),
        charges,
    })
}

// =============================================================================
// Order Pricing
// =============================================================================

pub struct OrderPricingInput {
    pub order_type: OrderType,
    pub lines: Vec<LineInput>,
    pub coupon: Option<Coupon>,
    /// Configured delivery fee; only applied to delivery orders.
    pub delivery_charge: Money,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderTotals {
    pub lines: Vec<PricedLine>,
    /// Line charges grouped per charge, in first-seen order.
    pub charges: Vec<ChargeSnapshot>,
    pub coupon_code: Option<String>,
    pub subtotal_cents: i64,
    /// Σ per-unit item discount × quantity.
    pub discount_cents: i64,
    pub charges_cents: i64,
    pub coupon_discount_cents: i64,
    pub delivery_charge_cents: i64,
    pub total_cents: i64,
}

impl OrderTotals {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// Prices a whole cart.
pub fn price_order(input: &OrderPricingInput) -> CoreResult<OrderTotals> {
    if input.lines.is_empty() {
        return Err(CoreError::EmptyCart);
    }
    if input.lines.len() > MAX_CART_ITEMS {
        return Err(CoreError::CartTooLarge { max: MAX_CART_ITEMS });
    }

    let lines = input
        .lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            price_line(line).map_err(|e| match e {
                CoreError::Validation(v) => CoreError::Validation(v.with_prefix(&format!("items.{}", i))),
                other => other,
            })
        })
        .collect::<CoreResult<Vec<_>>>()?;

    let subtotal = Money::checked_sum(lines.iter().map(PricedLine::subtotal)).ok_or(CoreError::AmountOverflow)?;
    let discount = lines
        .iter()
        .map(|l| Money::from_cents(l.discount_cents).checked_mul(l.quantity))
        .try_fold(Money::zero(), |acc, m| acc.checked_add(m?))
        .ok_or(CoreError::AmountOverflow)?;

    let mut charges: Vec<ChargeSnapshot> = Vec::new();
    for applied in lines.iter().flat_map(|l| l.charges.iter()) {
        match charges.iter_mut().find(|c| c.charge_id == applied.charge_id) {
            Some(existing) => {
                existing.amount_cents = existing
                    .amount_cents
                    .checked_add(applied.amount_cents)
                    .ok_or(CoreError::AmountOverflow)?;
            }
            None => charges.push(applied.clone()),
        }
    }
    let charges_total =
        Money::checked_sum(charges.iter().map(|c| Money::from_cents(c.amount_cents))).ok_or(CoreError::AmountOverflow)?;

    let coupon_discount = match &input.coupon {
        Some(coupon) => coupon
            .discount_for(subtotal, input.now)
            .map_err(|reason| CoreError::CouponRejected {
                code: coupon.code.clone(),
                reason,
            })?,
        None => Money::zero(),
    };

    let delivery_charge = if input.order_type == OrderType::Delivery {
        input.delivery_charge.non_negative()
    } else {
        Money::zero()
    };

    let total = subtotal
        .checked_add(charges_total)
        .and_then(|m| m.checked_sub(coupon_discount))
        .and_then(|m| m.checked_add(delivery_charge))
        .ok_or(CoreError::AmountOverflow)?
        .non_negative();

    Ok(OrderTotals {
        lines,
        charges,
        coupon_code: input.coupon.as_ref().map(|c| c.code.clone()),
        subtotal_cents: subtotal.cents(),
        discount_cents: discount.cents(),
        charges_cents: charges_total.cents(),
        coupon_discount_cents: coupon_discount.cents(),
        delivery_charge_cents: delivery_charge.cents(),
        total_cents: total.cents(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CouponRejection;
    use crate::types::{Variant, VariantWithOptions};
    use crate::MAX_PRICE_CENTS;

    fn item(price_cents: i64) -> MenuItem {
        let now = Utc::now();
        MenuItem {
            id: "pizza".into(),
            category_id: None,
            name: "Pizza".into(),
            description: None,
            price_cents,
            discount_type: None,
            discount_value: 0,
            is_available: true,
            is_featured: false,
            sort_order: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn addon(id: &str, price_cents: i64) -> Addon {
        let now = Utc::now();
        Addon {
            id: id.into(),
            name: id.into(),
            price_cents,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn charge(id: &str, kind: AdjustmentKind, value: i64) -> Charge {
        let now = Utc::now();
        Charge {
            id: id.into(),
            name: id.into(),
            charge_type: kind,
            value,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn option(id: &str, variant_id: &str, price_cents: i64) -> VariantOption {
        VariantOption {
            id: id.into(),
            variant_id: variant_id.into(),
            name: id.into(),
            price_cents,
            sort_order: 0,
        }
    }

    fn detail() -> MenuItemDetail {
        let now = Utc::now();
        MenuItemDetail {
            item: item(1000),
            addons: vec![addon("cheese", 150), addon("olives", 100)],
            charges: vec![charge("vat", AdjustmentKind::Percentage, 1000)],
            variants: vec![VariantWithOptions {
                variant: Variant {
                    id: "size".into(),
                    name: "Size".into(),
                    created_at: now,
                    updated_at: now,
                },
                options: vec![option("small", "size", 0), option("large", "size", 300)],
            }],
        }
    }

    fn simple_line(price_cents: i64, quantity: i64) -> LineInput {
        LineInput {
            item: item(price_cents),
            quantity,
            options: vec![],
            addons: vec![],
            charges: vec![],
        }
    }

    fn order_input(lines: Vec<LineInput>) -> OrderPricingInput {
        OrderPricingInput {
            order_type: OrderType::Pickup,
            lines,
            coupon: None,
            delivery_charge: Money::from_cents(500),
            now: Utc::now(),
        }
    }

    #[test]
    fn test_full_line_breakdown() {
        let line = resolve_line(
            &detail(),
            &CartLine {
                menu_item_id: "pizza".into(),
                quantity: 2,
                variant_option_ids: vec!["large".into()],
                addon_ids: vec!["cheese".into()],
            },
        )
        .unwrap();

        let priced = price_line(&line).unwrap();
        // unit_net = 10.00 + 3.00 = 13.00, × 2 = 26.00, addons 1.50 × 2 = 3.00
        assert_eq!(priced.variant_amount_cents, 300);
        assert_eq!(priced.addons_amount_cents, 300);
        assert_eq!(priced.subtotal_cents, 2900);
        // VAT 10% of 29.00
        assert_eq!(priced.charges_cents, 290);
        assert_eq!(priced.total_cents, 3190);
        assert_eq!(priced.variant_options[0].variant_name, "Size");
    }

    #[test]
    fn test_discount_is_taken_off_base_price() {
        let mut line = simple_line(1000, 3);
        line.item.discount_type = Some(AdjustmentKind::Percentage);
        line.item.discount_value = 2000;
        line.options.push(SelectedOption {
            variant_name: "Size".into(),
            option: option("large", "size", 500),
        });

        let priced = price_line(&line).unwrap();
        // 20% of 10.00 base, not of 15.00
        assert_eq!(priced.discount_cents, 200);
        assert_eq!(priced.subtotal_cents, (1000 + 500 - 200) * 3);
    }

    #[test]
    fn test_fixed_charge_scales_with_quantity() {
        let mut line = simple_line(500, 4);
        line.charges.push(charge("bag", AdjustmentKind::Fixed, 25));
        let priced = price_line(&line).unwrap();
        assert_eq!(priced.charges_cents, 100);
        assert_eq!(priced.total_cents, 2100);
    }

    #[test]
    fn test_percentage_charge_rounds_half_up() {
        let mut line = simple_line(1005, 1);
        line.charges.push(charge("tax", AdjustmentKind::Percentage, 500));
        // 5% of 10.05 = 0.5025 → 0.50
        assert_eq!(price_line(&line).unwrap().charges_cents, 50);

        let mut line = simple_line(1010, 1);
        line.charges.push(charge("tax", AdjustmentKind::Percentage, 500));
        // 5% of 10.10 = 0.505 → 0.51
        assert_eq!(price_line(&line).unwrap().charges_cents, 51);
    }

    #[test]
    fn test_resolve_rejects_foreign_and_duplicate_selections() {
        let d = detail();
        let mut cart = CartLine {
            menu_item_id: "pizza".into(),
            quantity: 1,
            variant_option_ids: vec!["medium".into()],
            addon_ids: vec![],
        };
        assert!(matches!(
            resolve_line(&d, &cart),
            Err(CoreError::InvalidSelection { .. })
        ));

        cart.variant_option_ids = vec!["small".into(), "large".into()];
        assert!(resolve_line(&d, &cart).is_err());

        cart.variant_option_ids = vec![];
        cart.addon_ids = vec!["bacon".into()];
        assert!(resolve_line(&d, &cart).is_err());

        cart.addon_ids = vec!["cheese".into(), "cheese".into()];
        assert!(resolve_line(&d, &cart).is_err());
    }

    #[test]
    fn test_resolve_drops_inactive_charges() {
        let mut d = detail();
        d.charges[0].is_active = false;
        let line = resolve_line(
            &d,
            &CartLine {
                menu_item_id: "pizza".into(),
                quantity: 1,
                variant_option_ids: vec![],
                addon_ids: vec![],
            },
        )
        .unwrap();
        assert!(line.charges.is_empty());
    }

    #[test]
    fn test_unavailable_item_rejected() {
        let mut line = simple_line(1000, 1);
        line.item.is_available = false;
        assert!(matches!(
            price_line(&line),
            Err(CoreError::MenuItemUnavailable { .. })
        ));
    }

    #[test]
    fn test_quantity_limits() {
        assert!(matches!(
            price_line(&simple_line(100, 1000)),
            Err(CoreError::QuantityTooLarge { .. })
        ));
        assert!(matches!(
            price_line(&simple_line(100, 0)),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_order_aggregation_groups_charges() {
        let mut a = simple_line(1000, 1);
        a.charges.push(charge("vat", AdjustmentKind::Percentage, 1000));
        let mut b = simple_line(2000, 1);
        b.charges.push(charge("vat", AdjustmentKind::Percentage, 1000));
        b.charges.push(charge("service", AdjustmentKind::Fixed, 50));

        let totals = price_order(&order_input(vec![a, b])).unwrap();
        assert_eq!(totals.subtotal_cents, 3000);
        assert_eq!(totals.charges.len(), 2);
        assert_eq!(totals.charges[0].amount_cents, 300);
        assert_eq!(totals.charges_cents, 350);
        assert_eq!(totals.total_cents, 3350);
    }

    #[test]
    fn test_delivery_charge_only_for_delivery() {
        let mut input = order_input(vec![simple_line(1000, 1)]);
        assert_eq!(price_order(&input).unwrap().delivery_charge_cents, 0);

        input.order_type = OrderType::Delivery;
        let totals = price_order(&input).unwrap();
        assert_eq!(totals.delivery_charge_cents, 500);
        assert_eq!(totals.total_cents, 1500);
    }

    #[test]
    fn test_coupon_applied_to_subtotal() {
        let now = Utc::now();
        let mut input = order_input(vec![simple_line(4000, 1)]);
        input.coupon = Some(Coupon {
            id: "c".into(),
            code: "TENOFF".into(),
            discount_type: AdjustmentKind::Percentage,
            discount_value: 1000,
            min_order_cents: 0,
            max_discount_cents: None,
            usage_limit: None,
            used_count: 0,
            starts_at: None,
            expires_at: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        });

        let totals = price_order(&input).unwrap();
        assert_eq!(totals.coupon_discount_cents, 400);
        assert_eq!(totals.total_cents, 3600);
        assert_eq!(totals.coupon_code.as_deref(), Some("TENOFF"));

        if let Some(c) = input.coupon.as_mut() {
            c.min_order_cents = 5000;
        }
        assert!(matches!(
            price_order(&input),
            Err(CoreError::CouponRejected {
                reason: CouponRejection::MinimumNotMet,
                ..
            })
        ));
    }

    #[test]
    fn test_empty_and_oversized_carts() {
        assert!(matches!(price_order(&order_input(vec![])), Err(CoreError::EmptyCart)));

        let lines = (0..=MAX_CART_ITEMS).map(|_| simple_line(100, 1)).collect();
        assert!(matches!(
            price_order(&order_input(lines)),
            Err(CoreError::CartTooLarge { .. })
        ));
    }

    #[test]
    fn test_huge_prices_report_overflow() {
        assert!(matches!(
            price_line(&simple_line(i64::MAX / 2, 3)),
            Err(CoreError::AmountOverflow)
        ));

        let mut line = simple_line(100, 2);
        line.addons.push(addon("gold", i64::MAX));
        assert!(matches!(price_line(&line), Err(CoreError::AmountOverflow)));

        let mut line = simple_line(100, 2);
        line.charges.push(charge("fee", AdjustmentKind::Fixed, i64::MAX / 2 + 1));
        assert!(matches!(price_line(&line), Err(CoreError::AmountOverflow)));

        let lines = vec![simple_line(i64::MAX / 2, 1), simple_line(i64::MAX / 2, 1), simple_line(100, 1)];
        assert!(matches!(price_order(&order_input(lines)), Err(CoreError::AmountOverflow)));
    }

    #[test]
    fn test_largest_catalog_price_prices_cleanly() {
        let mut line = simple_line(MAX_PRICE_CENTS, MAX_ITEM_QUANTITY);
        line.addons.push(addon("cheese", MAX_PRICE_CENTS));
        line.charges.push(charge("fee", AdjustmentKind::Fixed, MAX_PRICE_CENTS));
        let lines = (0..MAX_CART_ITEMS).map(|_| line.clone()).collect();

        let totals = price_order(&order_input(lines)).unwrap();
        assert_eq!(totals.total_cents, MAX_PRICE_CENTS * MAX_ITEM_QUANTITY * 3 * MAX_CART_ITEMS as i64);
    }

    #[test]
    fn test_line_validation_errors_are_prefixed() {
        let input = order_input(vec![simple_line(100, 1), simple_line(100, -2)]);
        match price_order(&input) {
            Err(CoreError::Validation(v)) => assert_eq!(v.field(), "items.1.quantity"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
