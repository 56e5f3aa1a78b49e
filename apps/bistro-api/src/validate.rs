//! Request body validation.
//!
//! Repositories trust their inputs; every admin write runs through
//! [`Validate`] first so a bad body becomes one 422 with all field errors.

use chrono::Utc;

use bistro_core::validation::{
    validate_adjustment, validate_coupon_code, validate_email, validate_name, validate_optional_text,
    validate_party_size, validate_price_cents, validate_uuid,
};
use bistro_core::{ValidationError, ValidationErrors};
use bistro_db::{
    AddonInput, CategoryInput, ChargeInput, CouponInput, MenuItemInput, ReservationInput, VariantInput,
};

pub const NAME_MAX: usize = 200;
pub const DESCRIPTION_MAX: usize = 2000;
pub const NOTES_MAX: usize = 1000;
pub const PHONE_MAX: usize = 30;

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

impl Validate for CategoryInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(validate_name("name", &self.name, NAME_MAX));
        errors.check(validate_optional_text("description", self.description.as_deref(), DESCRIPTION_MAX));
        errors.into_result()
    }
}

impl Validate for MenuItemInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(category_id) = &self.category_id {
            errors.check(validate_uuid("category_id", category_id));
        }
        errors.check(validate_name("name", &self.name, NAME_MAX));
        errors.check(validate_optional_text("description", self.description.as_deref(), DESCRIPTION_MAX));
        errors.check(validate_price_cents("price_cents", self.price_cents));
        match self.discount_type {
            Some(kind) => errors.check(validate_adjustment("discount_value", kind, self.discount_value)),
            None if self.discount_value != 0 => errors.push(ValidationError::Required {
                field: "discount_type".to_string(),
            }),
            None => {}
        }
        errors.into_result()
    }
}

impl Validate for AddonInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(validate_name("name", &self.name, NAME_MAX));
        errors.check(validate_price_cents("price_cents", self.price_cents));
        errors.into_result()
    }
}

impl Validate for ChargeInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(validate_name("name", &self.name, NAME_MAX));
        errors.check(validate_adjustment("value", self.charge_type, self.value));
        errors.into_result()
    }
}

impl Validate for VariantInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(validate_name("name", &self.name, NAME_MAX));
        for (i, option) in self.options.iter().enumerate() {
            let prefix = format!("options.{}", i);
            errors.check(validate_name("name", &option.name, NAME_MAX).map_err(|e| e.with_prefix(&prefix)));
            errors.check(validate_price_cents("price_cents", option.price_cents).map_err(|e| e.with_prefix(&prefix)));
        }
        errors.into_result()
    }
}

impl Validate for CouponInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(validate_coupon_code(&self.code));
        errors.check(validate_adjustment("discount_value", self.discount_type, self.discount_value));
        errors.check(validate_price_cents("min_order_cents", self.min_order_cents));
        if let Some(max) = self.max_discount_cents {
            errors.check(validate_price_cents("max_discount_cents", max));
        }
        if matches!(self.usage_limit, Some(limit) if limit <= 0) {
            errors.push(ValidationError::MustBePositive {
                field: "usage_limit".to_string(),
            });
        }
        if let (Some(start), Some(end)) = (self.starts_at, self.expires_at) {
            if end <= start {
                errors.push(ValidationError::InvalidFormat {
                    field: "expires_at".to_string(),
                    reason: "must be after starts_at".to_string(),
                });
            }
        }
        errors.into_result()
    }
}

impl Validate for ReservationInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(validate_name("customer_name", &self.customer_name, NAME_MAX));
        errors.check(validate_name("customer_phone", &self.customer_phone, PHONE_MAX));
        if let Some(email) = &self.customer_email {
            errors.check(validate_email("customer_email", email));
        }
        errors.check(validate_party_size(self.party_size));
        errors.check(validate_optional_text("notes", self.notes.as_deref(), NOTES_MAX));
        if self.reserved_for <= Utc::now() {
            errors.push(ValidationError::InvalidFormat {
                field: "reserved_for".to_string(),
                reason: "must be in the future".to_string(),
            });
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bistro_core::AdjustmentKind;
    use chrono::Duration;

    #[test]
    fn test_charge_percentage_out_of_range() {
        let input = ChargeInput {
            name: "VAT".into(),
            charge_type: AdjustmentKind::Percentage,
            value: 12_000,
            is_active: true,
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.by_field().contains_key("value"));
    }

    #[test]
    fn test_menu_item_collects_all_errors() {
        let input = MenuItemInput {
            category_id: Some("not-a-uuid".into()),
            name: " ".into(),
            description: None,
            price_cents: -1,
            discount_type: None,
            discount_value: 100,
            is_available: true,
            is_featured: false,
            sort_order: 0,
        };
        let fields = input.validate().unwrap_err().by_field();
        for field in ["category_id", "name", "price_cents", "discount_type"] {
            assert!(fields.contains_key(field), "missing {}", field);
        }
    }

    #[test]
    fn test_variant_option_errors_are_prefixed() {
        let input = VariantInput {
            name: "Size".into(),
            options: vec![
                bistro_db::VariantOptionInput {
                    name: "Small".into(),
                    price_cents: 0,
                },
                bistro_db::VariantOptionInput {
                    name: "".into(),
                    price_cents: 0,
                },
            ],
        };
        let fields = input.validate().unwrap_err().by_field();
        assert!(fields.contains_key("options.1.name"));
    }

    #[test]
    fn test_coupon_window() {
        let now = Utc::now();
        let input = CouponInput {
            code: "SPRING".into(),
            discount_type: AdjustmentKind::Fixed,
            discount_value: 500,
            min_order_cents: 0,
            max_discount_cents: None,
            usage_limit: Some(0),
            starts_at: Some(now),
            expires_at: Some(now - Duration::days(1)),
            is_active: true,
        };
        let fields = input.validate().unwrap_err().by_field();
        assert!(fields.contains_key("usage_limit"));
        assert!(fields.contains_key("expires_at"));
    }

    #[test]
    fn test_reservation_in_past() {
        let input = ReservationInput {
            customer_name: "Grace".into(),
            customer_phone: "555-0101".into(),
            customer_email: None,
            party_size: 4,
            reserved_for: Utc::now() - Duration::hours(1),
            notes: None,
        };
        let fields = input.validate().unwrap_err().by_field();
        assert_eq!(fields.len(), 1);
        assert!(fields.contains_key("reserved_for"));
    }
}
