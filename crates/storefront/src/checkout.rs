//! Checkout: form validation, coupon handling and order submission.

use std::sync::{Mutex, PoisonError};

use classic_carry_core::{
    CartLineItem, CartTotals, Discount, Email, EmailError, OrderNumber, PaymentMethod, Price,
};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::api::{
    ApiClient, ApiError, OrderCustomer, OrderItem, OrderPricing, OrderRequest,
};
use crate::cart::CartStore;
use crate::storage::{KeyValueStore, LAST_ORDER_KEY, load_json, save_json};

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// A required form field is blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Email address is malformed.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Coupon code was blank.
    #[error("coupon code is empty")]
    EmptyCoupon,

    /// Coupon was accepted by the server but its value makes no sense.
    #[error("coupon has an invalid discount")]
    InvalidCoupon,

    /// The API refused or failed the request.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl CheckoutError {
    /// Message suitable for showing to the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyCart => "Your cart is empty".to_string(),
            Self::MissingField(field) => format!("Please enter your {field}"),
            Self::InvalidEmail(_) => "Please enter a valid email address".to_string(),
            Self::EmptyCoupon => "Please enter a coupon code".to_string(),
            Self::InvalidCoupon => "Invalid coupon code".to_string(),
            Self::Api(e) => e.user_message(),
        }
    }
}

// =============================================================================
// Form
// =============================================================================

/// Shipping details as typed by the shopper.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub delivery_notes: String,
    pub payment_method: PaymentMethod,
}

impl CheckoutForm {
    /// Check required fields in display order and normalise the result.
    ///
    /// # Errors
    ///
    /// Returns the first missing field, or `InvalidEmail`.
    pub fn validate(&self) -> Result<OrderCustomer, CheckoutError> {
        let required = [
            ("email", &self.email),
            ("first name", &self.first_name),
            ("last name", &self.last_name),
            ("phone number", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("province", &self.province),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(CheckoutError::MissingField(*field));
        }

        let email = Email::parse(&self.email)?;
        Ok(OrderCustomer {
            email: email.to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            province: self.province.trim().to_string(),
            postal_code: self.postal_code.trim().to_string(),
            delivery_notes: self.delivery_notes.trim().to_string(),
        })
    }
}

// =============================================================================
// Coupons
// =============================================================================

/// A coupon the server has accepted for this order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedCoupon {
    pub code: String,
    pub discount: Discount,
}

impl AppliedCoupon {
    /// Amount the coupon takes off `subtotal`.
    #[must_use]
    pub fn amount_off(&self, subtotal: Price) -> Price {
        self.discount.amount_off(subtotal)
    }
}

/// Validate a coupon code against the current subtotal.
///
/// # Errors
///
/// Returns `EmptyCoupon` for a blank code, `Api` if the server rejects it.
#[instrument(skip(api))]
pub async fn apply_coupon(
    api: &ApiClient,
    code: &str,
    subtotal: Price,
) -> Result<AppliedCoupon, CheckoutError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(CheckoutError::EmptyCoupon);
    }

    let validation = api.validate_coupon(code, subtotal).await?;
    let discount = validation.discount().map_err(|e| {
        warn!(error = %e, "Server accepted a coupon with a negative value");
        CheckoutError::InvalidCoupon
    })?;
    Ok(AppliedCoupon {
        code: validation.code.unwrap_or_else(|| code.to_uppercase()),
        discount,
    })
}

// =============================================================================
// Order assembly
// =============================================================================

/// Order pricing: `total = subtotal + delivery - discount`.
#[must_use]
pub fn order_pricing(totals: &CartTotals, coupon: Option<&AppliedCoupon>) -> OrderPricing {
    let discount = coupon.map_or(Price::ZERO, |c| c.amount_off(totals.subtotal));
    OrderPricing {
        subtotal: totals.subtotal,
        delivery_charge: totals.delivery_fee,
        discount,
        total: Price::new(
            totals.subtotal.amount() + totals.delivery_fee.amount() - discount.amount(),
        ),
    }
}

/// Build the order body from the form and a cart snapshot.
///
/// # Errors
///
/// Returns `EmptyCart`, or a form validation error.
pub fn build_order(
    form: &CheckoutForm,
    lines: &[CartLineItem],
    totals: &CartTotals,
    coupon: Option<&AppliedCoupon>,
) -> Result<OrderRequest, CheckoutError> {
    if lines.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let customer = form.validate()?;

    let items = lines
        .iter()
        .map(|line| OrderItem {
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            price: line.unit_price,
            quantity: line.quantity(),
            image: line.image.clone(),
            color: line.variant.selected_color().map(str::to_owned),
            size: line.variant.selected_size().map(str::to_owned),
        })
        .collect();

    Ok(OrderRequest {
        customer,
        items,
        pricing: order_pricing(totals, coupon),
        payment_method: form.payment_method,
        coupon_code: coupon.map(|c| c.code.clone()),
    })
}

/// Submit the cart as an order.
///
/// Once the API accepts the order the cart is cleared, and the order number,
/// when the response carries one, is recorded under `lastOrderNumber`. On
/// failure neither happens.
///
/// # Errors
///
/// Returns `EmptyCart`, a form validation error, or the API failure.
#[instrument(skip_all)]
pub async fn place_order(
    api: &ApiClient,
    cart: &Mutex<CartStore>,
    storage: &dyn KeyValueStore,
    form: &CheckoutForm,
    coupon: Option<&AppliedCoupon>,
) -> Result<Option<OrderNumber>, CheckoutError> {
    let request = {
        let cart = cart.lock().unwrap_or_else(PoisonError::into_inner);
        build_order(form, cart.items(), &cart.totals(), coupon)?
    };

    let order_number = match api.create_order(&request).await {
        Ok(number) => number,
        Err(e) => {
            error!(error = %e, "Order submission failed");
            return Err(e.into());
        }
    };

    if let Some(number) = &order_number {
        if let Err(e) = save_json(storage, LAST_ORDER_KEY, number) {
            warn!(error = %e, "Failed to record last order number");
        }
    }
    cart.lock().unwrap_or_else(PoisonError::into_inner).clear();

    info!(
        order_number = order_number.as_ref().map(OrderNumber::as_str),
        total = %request.pricing.total,
        "Order placed"
    );
    Ok(order_number)
}

/// The number of the most recent order placed from this device.
#[must_use]
pub fn last_order_number(storage: &dyn KeyValueStore) -> Option<OrderNumber> {
    load_json(storage, LAST_ORDER_KEY).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to read last order number");
        None
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use classic_carry_core::{
        DiscountType, PricingConfig, Product, ProductId, VariantSelection,
    };
    use rust_decimal::Decimal;

    use super::*;
    use crate::storage::MemoryStore;

    fn form() -> CheckoutForm {
        CheckoutForm {
            email: " ayesha@example.pk ".to_string(),
            first_name: "Ayesha".to_string(),
            last_name: "Khan".to_string(),
            phone: "03001234567".to_string(),
            address: "House 12, Street 4".to_string(),
            city: "Lahore".to_string(),
            province: "Punjab".to_string(),
            ..CheckoutForm::default()
        }
    }

    fn lines() -> Vec<CartLineItem> {
        let product = Product::new(ProductId::parse("bag-1").unwrap(), "Tote", Price::from_units(1500));
        let mut line = CartLineItem::from_product(&product, VariantSelection::new(Some("Black"), None));
        line.set_quantity(2);
        vec![line]
    }

    fn coupon(discount_type: DiscountType, value: i64) -> AppliedCoupon {
        AppliedCoupon {
            code: "SAVE".to_string(),
            discount: Discount::new(discount_type, Decimal::from(value)).unwrap(),
        }
    }

    #[test]
    fn test_validate_reports_first_missing_field() {
        let mut incomplete = form();
        incomplete.city = "  ".to_string();
        incomplete.phone = String::new();
        assert!(matches!(
            incomplete.validate(),
            Err(CheckoutError::MissingField("phone number"))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_email() {
        let mut bad = form();
        bad.email = "not-an-email".to_string();
        assert!(matches!(bad.validate(), Err(CheckoutError::InvalidEmail(_))));
    }

    #[test]
    fn test_validate_trims() {
        let customer = form().validate().unwrap();
        assert_eq!(customer.email, "ayesha@example.pk");
        assert_eq!(customer.postal_code, "");
    }

    #[test]
    fn test_percentage_coupon_pricing() {
        let lines = lines();
        let totals = CartTotals::compute(&lines, &PricingConfig::default());
        let pricing = order_pricing(&totals, Some(&coupon(DiscountType::Percentage, 10)));
        assert_eq!(pricing.subtotal, Price::from_units(3000));
        assert_eq!(pricing.delivery_charge, Price::from_units(200));
        assert_eq!(pricing.discount, Price::from_units(300));
        assert_eq!(pricing.total, Price::from_units(2900));
    }

    #[test]
    fn test_fixed_coupon_capped_at_subtotal() {
        let lines = lines();
        let totals = CartTotals::compute(&lines, &PricingConfig::default());
        let pricing = order_pricing(&totals, Some(&coupon(DiscountType::Fixed, 10_000)));
        assert_eq!(pricing.discount, Price::from_units(3000));
        assert_eq!(pricing.total, Price::from_units(200));
    }

    #[test]
    fn test_build_order() {
        let lines = lines();
        let totals = CartTotals::compute(&lines, &PricingConfig::default());
        let order = build_order(&form(), &lines, &totals, None).unwrap();
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.items[0].color.as_deref(), Some("Black"));
        assert_eq!(order.pricing.total, Price::from_units(3200));
        assert!(order.coupon_code.is_none());

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["customer"]["firstName"], "Ayesha");
        assert_eq!(json["pricing"]["deliveryCharge"], "200");
        assert_eq!(json["items"][0]["productId"], "bag-1");
        assert_eq!(json["paymentMethod"], "cod");
    }

    #[test]
    fn test_build_order_rejects_empty_cart() {
        let totals = CartTotals::compute(&[], &PricingConfig::default());
        assert!(matches!(
            build_order(&form(), &[], &totals, None),
            Err(CheckoutError::EmptyCart)
        ));
    }

    #[test]
    fn test_last_order_number_roundtrip() {
        let storage = MemoryStore::new();
        assert!(last_order_number(&storage).is_none());
        save_json(&storage, LAST_ORDER_KEY, &OrderNumber::parse("CC-1001").unwrap()).unwrap();
        assert_eq!(last_order_number(&storage).unwrap().as_str(), "CC-1001");
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(CheckoutError::EmptyCart.user_message(), "Your cart is empty");
        assert_eq!(
            CheckoutError::MissingField("city").user_message(),
            "Please enter your city"
        );
    }
}
