//! Pricing rules: delivery fee, free-delivery threshold and coupon discounts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::cart::CartLineItem;
use super::price::Price;

/// Errors raised when building pricing rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("delivery fee cannot be negative (got {0})")]
    NegativeDeliveryFee(Price),
    #[error("free delivery threshold cannot be negative (got {0})")]
    NegativeThreshold(Price),
    #[error("discount value cannot be negative (got {0})")]
    NegativeDiscount(Decimal),
}

/// Flat delivery fee and the subtotal at which it is waived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingConfig {
    delivery_fee: Price,
    free_delivery_threshold: Price,
}

impl PricingConfig {
    /// Fee charged when the shop has not configured one.
    pub const DEFAULT_DELIVERY_FEE: i64 = 200;
    /// Threshold used when the shop has not configured one.
    pub const DEFAULT_FREE_DELIVERY_THRESHOLD: i64 = 4000;

    /// Build a config.
    ///
    /// # Errors
    ///
    /// Returns `PricingError` if either amount is negative.
    pub fn new(delivery_fee: Price, free_delivery_threshold: Price) -> Result<Self, PricingError> {
        if delivery_fee.is_negative() {
            return Err(PricingError::NegativeDeliveryFee(delivery_fee));
        }
        if free_delivery_threshold.is_negative() {
            return Err(PricingError::NegativeThreshold(free_delivery_threshold));
        }
        Ok(Self {
            delivery_fee,
            free_delivery_threshold,
        })
    }

    #[must_use]
    pub const fn delivery_fee(&self) -> Price {
        self.delivery_fee
    }

    #[must_use]
    pub const fn free_delivery_threshold(&self) -> Price {
        self.free_delivery_threshold
    }

    /// Free delivery applies at or above the threshold.
    #[must_use]
    pub fn qualifies_for_free_delivery(&self, subtotal: Price) -> bool {
        subtotal >= self.free_delivery_threshold
    }

    /// Fee owed for a cart. An empty cart owes nothing.
    #[must_use]
    pub fn delivery_fee_for(&self, subtotal: Price, cart_is_empty: bool) -> Price {
        if cart_is_empty || self.qualifies_for_free_delivery(subtotal) {
            Price::ZERO
        } else {
            self.delivery_fee
        }
    }

    /// How much more the shopper must spend to reach free delivery.
    #[must_use]
    pub fn remaining_for_free_delivery(&self, subtotal: Price) -> Price {
        if self.qualifies_for_free_delivery(subtotal) {
            Price::ZERO
        } else {
            Price::new(self.free_delivery_threshold.amount() - subtotal.amount())
        }
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            delivery_fee: Price::from_units(Self::DEFAULT_DELIVERY_FEE),
            free_delivery_threshold: Price::from_units(Self::DEFAULT_FREE_DELIVERY_THRESHOLD),
        }
    }
}

/// Derived cart figures, computed in one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: u32,
    pub subtotal: Price,
    pub delivery_fee: Price,
    pub total: Price,
    pub free_delivery: bool,
}

impl CartTotals {
    /// Compute totals for a set of lines under a pricing config.
    #[must_use]
    pub fn compute(lines: &[CartLineItem], config: &PricingConfig) -> Self {
        let item_count = lines
            .iter()
            .fold(0_u32, |acc, line| acc.saturating_add(line.quantity()));
        let subtotal: Price = lines.iter().map(CartLineItem::line_total).sum();
        let delivery_fee = config.delivery_fee_for(subtotal, lines.is_empty());

        Self {
            item_count,
            subtotal,
            delivery_fee,
            total: subtotal + delivery_fee,
            free_delivery: config.qualifies_for_free_delivery(subtotal),
        }
    }
}

/// How a coupon reduces the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// `value` percent of the subtotal.
    Percentage,
    /// `value` currency units off.
    Fixed,
}

/// A validated coupon's effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
}

impl Discount {
    /// Build a discount.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::NegativeDiscount` for a negative value.
    pub fn new(discount_type: DiscountType, discount_value: Decimal) -> Result<Self, PricingError> {
        if discount_value.is_sign_negative() && !discount_value.is_zero() {
            return Err(PricingError::NegativeDiscount(discount_value));
        }
        Ok(Self {
            discount_type,
            discount_value,
        })
    }

    /// Amount taken off `subtotal`, never more than the subtotal itself.
    #[must_use]
    pub fn amount_off(&self, subtotal: Price) -> Price {
        let raw = match self.discount_type {
            DiscountType::Percentage => {
                subtotal.amount() * self.discount_value / Decimal::ONE_HUNDRED
            }
            DiscountType::Fixed => self.discount_value,
        };
        Price::new(raw.clamp(Decimal::ZERO, subtotal.amount().max(Decimal::ZERO)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::id::ProductId;
    use crate::types::product::{Product, VariantSelection};

    fn line(price: i64, qty: u32) -> CartLineItem {
        let product = Product::new(ProductId::parse("p").unwrap(), "Item", Price::from_units(price));
        let mut line = CartLineItem::from_product(&product, VariantSelection::none());
        line.set_quantity(qty);
        line
    }

    fn config(fee: i64, threshold: i64) -> PricingConfig {
        PricingConfig::new(Price::from_units(fee), Price::from_units(threshold)).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = PricingConfig::default();
        assert_eq!(config.delivery_fee(), Price::from_units(200));
        assert_eq!(config.free_delivery_threshold(), Price::from_units(4000));
    }

    #[test]
    fn test_negative_values_rejected() {
        assert!(matches!(
            PricingConfig::new(Price::from_units(-1), Price::from_units(10)),
            Err(PricingError::NegativeDeliveryFee(_))
        ));
        assert!(matches!(
            PricingConfig::new(Price::from_units(1), Price::from_units(-10)),
            Err(PricingError::NegativeThreshold(_))
        ));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let config = config(200, 4000);
        assert!(config.qualifies_for_free_delivery(Price::from_units(4000)));
        assert!(!config.qualifies_for_free_delivery(Price::from_units(3999)));
        assert_eq!(config.delivery_fee_for(Price::from_units(4000), false), Price::ZERO);
    }

    #[test]
    fn test_empty_cart_has_no_fee() {
        let config = config(500, 100_000);
        assert_eq!(config.delivery_fee_for(Price::ZERO, true), Price::ZERO);
    }

    #[test]
    fn test_totals_below_threshold() {
        let totals = CartTotals::compute(&[line(1000, 2)], &config(200, 4000));
        assert_eq!(totals.item_count, 2);
        assert_eq!(totals.subtotal, Price::from_units(2000));
        assert_eq!(totals.delivery_fee, Price::from_units(200));
        assert_eq!(totals.total, Price::from_units(2200));
        assert!(!totals.free_delivery);
    }

    #[test]
    fn test_totals_above_threshold() {
        let totals = CartTotals::compute(&[line(5000, 1)], &config(200, 4000));
        assert_eq!(totals.delivery_fee, Price::ZERO);
        assert_eq!(totals.total, Price::from_units(5000));
        assert!(totals.free_delivery);
    }

    #[test]
    fn test_remaining_for_free_delivery() {
        let config = config(200, 4000);
        assert_eq!(config.remaining_for_free_delivery(Price::from_units(2500)), Price::from_units(1500));
        assert_eq!(config.remaining_for_free_delivery(Price::from_units(4500)), Price::ZERO);
    }

    #[test]
    fn test_percentage_discount() {
        let discount = Discount::new(DiscountType::Percentage, Decimal::from(10)).unwrap();
        assert_eq!(discount.amount_off(Price::from_units(2500)), Price::from_units(250));
    }

    #[test]
    fn test_fixed_discount_capped_at_subtotal() {
        let discount = Discount::new(DiscountType::Fixed, Decimal::from(500)).unwrap();
        assert_eq!(discount.amount_off(Price::from_units(2000)), Price::from_units(500));
        assert_eq!(discount.amount_off(Price::from_units(300)), Price::from_units(300));
    }

    #[test]
    fn test_negative_discount_rejected() {
        assert!(Discount::new(DiscountType::Fixed, Decimal::from(-5)).is_err());
    }
}
