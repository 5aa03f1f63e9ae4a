//! Cart line items.
//!
//! A line is identified by its [`LineKey`]: the product id together with
//! the chosen color and size. The persisted JSON shape uses the short field
//! names the storefront has always written (`id`, `price`, `qty`, `img`,
//! `selectedColor`, `selectedSize`) so existing carts keep loading.

use serde::{Deserialize, Deserializer, Serialize};

use super::id::ProductId;
use super::price::Price;
use super::product::{Product, VariantSelection};

/// Identity of a cart line: product plus variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey {
    pub product_id: ProductId,
    pub variant: VariantSelection,
}

impl LineKey {
    /// Key for a specific variant of a product.
    #[must_use]
    pub const fn new(product_id: ProductId, variant: VariantSelection) -> Self {
        Self {
            product_id,
            variant,
        }
    }

    /// Key for a product added without any color or size.
    #[must_use]
    pub const fn product(product_id: ProductId) -> Self {
        Self::new(product_id, VariantSelection::none())
    }
}

/// One entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    #[serde(rename = "id")]
    pub product_id: ProductId,
    pub name: String,
    /// Price captured when the line was created. Never re-priced.
    #[serde(rename = "price")]
    pub unit_price: Price,
    #[serde(rename = "qty", default = "one", deserialize_with = "at_least_one")]
    quantity: u32,
    #[serde(rename = "img", default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(flatten)]
    pub variant: VariantSelection,
}

impl CartLineItem {
    /// Start a new line for a product with quantity 1.
    #[must_use]
    pub fn from_product(product: &Product, variant: VariantSelection) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            quantity: 1,
            image: product.display_image().map(str::to_owned),
            variant,
        }
    }

    /// Current quantity, always at least 1.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Set the quantity, raising anything below 1 to 1.
    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity.max(1);
    }

    /// Add one unit.
    pub const fn increment(&mut self) {
        self.quantity = self.quantity.saturating_add(1);
    }

    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }

    /// Returns `true` if this line has the given product and variant.
    #[must_use]
    pub fn matches(&self, key: &LineKey) -> bool {
        self.product_id == key.product_id && self.variant == key.variant
    }
}

const fn one() -> u32 {
    1
}

fn at_least_one<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<u32> = Option::deserialize(deserializer)?;
    Ok(value.unwrap_or(1).max(1))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn tote() -> Product {
        Product::new(ProductId::parse("tote").unwrap(), "Canvas Tote", Price::from_units(1000))
            .with_main_image("/uploads/tote.webp")
    }

    #[test]
    fn test_from_product_copies_fields() {
        let line = CartLineItem::from_product(&tote(), VariantSelection::color("Black"));
        assert_eq!(line.product_id.as_str(), "tote");
        assert_eq!(line.name, "Canvas Tote");
        assert_eq!(line.unit_price, Price::from_units(1000));
        assert_eq!(line.quantity(), 1);
        assert_eq!(line.image.as_deref(), Some("/uploads/tote.webp"));
    }

    #[test]
    fn test_set_quantity_clamps_to_one() {
        let mut line = CartLineItem::from_product(&tote(), VariantSelection::none());
        line.set_quantity(0);
        assert_eq!(line.quantity(), 1);
        line.set_quantity(4);
        assert_eq!(line.line_total(), Price::from_units(4000));
    }

    #[test]
    fn test_matches_is_variant_sensitive() {
        let line = CartLineItem::from_product(&tote(), VariantSelection::color("Black"));
        let id = ProductId::parse("tote").unwrap();
        assert!(line.matches(&LineKey::new(id.clone(), VariantSelection::color("Black"))));
        assert!(!line.matches(&LineKey::new(id.clone(), VariantSelection::color("Red"))));
        assert!(!line.matches(&LineKey::product(id)));
    }

    #[test]
    fn test_persisted_shape() {
        let line = CartLineItem::from_product(&tote(), VariantSelection::new(Some("Black"), None));
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["id"], "tote");
        assert_eq!(json["qty"], 1);
        assert_eq!(json["selectedColor"], "Black");
        assert!(json.get("selectedSize").is_none());
    }

    #[test]
    fn test_loads_legacy_line_without_qty() {
        let raw = r#"{"id":12,"name":"Wallet","price":850,"img":"/w.png","selectedColor":"","selectedSize":""}"#;
        let line: CartLineItem = serde_json::from_str(raw).unwrap();
        assert_eq!(line.product_id.as_str(), "12");
        assert_eq!(line.quantity(), 1);
        assert!(line.variant.is_empty());
    }

    #[test]
    fn test_zero_qty_loads_as_one() {
        let raw = r#"{"id":"w","name":"Wallet","price":"850","qty":0}"#;
        let line: CartLineItem = serde_json::from_str(raw).unwrap();
        assert_eq!(line.quantity(), 1);
    }
}
