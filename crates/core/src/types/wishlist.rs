//! Wishlist entries and the result type shared by wishlist operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{IdError, ProductId, RawId};
use super::price::Price;
use super::product::Product;

/// A product saved for later.
///
/// Written with an `id` field. Read back from `id`, `_id` or both, since
/// older entries carry the document id under `_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StoredWishlistItem")]
pub struct WishlistItem {
    #[serde(rename = "id")]
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl WishlistItem {
    /// Snapshot a product at `added_at`.
    #[must_use]
    pub fn from_product(product: &Product, added_at: DateTime<Utc>) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            main_image: product.display_image().map(str::to_owned),
            category_name: product.category_name.clone(),
            added_at,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredWishlistItem {
    #[serde(default)]
    id: Option<RawId>,
    #[serde(default, rename = "_id")]
    mongo_id: Option<RawId>,
    name: String,
    price: Price,
    #[serde(default)]
    main_image: Option<String>,
    #[serde(default)]
    category_name: Option<String>,
    added_at: DateTime<Utc>,
}

impl TryFrom<StoredWishlistItem> for WishlistItem {
    type Error = IdError;

    fn try_from(stored: StoredWishlistItem) -> Result<Self, Self::Error> {
        let id = [stored.id, stored.mongo_id]
            .into_iter()
            .flatten()
            .map(RawId::into_string)
            .find(|id| !id.trim().is_empty())
            .ok_or(IdError::Empty)?;
        Ok(Self {
            product_id: ProductId::parse(&id)?,
            name: stored.name,
            price: stored.price,
            main_image: stored.main_image,
            category_name: stored.category_name,
            added_at: stored.added_at,
        })
    }
}

/// Outcome of a wishlist operation, shown to the shopper as a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreOutcome {
    pub success: bool,
    pub message: String,
}

impl StoreOutcome {
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_product_snapshot() {
        let product = Product::new(ProductId::parse("bag-1").unwrap(), "Sling Bag", Price::from_units(3200))
            .with_category("Bags");
        let at = DateTime::parse_from_rfc3339("2026-01-05T10:00:00Z").unwrap().with_timezone(&Utc);
        let item = WishlistItem::from_product(&product, at);

        assert_eq!(item.product_id.as_str(), "bag-1");
        assert_eq!(item.category_name.as_deref(), Some("Bags"));
        assert_eq!(item.added_at, at);
    }

    #[test]
    fn test_reads_underscore_id_entries() {
        let item: WishlistItem = serde_json::from_str(
            r#"{"_id":"65af3c","name":"Tote","price":2500,"mainImage":"/uploads/tote.jpg","addedAt":"2024-05-01T10:00:00.000Z"}"#,
        )
        .unwrap();
        assert_eq!(item.product_id.as_str(), "65af3c");
        assert_eq!(item.price, Price::from_units(2500));

        let both: WishlistItem = serde_json::from_str(
            r#"{"_id":"65af3c","id":"","name":"Tote","price":"2500","addedAt":"2024-05-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(both.product_id.as_str(), "65af3c");

        let written = serde_json::to_value(&item).unwrap();
        assert_eq!(written["id"], "65af3c");
        assert!(written.get("_id").is_none());
    }

    #[test]
    fn test_entry_without_any_id_is_rejected() {
        let result = serde_json::from_str::<WishlistItem>(
            r#"{"name":"Tote","price":2500,"addedAt":"2024-05-01T10:00:00Z"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_outcome_constructors() {
        assert!(StoreOutcome::ok("Added to wishlist").success);
        let failed = StoreOutcome::failed("Already in wishlist");
        assert!(!failed.success);
        assert_eq!(failed.message, "Already in wishlist");
    }
}
