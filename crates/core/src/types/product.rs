//! Normalised product and variant types.
//!
//! The commerce API is loose about product shape; the storefront crate
//! converts its payloads into a [`Product`] exactly once, so everything
//! downstream can rely on a present id, name and price.

use serde::{Deserialize, Deserializer, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A catalog product as seen by the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_image: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sizes: Vec<String>,
    /// Units on hand, when the API reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    #[serde(default)]
    pub is_hot: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Product {
    /// Create a product with only the fields the cart needs.
    #[must_use]
    pub fn new(id: ProductId, name: impl Into<String>, price: Price) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            main_image: None,
            images: Vec::new(),
            category_name: None,
            colors: Vec::new(),
            sizes: Vec::new(),
            stock: None,
            is_hot: false,
            description: None,
        }
    }

    /// Set the main image (builder style).
    #[must_use]
    pub fn with_main_image(mut self, image: impl Into<String>) -> Self {
        self.main_image = Some(image.into());
        self
    }

    /// Set the category name (builder style).
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category_name = Some(category.into());
        self
    }

    /// The image shown for this product: the main image, else the first
    /// gallery image.
    #[must_use]
    pub fn display_image(&self) -> Option<&str> {
        self.main_image
            .as_deref()
            .or_else(|| self.images.first().map(String::as_str))
    }

    /// Returns `false` only when the API reported zero stock.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.stock != Some(0)
    }
}

/// The color/size a shopper picked for a product.
///
/// Empty or whitespace-only values mean "no selection", so `""` and a
/// missing field compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantSelection {
    #[serde(
        rename = "selectedColor",
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    color: Option<String>,
    #[serde(
        rename = "selectedSize",
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    size: Option<String>,
}

impl VariantSelection {
    /// No color or size chosen.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            color: None,
            size: None,
        }
    }

    /// Build a selection, normalising blank values away.
    #[must_use]
    pub fn new(color: Option<&str>, size: Option<&str>) -> Self {
        Self {
            color: color.and_then(normalise),
            size: size.and_then(normalise),
        }
    }

    /// Selection with only a color.
    #[must_use]
    pub fn color(color: &str) -> Self {
        Self::new(Some(color), None)
    }

    /// Chosen color, if any.
    #[must_use]
    pub fn selected_color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    /// Chosen size, if any.
    #[must_use]
    pub fn selected_size(&self) -> Option<&str> {
        self.size.as_deref()
    }

    /// Returns `true` if neither a color nor a size was picked.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.color.is_none() && self.size.is_none()
    }
}

impl std::fmt::Display for VariantSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.color, &self.size) {
            (Some(color), Some(size)) => write!(f, "{color} / {size}"),
            (Some(one), None) | (None, Some(one)) => f.write_str(one),
            (None, None) => f.write_str("-"),
        }
    }
}

fn normalise(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.as_deref().and_then(normalise))
}
