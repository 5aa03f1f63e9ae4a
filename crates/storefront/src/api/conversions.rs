//! Normalisation of catalog payloads into core types.
//!
//! The API is inconsistent about identifiers (`id` vs `_id`, strings vs
//! integers), image fields (`mainImage` vs `img`) and categories (a slug
//! string or an embedded object). Everything is resolved here, once.

use classic_carry_core::types::id::RawId;
use classic_carry_core::{CategoryId, Price, Product, ProductId};
use serde::Deserialize;
use tracing::warn;

use super::ApiError;
use super::types::Category;

/// A product exactly as the API sends it.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RawProduct {
    id: Option<RawId>,
    #[serde(rename = "_id")]
    mongo_id: Option<RawId>,
    name: Option<String>,
    price: Option<Price>,
    main_image: Option<String>,
    img: Option<String>,
    images: Vec<String>,
    category: Option<RawCategoryRef>,
    category_name: Option<String>,
    colors: Vec<String>,
    sizes: Vec<String>,
    stock: Option<u32>,
    is_hot: bool,
    description: Option<String>,
}

/// A product's category: either a bare reference or an embedded document.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCategoryRef {
    Embedded {
        #[serde(default)]
        name: Option<String>,
    },
    Reference(String),
}

/// A category exactly as the API sends it.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RawCategory {
    id: Option<RawId>,
    #[serde(rename = "_id")]
    mongo_id: Option<RawId>,
    name: Option<String>,
    slug: Option<String>,
    image: Option<String>,
    description: Option<String>,
    is_featured: bool,
    products: Vec<RawProduct>,
}

fn resolve_id(id: Option<RawId>, mongo_id: Option<RawId>) -> Option<String> {
    id.or(mongo_id)
        .map(RawId::into_string)
        .filter(|s| !s.trim().is_empty())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Convert one product, rejecting payloads without an id, name or price.
pub(crate) fn convert_product(raw: RawProduct) -> Result<Product, ApiError> {
    let id = resolve_id(raw.id, raw.mongo_id)
        .and_then(|id| ProductId::parse(&id).ok())
        .ok_or_else(|| ApiError::InvalidProduct("missing id".to_string()))?;
    let name = non_blank(raw.name)
        .ok_or_else(|| ApiError::InvalidProduct(format!("{id}: missing name")))?;
    let price = raw
        .price
        .filter(|p| !p.is_negative())
        .ok_or_else(|| ApiError::InvalidProduct(format!("{id}: missing or negative price")))?;

    let category_name = non_blank(raw.category_name).or(match raw.category {
        Some(RawCategoryRef::Embedded { name }) => non_blank(name),
        Some(RawCategoryRef::Reference(_)) | None => None,
    });

    let mut product = Product::new(id, name, price);
    product.main_image = non_blank(raw.main_image).or_else(|| non_blank(raw.img));
    product.images = raw.images.into_iter().filter(|i| !i.trim().is_empty()).collect();
    product.category_name = category_name;
    product.colors = raw.colors;
    product.sizes = raw.sizes;
    product.stock = raw.stock;
    product.is_hot = raw.is_hot;
    product.description = non_blank(raw.description);
    Ok(product)
}

/// Convert a product listing, dropping entries that cannot be normalised.
pub(crate) fn convert_products(raw: Vec<RawProduct>) -> Vec<Product> {
    raw.into_iter()
        .filter_map(|p| match convert_product(p) {
            Ok(product) => Some(product),
            Err(e) => {
                warn!(error = %e, "Skipping malformed product");
                None
            }
        })
        .collect()
}

pub(crate) fn convert_category(raw: RawCategory) -> Result<Category, ApiError> {
    let id = resolve_id(raw.id, raw.mongo_id)
        .and_then(|id| CategoryId::parse(&id).ok())
        .ok_or_else(|| ApiError::InvalidCategory("missing id".to_string()))?;
    let name = non_blank(raw.name)
        .ok_or_else(|| ApiError::InvalidCategory(format!("{id}: missing name")))?;
    let slug = non_blank(raw.slug).unwrap_or_else(|| id.to_string());

    Ok(Category {
        id,
        name,
        slug,
        image: non_blank(raw.image),
        description: non_blank(raw.description),
        is_featured: raw.is_featured,
        products: convert_products(raw.products),
    })
}

pub(crate) fn convert_categories(raw: Vec<RawCategory>) -> Vec<Category> {
    raw.into_iter()
        .filter_map(|c| match convert_category(c) {
            Ok(category) => Some(category),
            Err(e) => {
                warn!(error = %e, "Skipping malformed category");
                None
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn raw(json: &str) -> RawProduct {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_mongo_id_and_string_price() {
        let product = convert_product(raw(
            r#"{"_id":"65af","name":"Tote","price":"2999.50","mainImage":"/uploads/tote.jpg"}"#,
        ))
        .unwrap();
        assert_eq!(product.id.as_str(), "65af");
        assert_eq!(product.price.to_string(), "2,999.50");
        assert_eq!(product.main_image.as_deref(), Some("/uploads/tote.jpg"));
    }

    #[test]
    fn test_numeric_id_and_legacy_image() {
        let product = convert_product(raw(r#"{"id":7,"name":"Clutch","price":1500,"img":"c.png"}"#)).unwrap();
        assert_eq!(product.id.as_str(), "7");
        assert_eq!(product.main_image.as_deref(), Some("c.png"));
    }

    #[test]
    fn test_category_forms() {
        let embedded = convert_product(raw(
            r#"{"_id":"a","name":"A","price":1,"category":{"_id":"c1","name":"Backpacks"}}"#,
        ))
        .unwrap();
        assert_eq!(embedded.category_name.as_deref(), Some("Backpacks"));

        let reference =
            convert_product(raw(r#"{"_id":"a","name":"A","price":1,"category":"c1"}"#)).unwrap();
        assert_eq!(reference.category_name, None);
    }

    #[test]
    fn test_rejects_incomplete_products() {
        assert!(matches!(
            convert_product(raw(r#"{"name":"No id","price":1}"#)),
            Err(ApiError::InvalidProduct(_))
        ));
        assert!(convert_product(raw(r#"{"_id":"x","name":"No price"}"#)).is_err());
        assert!(convert_product(raw(r#"{"_id":"x","name":"  ","price":1}"#)).is_err());
        assert!(convert_product(raw(r#"{"_id":"x","name":"Neg","price":-5}"#)).is_err());
    }

    #[test]
    fn test_listing_skips_bad_entries() {
        let list: Vec<RawProduct> = serde_json::from_str(
            r#"[{"_id":"a","name":"A","price":10},{"name":"broken"},{"id":"b","name":"B","price":20}]"#,
        )
        .unwrap();
        let products = convert_products(list);
        assert_eq!(products.len(), 2);
        assert_eq!(products[1].id.as_str(), "b");
    }

    #[test]
    fn test_category_with_products() {
        let raw: RawCategory = serde_json::from_str(
            r#"{"_id":"c1","name":"Bags","slug":"bags","isFeatured":true,
                "products":[{"_id":"p1","name":"Tote","price":100}]}"#,
        )
        .unwrap();
        let category = convert_category(raw).unwrap();
        assert_eq!(category.slug, "bags");
        assert!(category.is_featured);
        assert_eq!(category.products.len(), 1);
    }
}
