//! Cache types for catalog responses.

use classic_carry_core::Product;

use super::types::Category;

/// Cache key for products and categories.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(String),
    Products { query: String },
    HotProducts,
    CategoryProducts(String),
    Category(String),
    Categories { query: String },
    FeaturedWithProducts,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
    Category(Box<Category>),
    Categories(Vec<Category>),
}
