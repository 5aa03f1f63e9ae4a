//! Subcommand implementations.

pub mod cart;
pub mod health;
pub mod products;
pub mod settings;
pub mod wishlist;

use classic_carry_core::ProductId;
use classic_carry_storefront::AppError;

/// Currency symbol used when the shop settings have not been fetched.
pub(crate) const DEFAULT_SYMBOL: &str = "Rs";

/// Parse a product ID given on the command line.
pub(crate) fn product_id(raw: &str) -> Result<ProductId, AppError> {
    Ok(ProductId::parse(raw)?)
}
