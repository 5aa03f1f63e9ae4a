//! Catalog browsing commands.

use classic_carry_core::Product;
use classic_carry_storefront::AppError;
use classic_carry_storefront::api::ProductQuery;
use classic_carry_storefront::images::{resolve_image_url, resolve_image_urls};
use classic_carry_storefront::state::AppState;
use tracing::info;

use super::{DEFAULT_SYMBOL, product_id};

/// List products, optionally filtered by category slug or search text.
///
/// # Errors
///
/// Returns an error if the products cannot be fetched.
pub async fn list(
    state: &AppState,
    category: Option<String>,
    search: Option<String>,
    limit: Option<u32>,
) -> Result<(), AppError> {
    let query = ProductQuery {
        category,
        search,
        limit,
        ..ProductQuery::default()
    };
    let products = state.api().products(&query).await?;
    info!(count = products.len(), "Fetched products");
    print_products(&products);
    Ok(())
}

/// List hot products.
///
/// # Errors
///
/// Returns an error if the products cannot be fetched.
pub async fn hot(state: &AppState) -> Result<(), AppError> {
    let products = state.api().hot_products().await?;
    print_products(&products);
    Ok(())
}

/// Show one product in detail.
///
/// # Errors
///
/// Returns an error if the ID is invalid or the product cannot be fetched.
#[allow(clippy::print_stdout)]
pub async fn show(state: &AppState, id: &str) -> Result<(), AppError> {
    let id = product_id(id)?;
    let product = state.api().product(&id).await?;
    let base_url = state.api().base_url();

    println!("{}", product.name);
    println!("  ID:        {}", product.id);
    println!("  Price:     {}", product.price.display_with(DEFAULT_SYMBOL));
    if let Some(category) = &product.category_name {
        println!("  Category:  {category}");
    }
    match product.stock {
        Some(0) => println!("  Stock:     out of stock"),
        Some(stock) => println!("  Stock:     {stock}"),
        None => {}
    }
    if !product.colors.is_empty() {
        println!("  Colors:    {}", product.colors.join(", "));
    }
    if !product.sizes.is_empty() {
        println!("  Sizes:     {}", product.sizes.join(", "));
    }
    println!(
        "  Image:     {}",
        resolve_image_url(base_url, product.display_image())
    );
    for image in resolve_image_urls(base_url, &product.images) {
        println!("             {image}");
    }
    if let Some(description) = &product.description {
        println!();
        println!("{description}");
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_products(products: &[Product]) {
    if products.is_empty() {
        println!("No products found");
        return;
    }
    for product in products {
        let hot = if product.is_hot { " [hot]" } else { "" };
        println!(
            "{:<26} {:<40} {}{hot}",
            product.id.as_str(),
            product.name,
            product.price.display_with(DEFAULT_SYMBOL),
        );
    }
}
