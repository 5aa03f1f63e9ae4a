//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! cc-cli cart add 65af3c --color Black --size M
//! cc-cli cart set-qty 65af3c 3 --color Black --size M
//! cc-cli cart remove-product 65af3c
//! ```

use classic_carry_core::{LineKey, VariantSelection};
use classic_carry_storefront::AppError;
use classic_carry_storefront::cart::CartStore;
use classic_carry_storefront::state::AppState;
use tracing::{info, warn};

use super::{DEFAULT_SYMBOL, product_id};

/// Sync delivery pricing from the shop settings and return the currency
/// symbol to print with.
///
/// Falls back to the configured pricing when the settings are unreachable.
async fn synced_symbol(state: &AppState) -> String {
    match state.sync_settings().await {
        Ok(settings) => settings.symbol().to_string(),
        Err(e) => {
            warn!(error = %e, "Using configured delivery pricing");
            DEFAULT_SYMBOL.to_string()
        }
    }
}

/// Print the cart after syncing delivery pricing from the shop settings.
pub async fn show(state: &AppState) {
    let symbol = synced_symbol(state).await;
    print_cart(&state.cart(), &symbol);
}

/// Fetch a product and add one unit of it in the given variant.
///
/// # Errors
///
/// Returns an error if the ID is invalid or the product cannot be fetched.
pub async fn add(state: &AppState, id: &str, variant: VariantSelection) -> Result<(), AppError> {
    let id = product_id(id)?;
    let product = state.api().product(&id).await?;
    if !product.in_stock() {
        warn!(product_id = %product.id, "Product is out of stock");
    }
    let symbol = synced_symbol(state).await;

    let mut cart = state.cart();
    cart.add_item(&product, variant);
    info!(product_id = %product.id, items = cart.total_item_count(), "Added to cart");
    print_cart(&cart, &symbol);
    Ok(())
}

/// Remove the line for a product in one variant.
///
/// # Errors
///
/// Returns an error if the ID is invalid.
pub async fn remove(
    state: &AppState,
    id: &str,
    variant: VariantSelection,
) -> Result<(), AppError> {
    let key = LineKey::new(product_id(id)?, variant);
    let symbol = synced_symbol(state).await;
    let mut cart = state.cart();
    cart.remove_item(&key);
    print_cart(&cart, &symbol);
    Ok(())
}

/// Remove every line for a product.
///
/// # Errors
///
/// Returns an error if the ID is invalid.
pub async fn remove_product(state: &AppState, id: &str) -> Result<(), AppError> {
    let id = product_id(id)?;
    let symbol = synced_symbol(state).await;
    let mut cart = state.cart();
    cart.remove_product(&id);
    print_cart(&cart, &symbol);
    Ok(())
}

/// Set a line's quantity. Zero or less removes the line.
///
/// # Errors
///
/// Returns an error if the ID is invalid.
pub async fn set_quantity(
    state: &AppState,
    id: &str,
    quantity: f64,
    variant: VariantSelection,
) -> Result<(), AppError> {
    let key = LineKey::new(product_id(id)?, variant);
    let symbol = synced_symbol(state).await;
    let mut cart = state.cart();
    if cart.line(&key).is_none() {
        return Err(AppError::NotFound(format!("Cart line for product {}", key.product_id)));
    }
    cart.set_quantity(&key, quantity);
    print_cart(&cart, &symbol);
    Ok(())
}

/// Empty the cart.
#[allow(clippy::print_stdout)]
pub fn clear(state: &AppState) {
    state.cart().clear();
    println!("Cart cleared");
}

#[allow(clippy::print_stdout)]
fn print_cart(cart: &CartStore, symbol: &str) {
    if cart.is_empty() {
        println!("Your cart is empty");
        return;
    }

    for line in cart.items() {
        let variant = match (line.variant.selected_color(), line.variant.selected_size()) {
            (Some(color), Some(size)) => format!(" ({color}, {size})"),
            (Some(only), None) | (None, Some(only)) => format!(" ({only})"),
            (None, None) => String::new(),
        };
        println!(
            "{:<26} {}{variant} x{} = {}",
            line.product_id.as_str(),
            line.name,
            line.quantity(),
            line.line_total().display_with(symbol),
        );
    }

    let totals = cart.totals();
    let config = cart.config();
    println!();
    println!("Items:     {}", totals.item_count);
    println!("Subtotal:  {}", totals.subtotal.display_with(symbol));
    if totals.free_delivery {
        println!("Delivery:  FREE");
    } else {
        println!("Delivery:  {}", totals.delivery_fee.display_with(symbol));
        println!(
            "Add {} more for free delivery",
            config
                .remaining_for_free_delivery(totals.subtotal)
                .display_with(symbol)
        );
    }
    println!("Total:     {}", totals.total.display_with(symbol));
}
