//! Wishlist commands.

use classic_carry_core::StoreOutcome;
use classic_carry_storefront::AppError;
use classic_carry_storefront::state::AppState;
use classic_carry_storefront::wishlist::ALREADY_PRESENT;

use super::{DEFAULT_SYMBOL, product_id};

/// List saved products, newest last.
#[allow(clippy::print_stdout)]
pub fn list(state: &AppState) {
    let wishlist = state.wishlist();
    if wishlist.count() == 0 {
        println!("Your wishlist is empty");
        return;
    }

    for item in wishlist.items() {
        println!(
            "{:<26} {} {} (saved {})",
            item.product_id.as_str(),
            item.name,
            item.price.display_with(DEFAULT_SYMBOL),
            item.added_at.format("%Y-%m-%d"),
        );
    }
    println!();
    println!("{} saved", wishlist.count());
}

/// Fetch a product and save it.
///
/// # Errors
///
/// Returns an error if the ID is invalid, the product is already saved, the
/// product cannot be fetched or the wishlist cannot be saved.
pub async fn add(state: &AppState, id: &str) -> Result<(), AppError> {
    let id = product_id(id)?;
    if state.wishlist().contains(&id) {
        return report(StoreOutcome::failed(ALREADY_PRESENT));
    }
    let product = state.api().product(&id).await?;
    let outcome = state.wishlist().add(&product);
    report(outcome)
}

/// Remove a saved product.
///
/// # Errors
///
/// Returns an error if the ID is invalid or the wishlist cannot be saved.
pub fn remove(state: &AppState, id: &str) -> Result<(), AppError> {
    let id = product_id(id)?;
    let outcome = state.wishlist().remove(&id);
    report(outcome)
}

/// Save a product, or remove it if already saved.
///
/// The product is only fetched when it needs to be added.
///
/// # Errors
///
/// Returns an error if the ID is invalid, the product cannot be fetched or
/// the wishlist cannot be saved.
pub async fn toggle(state: &AppState, id: &str) -> Result<(), AppError> {
    let id = product_id(id)?;
    if state.wishlist().contains(&id) {
        let outcome = state.wishlist().remove(&id);
        return report(outcome);
    }
    let product = state.api().product(&id).await?;
    let outcome = state.wishlist().toggle(&product);
    report(outcome)
}

/// Remove every saved product.
///
/// # Errors
///
/// Returns an error if the wishlist cannot be cleared.
pub fn clear(state: &AppState) -> Result<(), AppError> {
    let outcome = state.wishlist().clear();
    report(outcome)
}

#[allow(clippy::print_stdout)]
fn report(outcome: StoreOutcome) -> Result<(), AppError> {
    if outcome.success {
        println!("{}", outcome.message);
        Ok(())
    } else {
        Err(AppError::Wishlist(outcome.message))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use classic_carry_core::{Price, Product, ProductId};
    use classic_carry_storefront::config::StorefrontConfig;
    use classic_carry_storefront::storage::MemoryStore;

    use super::*;

    fn state() -> AppState {
        // The API is never reached in these tests.
        let config = StorefrontConfig::from_lookup(|key| {
            (key == "CC_API_URL").then(|| "http://127.0.0.1:9/api".to_string())
        })
        .unwrap();
        AppState::with_storage(config, Arc::new(MemoryStore::new())).unwrap()
    }

    #[tokio::test]
    async fn test_add_already_saved_product_fails() {
        let state = state();
        let tote = Product::new(ProductId::parse("p1").unwrap(), "Tote", Price::from_units(2500));
        assert!(state.wishlist().add(&tote).success);

        let err = add(&state, "p1").await.unwrap_err();
        assert!(matches!(&err, AppError::Wishlist(message) if message == ALREADY_PRESENT));
        assert_eq!(state.wishlist().count(), 1);
    }
}
