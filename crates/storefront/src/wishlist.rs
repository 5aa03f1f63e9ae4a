//! Wishlist store: products saved for later, no quantities or pricing.
//!
//! Every operation reports a [`StoreOutcome`] suitable for a toast
//! notification. Unlike the cart, a failed write is reported to the caller
//! and the in-memory list is rolled back to match storage.

use chrono::Utc;
use classic_carry_core::{Product, ProductId, StoreOutcome, WishlistItem};
use tracing::{error, warn};

use crate::observers::{Observers, Subscription};
use crate::storage::{KeyValueStore, SharedStore, WISHLIST_KEY, load_json_list, save_json};

const ADDED: &str = "Added to wishlist";
/// Message reported when a product is saved a second time.
pub const ALREADY_PRESENT: &str = "Already in wishlist";
const ADD_FAILED: &str = "Failed to add to wishlist";
const REMOVED: &str = "Removed from wishlist";
const REMOVE_FAILED: &str = "Failed to remove from wishlist";
const CLEARED: &str = "Wishlist cleared";
const CLEAR_FAILED: &str = "Failed to clear wishlist";

/// The shopper's wishlist.
pub struct WishlistStore {
    storage: SharedStore,
    items: Vec<WishlistItem>,
    observers: Observers<[WishlistItem]>,
}

impl std::fmt::Debug for WishlistStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WishlistStore")
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}

impl WishlistStore {
    /// Open the wishlist; unreadable storage yields an empty list.
    #[must_use]
    pub fn open(storage: SharedStore) -> Self {
        let items = read_items(&storage).unwrap_or_default();
        Self {
            storage,
            items,
            observers: Observers::new(),
        }
    }

    /// Save a product. Fails if it is already saved.
    pub fn add(&mut self, product: &Product) -> StoreOutcome {
        if self.contains(&product.id) {
            return StoreOutcome::failed(ALREADY_PRESENT);
        }

        self.items
            .push(WishlistItem::from_product(product, Utc::now()));
        if let Err(e) = save_json(self.storage.as_ref(), WISHLIST_KEY, &self.items) {
            error!(product_id = %product.id, error = %e, "Failed to add to wishlist");
            self.items.pop();
            return StoreOutcome::failed(ADD_FAILED);
        }

        self.observers.notify(&self.items);
        StoreOutcome::ok(ADDED)
    }

    /// Remove a product. Removing an absent product still succeeds.
    pub fn remove(&mut self, product_id: &ProductId) -> StoreOutcome {
        let previous = self.items.clone();
        self.items.retain(|item| &item.product_id != product_id);
        if let Err(e) = save_json(self.storage.as_ref(), WISHLIST_KEY, &self.items) {
            error!(product_id = %product_id, error = %e, "Failed to remove from wishlist");
            self.items = previous;
            return StoreOutcome::failed(REMOVE_FAILED);
        }

        self.observers.notify(&self.items);
        StoreOutcome::ok(REMOVED)
    }

    /// Remove the product if saved, otherwise save it.
    pub fn toggle(&mut self, product: &Product) -> StoreOutcome {
        if self.contains(&product.id) {
            self.remove(&product.id)
        } else {
            self.add(product)
        }
    }

    /// Forget every saved product.
    pub fn clear(&mut self) -> StoreOutcome {
        if let Err(e) = self.storage.remove(WISHLIST_KEY) {
            error!(error = %e, "Failed to clear wishlist");
            return StoreOutcome::failed(CLEAR_FAILED);
        }
        self.items.clear();
        self.observers.notify(&self.items);
        StoreOutcome::ok(CLEARED)
    }

    /// Re-read the wishlist from storage.
    pub fn reload(&mut self) {
        if let Some(items) = read_items(&self.storage) {
            self.items = items;
            self.observers.notify(&self.items);
        }
    }

    /// Register a callback run after every successful change.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&[WishlistItem]) + Send + Sync + 'static,
    {
        self.observers.subscribe(observer)
    }

    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.items.iter().any(|item| &item.product_id == product_id)
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn items(&self) -> &[WishlistItem] {
        &self.items
    }
}

fn read_items(storage: &SharedStore) -> Option<Vec<WishlistItem>> {
    match load_json_list::<WishlistItem>(storage.as_ref(), WISHLIST_KEY) {
        Ok(items) => Some(items),
        Err(e) => {
            warn!(error = %e, "Failed to read wishlist");
            None
        }
    }
}
