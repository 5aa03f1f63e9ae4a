//! Cart store: line items, derived totals and change notification.
//!
//! The store keeps the authoritative list in memory and writes it through to
//! storage after every mutation. Storage failures are logged and otherwise
//! ignored; the in-memory cart keeps working for the rest of the session.

use classic_carry_core::{
    CartLineItem, CartTotals, LineKey, Price, PricingConfig, Product, ProductId, VariantSelection,
};
use tracing::{debug, error, warn};

use crate::observers::{Observers, Subscription};
use crate::storage::{CART_KEY, SharedStore, load_json_list, save_json};

/// The shopper's cart.
pub struct CartStore {
    storage: SharedStore,
    key: String,
    items: Vec<CartLineItem>,
    config: PricingConfig,
    observers: Observers<[CartLineItem]>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.key)
            .field("items", &self.items)
            .field("config", &self.config)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Open the cart stored under the default key.
    ///
    /// A missing, unreadable or corrupt document yields an empty cart.
    #[must_use]
    pub fn open(storage: SharedStore) -> Self {
        Self::open_with_key(storage, CART_KEY)
    }

    /// Open a cart stored under a custom key.
    #[must_use]
    pub fn open_with_key(storage: SharedStore, key: impl Into<String>) -> Self {
        let key = key.into();
        let items = read_items(&storage, &key).unwrap_or_default();
        debug!(key = %key, lines = items.len(), "Cart loaded");
        Self {
            storage,
            key,
            items,
            config: PricingConfig::default(),
            observers: Observers::new(),
        }
    }

    /// Use a pricing config other than the default (builder style).
    #[must_use]
    pub fn with_config(mut self, config: PricingConfig) -> Self {
        self.config = config;
        self
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add one unit of `product` in the given variant.
    ///
    /// An existing line with the same product, color and size is
    /// incremented; otherwise a new line with quantity 1 is appended.
    pub fn add_item(&mut self, product: &Product, variant: VariantSelection) -> &[CartLineItem] {
        let key = LineKey::new(product.id.clone(), variant);
        if let Some(line) = self.items.iter_mut().find(|line| line.matches(&key)) {
            line.increment();
        } else {
            self.items
                .push(CartLineItem::from_product(product, key.variant));
        }
        self.commit();
        &self.items
    }

    /// Remove the line with exactly this product and variant.
    pub fn remove_item(&mut self, key: &LineKey) -> &[CartLineItem] {
        self.items.retain(|line| !line.matches(key));
        self.commit();
        &self.items
    }

    /// Remove every line for a product, whatever its variant.
    pub fn remove_product(&mut self, product_id: &ProductId) -> &[CartLineItem] {
        self.items.retain(|line| &line.product_id != product_id);
        self.commit();
        &self.items
    }

    /// Change the quantity of a line.
    ///
    /// Zero or negative removes the line. Otherwise the quantity becomes
    /// `max(1, floor(quantity))`; non-finite input counts as 1. Unknown keys
    /// leave the cart untouched.
    pub fn set_quantity(&mut self, key: &LineKey, quantity: f64) -> &[CartLineItem] {
        if !self.items.iter().any(|line| line.matches(key)) {
            debug!(product_id = %key.product_id, "set_quantity on missing line ignored");
            return &self.items;
        }
        if quantity <= 0.0 {
            return self.remove_item(key);
        }

        let quantity = clamp_quantity(quantity);
        if let Some(line) = self.items.iter_mut().find(|line| line.matches(key)) {
            line.set_quantity(quantity);
        }
        self.commit();
        &self.items
    }

    /// Replace the pricing config and tell observers so totals refresh.
    pub fn update_config(&mut self, config: PricingConfig) {
        self.config = config;
        self.observers.notify(&self.items);
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
        self.commit();
    }

    /// Re-read the cart from storage, picking up writes made elsewhere.
    ///
    /// On a read failure the in-memory cart is kept.
    pub fn reload(&mut self) {
        if let Some(items) = read_items(&self.storage, &self.key) {
            self.items = items;
            self.observers.notify(&self.items);
        }
    }

    /// Register a callback run with the current lines after every change.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&[CartLineItem]) + Send + Sync + 'static,
    {
        self.observers.subscribe(observer)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub const fn config(&self) -> PricingConfig {
        self.config
    }

    /// Find the line for a product and variant.
    #[must_use]
    pub fn line(&self, key: &LineKey) -> Option<&CartLineItem> {
        self.items.iter().find(|line| line.matches(key))
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_item_count(&self) -> u32 {
        self.totals().item_count
    }

    /// Sum of `unit_price × quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.totals().subtotal
    }

    /// Delivery fee owed; zero for an empty cart or at/above the threshold.
    #[must_use]
    pub fn delivery_fee(&self) -> Price {
        self.totals().delivery_fee
    }

    #[must_use]
    pub fn qualifies_for_free_delivery(&self) -> bool {
        self.config.qualifies_for_free_delivery(self.subtotal())
    }

    /// Subtotal plus delivery fee.
    #[must_use]
    pub fn total(&self) -> Price {
        self.totals().total
    }

    /// All derived figures at once.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        CartTotals::compute(&self.items, &self.config)
    }

    fn commit(&self) {
        if let Err(e) = save_json(self.storage.as_ref(), &self.key, &self.items) {
            error!(key = %self.key, error = %e, "Failed to save cart, keeping in-memory state");
        }
        self.observers.notify(&self.items);
    }
}

fn read_items(storage: &SharedStore, key: &str) -> Option<Vec<CartLineItem>> {
    match load_json_list::<CartLineItem>(storage.as_ref(), key) {
        Ok(items) => Some(items),
        Err(e) => {
            warn!(key = %key, error = %e, "Failed to load cart");
            None
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Clamped to the u32 range first
fn clamp_quantity(quantity: f64) -> u32 {
    if !quantity.is_finite() {
        return 1;
    }
    let floored = quantity.floor().clamp(1.0, f64::from(u32::MAX));
    floored as u32
}
