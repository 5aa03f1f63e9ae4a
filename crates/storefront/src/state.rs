//! Application state shared across the client.
//!
//! `AppState` is the composition root: it owns exactly one cart store, one
//! wishlist store and one API client, all over the same storage backend.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use classic_carry_core::OrderNumber;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::api::{ApiClient, GeneralSettings, User};
use crate::cart::CartStore;
use crate::checkout::{self, AppliedCoupon, CheckoutForm};
use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::health::{HealthHandle, HealthMonitor};
use crate::settings;
use crate::storage::{FileStore, KeyValueStore, SharedStore, TOKEN_KEY, load_json, save_json};
use crate::wishlist::WishlistStore;

/// Application state shared across all consumers.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    storage: SharedStore,
    api: ApiClient,
    cart: Mutex<CartStore>,
    wishlist: Mutex<WishlistStore>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .field("api", &self.inner.api)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Open file-backed state under `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created or the HTTP
    /// client fails to build.
    pub fn open(config: StorefrontConfig) -> Result<Self> {
        let storage: SharedStore = Arc::new(FileStore::open(&config.data_dir)?);
        Self::with_storage(config, storage)
    }

    /// Build state over an arbitrary storage backend.
    ///
    /// A token persisted by an earlier login is used when the config has
    /// none.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn with_storage(config: StorefrontConfig, storage: SharedStore) -> Result<Self> {
        let token = config.api_token.clone().or_else(|| {
            load_json::<String>(storage.as_ref(), TOKEN_KEY)
                .unwrap_or_else(|e| {
                    warn!(error = %e, "Failed to read saved token");
                    None
                })
                .map(SecretString::from)
        });
        let api = ApiClient::new(&config.api_url, token)?;

        let cart = CartStore::open(Arc::clone(&storage)).with_config(config.pricing);
        let wishlist = WishlistStore::open(Arc::clone(&storage));
        debug!(lines = cart.len(), saved = wishlist.count(), "State opened");

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                storage,
                api,
                cart: Mutex::new(cart),
                wishlist: Mutex::new(wishlist),
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the commerce API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the storage backend.
    #[must_use]
    pub fn storage(&self) -> &SharedStore {
        &self.inner.storage
    }

    /// Lock the cart. Do not hold the guard across an `.await`.
    pub fn cart(&self) -> MutexGuard<'_, CartStore> {
        self.inner.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock the wishlist. Do not hold the guard across an `.await`.
    pub fn wishlist(&self) -> MutexGuard<'_, WishlistStore> {
        self.inner
            .wishlist
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the shop's pricing settings and apply them to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be fetched.
    pub async fn sync_settings(&self) -> Result<GeneralSettings> {
        Ok(settings::sync_pricing(&self.inner.api, &self.inner.cart).await?)
    }

    /// Log in and remember the token across runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let user = self.inner.api.login(email, password).await?;
        self.persist_token();
        Ok(user)
    }

    /// Forget the token, in memory and on disk.
    pub fn logout(&self) {
        self.inner.api.logout();
        if let Err(e) = self.inner.storage.remove(TOKEN_KEY) {
            warn!(error = %e, "Failed to remove saved token");
        }
    }

    fn persist_token(&self) {
        let Some(token) = self.inner.api.token() else {
            return;
        };
        if let Err(e) = save_json(self.inner.storage.as_ref(), TOKEN_KEY, token.expose_secret()) {
            warn!(error = %e, "Failed to save token");
        }
    }

    /// Submit the cart as an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the form is incomplete, the cart is empty or the
    /// API rejects the order.
    pub async fn place_order(
        &self,
        form: &CheckoutForm,
        coupon: Option<&AppliedCoupon>,
    ) -> Result<Option<OrderNumber>> {
        Ok(checkout::place_order(
            &self.inner.api,
            &self.inner.cart,
            self.inner.storage.as_ref(),
            form,
            coupon,
        )
        .await?)
    }

    /// Number of the last order placed from this device.
    #[must_use]
    pub fn last_order_number(&self) -> Option<OrderNumber> {
        checkout::last_order_number(self.inner.storage.as_ref())
    }

    /// Start the backend health monitor. Requires a tokio runtime.
    #[must_use]
    pub fn spawn_health_monitor(&self) -> HealthHandle {
        HealthMonitor::new(self.inner.api.clone(), self.inner.config.health).spawn()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use classic_carry_core::{Price, Product, ProductId, VariantSelection};

    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore};

    fn config() -> StorefrontConfig {
        StorefrontConfig::from_lookup(|_| None).unwrap()
    }

    fn product() -> Product {
        Product::new(ProductId::parse("p1").unwrap(), "Tote", Price::from_units(1000))
    }

    #[test]
    fn test_stores_share_storage() {
        let storage: SharedStore = Arc::new(MemoryStore::new());
        let state = AppState::with_storage(config(), Arc::clone(&storage)).unwrap();
        state.cart().add_item(&product(), VariantSelection::none());
        state.wishlist().add(&product());

        let reopened = AppState::with_storage(config(), storage).unwrap();
        assert_eq!(reopened.cart().len(), 1);
        assert_eq!(reopened.wishlist().count(), 1);
    }

    #[test]
    fn test_saved_token_is_loaded() {
        let storage: SharedStore = Arc::new(MemoryStore::new());
        storage.set(TOKEN_KEY, "\"saved-token\"").unwrap();
        let state = AppState::with_storage(config(), Arc::clone(&storage)).unwrap();
        assert!(state.api().has_token());

        state.logout();
        assert!(!state.api().has_token());
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_config_pricing_applied_to_cart() {
        let config = StorefrontConfig::from_lookup(|key| {
            (key == "CC_DELIVERY_FEE").then(|| "150".to_string())
        })
        .unwrap();
        let state = AppState::with_storage(config, Arc::new(MemoryStore::new())).unwrap();
        state.cart().add_item(&product(), VariantSelection::none());
        assert_eq!(state.cart().delivery_fee(), Price::from_units(150));
    }
}
