//! Integration tests for the Classic Carry storefront.
//!
//! The tests run the storefront library against an in-process mock of the
//! commerce API (an axum router bound to an ephemeral port) and against
//! real files under the system temp directory. Nothing external is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p classic-carry-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `api_client` - Envelope handling, auth header, normalisation, caching
//! - `cart_persistence` - Cart and wishlist state across restarts
//! - `checkout_flow` - Order submission against the mock API
//! - `settings_sync` - Delivery pricing sync and coupon validation

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::Router;
use classic_carry_storefront::config::StorefrontConfig;
use url::Url;

/// A mock commerce API serving `router` under `/api`.
#[derive(Debug)]
pub struct MockApi {
    addr: SocketAddr,
}

impl MockApi {
    /// Bind an ephemeral port and serve `router` in the background.
    ///
    /// Routes are nested under `/api`, so handlers use paths like
    /// `/products/{id}`.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    #[allow(clippy::unwrap_used)]
    pub async fn start(router: Router) -> Self {
        let app = Router::new().nest("/api", router);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr }
    }

    /// The API base URL, including the `/api` prefix.
    ///
    /// # Panics
    ///
    /// Never in practice: the address always forms a valid URL.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}/api", self.addr)).unwrap()
    }
}

/// A scratch directory removed on drop.
#[derive(Debug)]
pub struct TempDir(PathBuf);

impl TempDir {
    #[must_use]
    pub fn new() -> Self {
        Self(std::env::temp_dir().join(format!("cc-it-{}", uuid::Uuid::new_v4())))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl Default for TempDir {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

/// Config pointing at `api_url` and storing state under `data_dir`.
///
/// # Panics
///
/// Panics if the values are rejected, which would be a bug in the test.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn test_config(api_url: &Url, data_dir: &Path) -> StorefrontConfig {
    let api_url = api_url.to_string();
    let data_dir = data_dir.display().to_string();
    StorefrontConfig::from_lookup(|key| match key {
        "CC_API_URL" => Some(api_url.clone()),
        "CC_DATA_DIR" => Some(data_dir.clone()),
        _ => None,
    })
    .unwrap()
}

/// A product document the way the API returns it.
#[must_use]
pub fn product_json(id: &str, name: &str, price: u32) -> serde_json::Value {
    serde_json::json!({
        "_id": id,
        "name": name,
        "price": price,
        "mainImage": format!("/uploads/{id}.jpg"),
        "category": { "_id": "c1", "name": "Bags" },
        "colors": ["Black", "Tan"],
        "sizes": ["M", "L"],
        "stock": 5,
    })
}
