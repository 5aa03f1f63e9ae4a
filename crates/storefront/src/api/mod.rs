//! Client for the Classic Carry commerce REST API.
//!
//! # Architecture
//!
//! - Plain JSON over `reqwest`; every response is wrapped in
//!   `{ success, data, message }`
//! - Products and categories are normalised into core types at this
//!   boundary (see `conversions`)
//! - In-memory caching via `moka` for catalog responses (5 minute TTL)
//! - The bearer token lives inside the client and is attached to every
//!   request once set
//!
//! # Example
//!
//! ```rust,ignore
//! use classic_carry_storefront::api::{ApiClient, ProductQuery};
//!
//! let api = ApiClient::from_config(&config)?;
//! let hot = api.hot_products().await?;
//! let bags = api.products(&ProductQuery { category: Some("bags".into()), ..Default::default() }).await?;
//! ```

mod cache;
mod conversions;
pub mod types;

pub use types::*;

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use classic_carry_core::{Email, OrderNumber, Price, Product, ProductId};
use moka::future::Cache;
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::StorefrontConfig;
use cache::{CacheKey, CacheValue};
use conversions::{
    RawCategory, RawProduct, convert_categories, convert_category, convert_product,
    convert_products,
};

/// Message used when an error response carries none of its own.
pub const FALLBACK_ERROR_MESSAGE: &str = "Something went wrong";

/// Errors that can occur when talking to the commerce API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// API answered 2xx but flagged the request as unsuccessful.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response envelope had no `data`.
    #[error("Missing data in response from {0}")]
    MissingData(String),

    /// Product payload lacked an id, name or price.
    #[error("Invalid product: {0}")]
    InvalidProduct(String),

    /// Category payload lacked an id or name.
    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    /// Token cannot be sent as a header value.
    #[error("Invalid API token")]
    InvalidToken,
}

impl ApiError {
    /// Message suitable for showing to the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } | Self::Rejected(message) => message.clone(),
            _ => FALLBACK_ERROR_MESSAGE.to_string(),
        }
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the commerce API.
///
/// Cheap to clone; clones share the HTTP pool, token and cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    token: RwLock<Option<SecretString>>,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("token", &self.has_token().then_some("[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for the API rooted at `base_url` (e.g.
    /// `http://localhost:5000/api`).
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(base_url: &Url, token: Option<SecretString>) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: base_url.as_str().trim_end_matches('/').to_string(),
                token: RwLock::new(token),
                cache,
            }),
        })
    }

    /// Create a client from the storefront configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn from_config(config: &StorefrontConfig) -> Result<Self, ApiError> {
        Self::new(&config.api_url, config.api_token.clone())
    }

    /// API base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Replace (or drop) the bearer token.
    pub fn set_token(&self, token: Option<SecretString>) {
        *self
            .inner
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// Returns `true` if requests are authenticated.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// The current bearer token, if any.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drop every cached catalog response.
    pub fn invalidate_cache(&self) {
        self.inner.cache.invalidate_all();
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    fn bearer(&self) -> Result<Option<HeaderValue>, ApiError> {
        let guard = self
            .inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        guard
            .as_ref()
            .map(|token| {
                let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                    .map_err(|_| ApiError::InvalidToken)?;
                value.set_sensitive(true);
                Ok(value)
            })
            .transpose()
    }

    /// Send a request and decode the JSON body.
    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError> {
        let mut request = self.inner.client.request(method, self.url(path));
        if let Some(value) = self.bearer()? {
            request = request.header(reqwest::header::AUTHORIZATION, value);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|b| b.message)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string());
            tracing::warn!(
                status = %status,
                path = %path,
                message = %message,
                "Commerce API returned non-success status"
            );
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                path = %path,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to parse commerce API response"
            );
            ApiError::Parse(e)
        })
    }

    /// Send a request and unwrap the envelope's `data`.
    async fn data<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError> {
        let envelope: Envelope<T> = self.execute(method, path, body).await?;
        if !envelope.success {
            return Err(ApiError::Rejected(
                envelope
                    .message
                    .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string()),
            ));
        }
        envelope
            .data
            .ok_or_else(|| ApiError::MissingData(path.to_string()))
    }

    async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.data(Method::GET, path, None).await
    }

    async fn send_data<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        self.data(method, path, Some(body)).await
    }

    /// Quick reachability probe: `GET /products?limit=1` under `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error on timeout, connection failure or non-2xx status.
    pub async fn probe(&self, timeout: Duration) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .get(self.url("/products?limit=1"))
            .timeout(timeout)
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::Api {
                status: status.as_u16(),
                message: FALLBACK_ERROR_MESSAGE.to_string(),
            })
        }
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    async fn cached_products(&self, key: CacheKey, path: &str) -> Result<Vec<Product>, ApiError> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let raw: Vec<RawProduct> = self.get_data(path).await?;
        let products = convert_products(raw);
        self.inner
            .cache
            .insert(key, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// List products matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiError> {
        let query_string = query.to_query_string();
        let path = if query_string.is_empty() {
            "/products".to_string()
        } else {
            format!("/products?{query_string}")
        };
        self.cached_products(CacheKey::Products { query: query_string }, &path)
            .await
    }

    /// Products flagged as hot.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn hot_products(&self) -> Result<Vec<Product>, ApiError> {
        self.cached_products(CacheKey::HotProducts, "/products/hot")
            .await
    }

    /// Products in the category with `slug`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products_by_category(&self, slug: &str) -> Result<Vec<Product>, ApiError> {
        let path = format!("/products/category/{}", urlencoding::encode(slug));
        self.cached_products(CacheKey::CategoryProducts(slug.to_string()), &path)
            .await
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the product payload is
    /// incomplete.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(id.to_string());
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let path = format!("/products/{}", urlencoding::encode(id.as_str()));
        let raw: RawProduct = self.get_data(&path).await?;
        let product = convert_product(raw)?;
        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// Categories used by a product type (e.g. `bags`).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn product_categories(&self, product_type: &str) -> Result<Vec<Category>, ApiError> {
        let path = format!("/products/categories/{}", urlencoding::encode(product_type));
        let raw: Vec<RawCategory> = self.get_data(&path).await?;
        Ok(convert_categories(raw))
    }

    // =========================================================================
    // Category Methods
    // =========================================================================

    async fn cached_categories(
        &self,
        key: CacheKey,
        path: &str,
    ) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let raw: Vec<RawCategory> = self.get_data(path).await?;
        let categories = convert_categories(raw);
        self.inner
            .cache
            .insert(key, CacheValue::Categories(categories.clone()))
            .await;
        Ok(categories)
    }

    /// All categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        self.cached_categories(
            CacheKey::Categories {
                query: String::new(),
            },
            "/categories",
        )
        .await
    }

    /// Categories flagged as featured.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn featured_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.cached_categories(
            CacheKey::Categories {
                query: "isFeatured=true".to_string(),
            },
            "/categories?isFeatured=true",
        )
        .await
    }

    /// Featured categories with their products embedded.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn featured_categories_with_products(&self) -> Result<Vec<Category>, ApiError> {
        self.cached_categories(
            CacheKey::FeaturedWithProducts,
            "/categories/featured/with-products",
        )
        .await
    }

    /// Get a category by slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is incomplete.
    #[instrument(skip(self))]
    pub async fn category(&self, slug: &str) -> Result<Category, ApiError> {
        let key = CacheKey::Category(slug.to_string());
        if let Some(CacheValue::Category(category)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for category");
            return Ok(*category);
        }

        let path = format!("/categories/{}", urlencoding::encode(slug));
        let raw: RawCategory = self.get_data(&path).await?;
        let category = convert_category(raw)?;
        self.inner
            .cache
            .insert(key, CacheValue::Category(Box::new(category.clone())))
            .await;
        Ok(category)
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// Submit an order and return its number, if the server reported one.
    ///
    /// A 2xx response counts as accepted unless it carries `success: false`.
    /// `Ok(None)` means the order exists but the response named no number.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server declines the order.
    #[instrument(skip(self, order), fields(items = order.items.len()))]
    pub async fn create_order(
        &self,
        order: &OrderRequest,
    ) -> Result<Option<OrderNumber>, ApiError> {
        let body = serde_json::to_value(order)?;
        let response: CreateOrderResponse = self.execute(Method::POST, "/orders", Some(body)).await?;
        if response.success == Some(false) {
            return Err(ApiError::Rejected(
                response
                    .message
                    .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string()),
            ));
        }
        let number = response.into_order_number();
        if number.is_none() {
            tracing::warn!("Order accepted without an order number");
        }
        Ok(number)
    }

    /// Look up an order by number.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn order(&self, order_number: &OrderNumber) -> Result<Order, ApiError> {
        let path = format!("/orders/{}", urlencoding::encode(order_number.as_str()));
        self.get_data(&path).await
    }

    /// Orders placed by the authenticated shopper.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn my_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get_data("/orders/myorders").await
    }

    // =========================================================================
    // User Methods
    // =========================================================================

    fn remember_token(&self, auth: &AuthData) {
        if let Some(token) = auth.token.as_deref().filter(|t| !t.is_empty()) {
            self.set_token(Some(SecretString::from(token.to_string())));
        }
    }

    /// Create an account. A returned token is kept for later requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, ApiError> {
        let auth: AuthData = self
            .send_data(Method::POST, "/users/register", request)
            .await?;
        self.remember_token(&auth);
        Ok(auth.user)
    }

    /// Log in and keep the returned token for later requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the request fails.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let auth: AuthData = self
            .send_data(Method::POST, "/users/login", &LoginRequest { email, password })
            .await?;
        self.remember_token(&auth);
        Ok(auth.user)
    }

    /// Forget the token. Purely local; the API has no logout endpoint.
    pub fn logout(&self) {
        self.set_token(None);
    }

    /// The authenticated shopper's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<User, ApiError> {
        self.get_data("/users/profile").await
    }

    /// Update the authenticated shopper's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        self.send_data(Method::PUT, "/users/profile", update).await
    }

    // =========================================================================
    // Coupon Methods
    // =========================================================================

    /// Ask the server whether `code` applies to an order of `order_total`.
    ///
    /// # Errors
    ///
    /// Returns an error if the coupon is rejected or the request fails.
    #[instrument(skip(self))]
    pub async fn validate_coupon(
        &self,
        code: &str,
        order_total: Price,
    ) -> Result<CouponValidation, ApiError> {
        let request = ValidateCouponRequest {
            code: code.trim(),
            order_total: order_total.amount(),
        };
        self.send_data(Method::POST, "/coupons/validate", &request)
            .await
    }

    /// Whether any coupon is currently active (controls the coupon field).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn has_active_coupons(&self) -> Result<bool, ApiError> {
        let active: ActiveCoupons = self.get_data("/coupons/check-active").await?;
        Ok(active.has_active_coupons)
    }

    // =========================================================================
    // Settings Methods
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn general_settings(&self) -> Result<GeneralSettings, ApiError> {
        self.get_data("/settings/general").await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn appearance_settings(&self) -> Result<AppearanceSettings, ApiError> {
        self.get_data("/settings/appearance").await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn contact_settings(&self) -> Result<ContactSettings, ApiError> {
        self.get_data("/settings/contact").await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn faqs(&self) -> Result<Vec<Faq>, ApiError> {
        self.get_data("/settings/faqs").await
    }

    // =========================================================================
    // Content & Messaging Methods
    // =========================================================================

    /// Homepage carousel images.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn hero_images(&self) -> Result<Vec<HeroImage>, ApiError> {
        self.get_data("/hero-images").await
    }

    /// Subscribe an address to the newsletter.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn subscribe_newsletter(&self, email: &Email) -> Result<(), ApiError> {
        let body = serde_json::to_value(NewsletterRequest {
            email: email.as_str(),
        })?;
        let envelope: Envelope<serde_json::Value> = self
            .execute(Method::POST, "/newsletter/subscribe", Some(body))
            .await?;
        accept(envelope)
    }

    /// Send a contact-form message.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, message), fields(email = %message.email))]
    pub async fn send_contact_message(&self, message: &ContactMessage) -> Result<(), ApiError> {
        let body = serde_json::to_value(message)?;
        let envelope: Envelope<serde_json::Value> =
            self.execute(Method::POST, "/contacts", Some(body)).await?;
        accept(envelope)
    }
}

/// Treat an envelope without meaningful data as a plain acknowledgement.
fn accept(envelope: Envelope<serde_json::Value>) -> Result<(), ApiError> {
    if envelope.success {
        Ok(())
    } else {
        Err(ApiError::Rejected(
            envelope
                .message
                .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string()),
        ))
    }
}
