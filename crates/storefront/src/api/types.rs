//! Request and response types for the commerce REST API.
//!
//! Products and categories arrive in a loose shape and are normalised in
//! `conversions`; everything here maps the wire format one-to-one.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use classic_carry_core::{
    Discount, DiscountType, OrderNumber, OrderStatus, PaymentMethod, PricingError, Product,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Envelope
// =============================================================================

/// Standard response wrapper: `{ success, data, message }`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

const fn default_success() -> bool {
    true
}

/// Body of an error response; only the message is used.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Catalog
// =============================================================================

/// Filters for the product listing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ProductQuery {
    /// Query string without the leading `?`; empty when no filter is set.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort", sort.clone()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }

        pairs
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// A product category, with its products when the endpoint embeds them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: classic_carry_core::CategoryId,
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
    pub description: Option<String>,
    pub is_featured: bool,
    pub products: Vec<Product>,
}

/// Homepage carousel slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroImage {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    pub image: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

// =============================================================================
// Settings
// =============================================================================

/// Shop-wide commercial settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneralSettings {
    pub currency: Option<String>,
    pub currency_symbol: Option<String>,
    pub shipping_fee: Option<Decimal>,
    pub free_shipping_threshold: Option<Decimal>,
    pub tax_rate: Option<Decimal>,
    pub order_prefix: Option<String>,
    #[serde(rename = "enableCOD")]
    pub enable_cod: Option<bool>,
    pub enable_online_payment: Option<bool>,
}

impl GeneralSettings {
    /// Symbol to render prices with, `Rs` when unset.
    #[must_use]
    pub fn symbol(&self) -> &str {
        self.currency_symbol
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("Rs")
    }

    /// Payment methods the shop currently accepts.
    #[must_use]
    pub fn payment_methods(&self) -> Vec<PaymentMethod> {
        let mut methods = Vec::new();
        if self.enable_cod.unwrap_or(true) {
            methods.push(PaymentMethod::Cod);
        }
        if self.enable_online_payment.unwrap_or(false) {
            methods.push(PaymentMethod::Online);
        }
        methods
    }
}

/// Theme settings. The storefront passes these through untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AppearanceSettings {
    #[serde(flatten)]
    pub values: BTreeMap<String, serde_json::Value>,
}

/// Public contact details shown in the footer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactSettings {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub whatsapp: Option<String>,
    pub instagram: Option<String>,
    pub tiktok: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faq {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    pub question: String,
    pub answer: String,
}

// =============================================================================
// Coupons
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ValidateCouponRequest<'a> {
    pub code: &'a str,
    pub order_total: Decimal,
}

/// A coupon accepted by the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponValidation {
    #[serde(default)]
    pub code: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
}

impl CouponValidation {
    /// The coupon's effect on an order.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::NegativeDiscount` if the server sent a
    /// negative value.
    pub fn discount(&self) -> Result<Discount, PricingError> {
        Discount::new(self.discount_type, self.discount_value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveCoupons {
    #[serde(default)]
    pub has_active_coupons: bool,
}

// =============================================================================
// Orders
// =============================================================================

/// Shipping and contact details on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCustomer {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub province: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub delivery_notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: classic_carry_core::ProductId,
    pub name: String,
    pub price: classic_carry_core::Price,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPricing {
    pub subtotal: classic_carry_core::Price,
    pub delivery_charge: classic_carry_core::Price,
    #[serde(default)]
    pub discount: classic_carry_core::Price,
    pub total: classic_carry_core::Price,
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub customer: OrderCustomer,
    pub items: Vec<OrderItem>,
    pub pricing: OrderPricing,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
}

/// An order as returned by the order endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    pub order_number: OrderNumber,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub pricing: Option<OrderPricing>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Order-creation response. The number shows up in one of three places
/// depending on the server version, and may be missing altogether.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateOrderResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub data: Option<CreatedOrderData>,
    #[serde(default)]
    pub order_number: Option<OrderNumber>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatedOrderData {
    #[serde(default)]
    pub order_number: Option<OrderNumber>,
    #[serde(default)]
    pub order: Option<NestedOrder>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NestedOrder {
    #[serde(default)]
    pub order_number: Option<OrderNumber>,
}

impl CreateOrderResponse {
    /// `data.orderNumber`, then `orderNumber`, then `data.order.orderNumber`.
    pub fn into_order_number(self) -> Option<OrderNumber> {
        let (direct, nested) = match self.data {
            Some(data) => (data.order_number, data.order.and_then(|o| o.order_number)),
            None => (None, None),
        };
        direct.or(self.order_number).or(nested)
    }
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// A registered shopper.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,
}

/// Login or registration result: the user plus their bearer token.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct AuthData {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(flatten)]
    pub user: User,
}

/// Fields a shopper may change on their profile.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

// =============================================================================
// Messaging
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub(crate) struct NewsletterRequest<'a> {
    pub email: &'a str,
}

/// Message sent through the contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_query_string() {
        assert_eq!(ProductQuery::default().to_query_string(), "");

        let query = ProductQuery {
            category: Some("hand bags".to_string()),
            limit: Some(1),
            ..ProductQuery::default()
        };
        assert_eq!(query.to_query_string(), "category=hand%20bags&limit=1");
    }

    #[test]
    fn test_order_number_lookup_order() {
        let nested: CreateOrderResponse =
            serde_json::from_str(r#"{"data":{"order":{"orderNumber":"CC-3"}}}"#).unwrap();
        assert_eq!(nested.into_order_number().unwrap().as_str(), "CC-3");

        let top: CreateOrderResponse =
            serde_json::from_str(r#"{"orderNumber":"CC-2","data":{"order":{"orderNumber":"CC-3"}}}"#)
                .unwrap();
        assert_eq!(top.into_order_number().unwrap().as_str(), "CC-2");

        let direct: CreateOrderResponse =
            serde_json::from_str(r#"{"orderNumber":"CC-2","data":{"orderNumber":"CC-1"}}"#).unwrap();
        assert_eq!(direct.into_order_number().unwrap().as_str(), "CC-1");

        let none: CreateOrderResponse = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert_eq!(none.success, Some(true));
        assert!(none.into_order_number().is_none());
    }

    #[test]
    fn test_general_settings_wire_names() {
        let settings: GeneralSettings = serde_json::from_str(
            r#"{"currencySymbol":"Rs","shippingFee":250,"freeShippingThreshold":"5000","enableCOD":true}"#,
        )
        .unwrap();
        assert_eq!(settings.shipping_fee, Some(Decimal::from(250)));
        assert_eq!(settings.free_shipping_threshold, Some(Decimal::from(5000)));
        assert_eq!(settings.payment_methods(), vec![PaymentMethod::Cod]);
        assert_eq!(GeneralSettings::default().symbol(), "Rs");
    }

    #[test]
    fn test_envelope_defaults() {
        let envelope: Envelope<Vec<Faq>> = serde_json::from_str(r#"{"data":[]}"#).unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.data.unwrap().len(), 0);
    }
}
