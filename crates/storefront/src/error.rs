//! Unified error handling.
//!
//! Provides a unified `AppError` type for operations that cross module
//! boundaries (the CLI, the composition root). Store operations never
//! return errors; everything else converts into `AppError` with `?`.

use classic_carry_core::{EmailError, IdError, PricingError};
use thiserror::Error;

use crate::api::ApiError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Reading or writing persisted state failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Commerce API operation failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Checkout could not be completed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Pricing values were rejected.
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    /// An email address was rejected.
    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    /// An identifier was rejected.
    #[error("Invalid id: {0}")]
    Id(#[from] IdError),

    /// A wishlist change could not be persisted.
    #[error("Wishlist error: {0}")]
    Wishlist(String),

    /// The commerce API did not answer the health probe.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Local I/O outside the storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Message suitable for showing to the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(err) => err.user_message(),
            Self::Checkout(err) => err.user_message(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::Wishlist(message) => message.clone(),
            Self::Unavailable(_) => "Backend unavailable. Please try again later".to_string(),
            Self::Email(_) => "Please enter a valid email address".to_string(),
            _ => crate::api::FALLBACK_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::NotFound("Product 42".to_string());
        assert_eq!(err.to_string(), "Not found: Product 42");
        assert_eq!(err.user_message(), "Product 42 not found");
    }

    #[test]
    fn test_from_api_error() {
        let err: AppError = ApiError::Api {
            status: 400,
            message: "Invalid coupon code".to_string(),
        }
        .into();
        assert!(matches!(err, AppError::Api(_)));
        assert_eq!(err.user_message(), "Invalid coupon code");
    }

    #[test]
    fn test_from_storage_error() {
        let err: AppError = StorageError::Unavailable("quota exceeded".to_string()).into();
        assert_eq!(err.to_string(), "Storage error: storage unavailable: quota exceeded");
        assert_eq!(err.user_message(), "Something went wrong");
    }

    #[test]
    fn test_wishlist_message_is_shown_as_is() {
        let err = AppError::Wishlist("Failed to add to wishlist".to_string());
        assert_eq!(err.user_message(), "Failed to add to wishlist");
    }
}
