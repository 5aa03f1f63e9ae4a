//! Core types for Classic Carry.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod email;
pub mod id;
pub mod price;
pub mod pricing;
pub mod product;
pub mod status;
pub mod wishlist;

pub use cart::{CartLineItem, LineKey};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, format_amount};
pub use pricing::{CartTotals, Discount, DiscountType, PricingConfig, PricingError};
pub use product::{Product, VariantSelection};
pub use status::*;
pub use wishlist::{StoreOutcome, WishlistItem};
