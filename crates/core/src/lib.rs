//! Classic Carry Core - Shared types library.
//!
//! This crate provides common types used across all Classic Carry components:
//! - `storefront` - Cart, wishlist, API client and checkout library
//! - `cli` - Command-line front end over the storefront library
//!
//! # Architecture
//!
//! The core crate contains only types and pure arithmetic - no I/O, no
//! storage access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, emails, products, cart lines, pricing
//!   rules and wishlist entries

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
