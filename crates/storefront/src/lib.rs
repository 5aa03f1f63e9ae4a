//! Classic Carry Storefront library.
//!
//! Client-side building blocks for the shop: the cart and wishlist stores
//! over durable key/value storage, a typed client for the remote commerce
//! API, checkout assembly, settings synchronisation and a backend health
//! monitor.
//!
//! # Architecture
//!
//! - [`storage`] - `KeyValueStore` trait with in-memory and file backends
//! - [`cart`] / [`wishlist`] - synchronous stores that persist on every
//!   mutation and notify [`observers`]
//! - [`api`] - `reqwest` client for the commerce REST API (products cached
//!   with `moka`)
//! - [`state`] - composition root that owns one instance of everything

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod health;
pub mod images;
pub mod observers;
pub mod settings;
pub mod state;
pub mod storage;
pub mod wishlist;

pub use error::{AppError, Result};
