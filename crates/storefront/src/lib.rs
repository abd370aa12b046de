//! RocketShoes Storefront library.
//!
//! Cart state for the RocketShoes shop: stock-checked add/remove/update
//! operations, write-through persistence and the inventory API client.
//!
//! # Modules
//!
//! - [`cart`] - The cart store, its storage format and shopper notices
//! - [`inventory`] - Product and stock lookups
//! - [`storage`] - Durable key-value backends
//! - [`config`] - Environment configuration
//! - `catalog` - Local catalog server (feature `catalog-server`)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
#[cfg(feature = "catalog-server")]
pub mod catalog;
pub mod config;
pub mod error;
pub mod inventory;
pub mod storage;

pub use cart::{CartStore, Notice, NoticeKind, Outcome};
pub use error::CartError;
