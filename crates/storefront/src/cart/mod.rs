//! Shopper cart state.
//!
//! # Architecture
//!
//! - [`CartStore`] owns the cart and is the only way to change it
//! - Every change is checked against live stock, then written through to
//!   [`PersistentKv`](crate::storage::PersistentKv) before it becomes visible
//! - Consumers read with [`CartStore::cart`] or watch with [`CartStore::subscribe`]
//! - Failures become [`Notice`]s delivered to a [`NotificationSink`]
//!
//! # Example
//!
//! ```rust,ignore
//! use rocketshoes_storefront::cart::{CartStore, LogSink};
//!
//! let store = CartStore::load(&config.storage.cart_key, inventory, storage, Arc::new(LogSink))?;
//!
//! store.add_product(ProductId::new(1)).await;
//! store.update_product_amount(ProductId::new(1), 3).await;
//! store.remove_product(ProductId::new(1)).await;
//! ```

mod notify;
pub mod snapshot;
mod store;

pub use notify::{ChannelSink, LogSink, Notice, NoticeKind, NotificationSink};
pub use store::{CartStore, Outcome};
