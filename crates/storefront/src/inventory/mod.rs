//! Product and stock lookups against the inventory service.
//!
//! # Architecture
//!
//! - [`Inventory`] is the seam the cart store talks to; tests swap in stubs
//! - [`HttpInventoryClient`] calls the REST API with `reqwest`
//! - Product metadata is cached in memory via `moka`; stock never is
//!
//! # API
//!
//! - `GET {base}/products/{id}` - product metadata (`id`, `title`, `price`, `image`)
//! - `GET {base}/stock/{id}` - `{ "amount": n }`
//!
//! # Example
//!
//! ```rust,ignore
//! use rocketshoes_storefront::inventory::{HttpInventoryClient, Inventory};
//!
//! let client = HttpInventoryClient::new(&config.inventory)?;
//! let stock = client.stock(ProductId::new(1)).await?;
//! if stock.covers(2) {
//!     let product = client.product(ProductId::new(1)).await?;
//! }
//! ```

mod client;

pub use client::HttpInventoryClient;

use async_trait::async_trait;
use rocketshoes_core::{Product, ProductId, StockInfo};
use thiserror::Error;

/// Errors that can occur when talking to the inventory service.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The API answered with a different product than requested.
    #[error("Requested product {requested}, API returned {returned}")]
    Mismatch {
        requested: ProductId,
        returned: ProductId,
    },

    /// Request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Remote source of product metadata and stock levels.
#[async_trait]
pub trait Inventory: Send + Sync {
    /// Fetch the current stock level of a product.
    async fn stock(&self, product_id: ProductId) -> Result<StockInfo, InventoryError>;

    /// Fetch display metadata for a product.
    async fn product(&self, product_id: ProductId) -> Result<Product, InventoryError>;
}
