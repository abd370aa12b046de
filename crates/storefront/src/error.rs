//! Unified error handling for cart operations.
//!
//! Provides a `CartError` type covering every way a cart operation can stop
//! short of committing. Errors never reach the shopper directly: the store
//! classifies them at the operation boundary into a [`NoticeKind`].
//!
//! [`NoticeKind`]: crate::cart::NoticeKind

use rocketshoes_core::{CartInvariantError, ProductId};
use thiserror::Error;

use crate::inventory::InventoryError;
use crate::storage::StorageError;

/// Error type for cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Inventory lookup failed.
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),

    /// Reading or writing the persisted cart failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A mutation would break a cart invariant.
    #[error("Invariant violated: {0}")]
    Invariant(#[from] CartInvariantError),

    /// Not enough stock for the requested quantity.
    #[error("Requested {requested} of product {product_id}, {available} in stock")]
    StockExceeded {
        product_id: ProductId,
        requested: u64,
        available: u32,
    },

    /// The product has no line in the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(ProductId),
}

impl CartError {
    /// Whether this is the expected stock rejection rather than a failure.
    #[must_use]
    pub const fn is_stock_rejection(&self) -> bool {
        matches!(self, Self::StockExceeded { .. })
    }
}

impl From<serde_json::Error> for CartError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(StorageError::Encode(err))
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
