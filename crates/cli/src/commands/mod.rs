//! CLI command implementations.

pub mod cart;
pub mod serve;

use rocketshoes_storefront::catalog::CatalogError;
use rocketshoes_storefront::inventory::InventoryError;
use rocketshoes_storefront::storage::StorageError;
use rocketshoes_storefront::{CartError, NoticeKind};
use thiserror::Error;

/// Errors that end a command with a non-zero exit status.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Inventory client error: {0}")]
    Inventory(#[from] InventoryError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The operation ran but the cart was left unchanged.
    #[error("{0}")]
    NotApplied(NoticeKind),
}
