//! Catalog types returned by the inventory service.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Price, ProductId};

/// Product metadata as served by the catalog.
///
/// The cart treats everything but `id` as opaque display data: missing display
/// fields default to empty, and fields the cart does not know are carried
/// through to storage unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub image: String,
    /// Other catalog fields, kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    /// Create a product with no extra fields.
    #[must_use]
    pub fn new(
        id: ProductId,
        title: impl Into<String>,
        price: Price,
        image: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            price,
            image: image.into(),
            extra: Map::new(),
        }
    }
}

/// Available quantity for a product at the moment it was fetched.
///
/// Stock is only meaningful within the operation that fetched it and is never
/// cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockInfo {
    pub product_id: ProductId,
    pub available: u32,
}

impl StockInfo {
    #[must_use]
    pub const fn new(product_id: ProductId, available: u32) -> Self {
        Self {
            product_id,
            available,
        }
    }

    /// Whether `quantity` units can be held in a cart.
    #[must_use]
    pub fn covers(&self, quantity: u64) -> bool {
        quantity <= u64::from(self.available)
    }
}
