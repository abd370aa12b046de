//! Local catalog server for development and end-to-end tests.
//!
//! Serves the same API the cart expects from the inventory service, backed by
//! a json-server style `db.json`:
//!
//! ```json
//! {
//!   "products": [{ "id": 1, "title": "...", "price": 179.9, "image": "..." }],
//!   "stock": [{ "id": 1, "amount": 3 }]
//! }
//! ```
//!
//! # Route Structure
//!
//! ```text
//! GET  /health         - Health check
//! GET  /products/{id}  - Product metadata
//! GET  /stock/{id}     - { "id": n, "amount": n }
//! ```

use std::path::Path as FsPath;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use rocketshoes_core::{Product, ProductId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::instrument;

/// Errors loading a catalog file.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Stock level of one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEntry {
    pub id: ProductId,
    pub amount: u32,
}

/// Products and stock levels served by the catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub stock: Vec<StockEntry>,
}

impl Catalog {
    /// Read a catalog from a `db.json` file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid catalog.
    pub fn load(path: &FsPath) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }

    #[must_use]
    pub fn stock(&self, id: ProductId) -> Option<StockEntry> {
        self.stock.iter().find(|entry| entry.id == id).copied()
    }

    /// Set the stock level of a product, adding an entry if needed.
    pub fn set_stock(&mut self, id: ProductId, amount: u32) {
        match self.stock.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => entry.amount = amount,
            None => self.stock.push(StockEntry { id, amount }),
        }
    }
}

/// Shared, mutable catalog behind the server.
///
/// Cloning shares the same catalog, so tests can change stock while the
/// server is running.
#[derive(Debug, Clone, Default)]
pub struct CatalogState {
    inner: Arc<RwLock<Catalog>>,
}

impl CatalogState {
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self {
            inner: Arc::new(RwLock::new(catalog)),
        }
    }

    pub async fn set_stock(&self, id: ProductId, amount: u32) {
        self.inner.write().await.set_stock(id, amount);
    }

    /// Stop serving a product's metadata. Its stock entry is kept.
    pub async fn remove_product(&self, id: ProductId) {
        self.inner
            .write()
            .await
            .products
            .retain(|product| product.id != id);
    }
}

/// Create the catalog router.
pub fn router(state: CatalogState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/products/{id}", get(product))
        .route("/stock/{id}", get(stock))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Product metadata.
#[instrument(skip(state))]
async fn product(
    State(state): State<CatalogState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>, StatusCode> {
    let catalog = state.inner.read().await;
    catalog
        .product(id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// Stock level.
#[instrument(skip(state))]
async fn stock(
    State(state): State<CatalogState>,
    Path(id): Path<ProductId>,
) -> Result<Json<StockEntry>, StatusCode> {
    let catalog = state.inner.read().await;
    catalog.stock(id).map(Json).ok_or(StatusCode::NOT_FOUND)
}
