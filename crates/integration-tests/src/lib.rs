//! Integration tests for RocketShoes.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketshoes-integration-tests
//! ```
//!
//! Each test starts its own catalog server on an ephemeral port, so tests run
//! in parallel without any external services.
//!
//! # Test Categories
//!
//! - `cart_flow` - Cart operations against the HTTP inventory client
//! - `catalog_api` - Catalog server endpoints

use std::net::SocketAddr;
use std::sync::Arc;

use rocketshoes_core::ProductId;
use rocketshoes_storefront::cart::{ChannelSink, Notice};
use rocketshoes_storefront::catalog::{Catalog, CatalogState, router};
use rocketshoes_storefront::config::{DEFAULT_CART_KEY, InventoryConfig};
use rocketshoes_storefront::inventory::HttpInventoryClient;
use rocketshoes_storefront::storage::PersistentKv;
use rocketshoes_storefront::{CartError, CartStore};
use tokio::sync::mpsc;

/// Catalog used by the tests: two products, stock 5 and 1.
pub const TEST_DB: &str = r#"{
    "products": [
        {"id": 1, "title": "Tênis de Caminhada Leve Confortável", "price": 179.9, "image": "https://example.com/tenis1.jpg"},
        {"id": 2, "title": "Tênis VR Caminhada Confortável Detalhes Couro Masculino", "price": 139.9, "image": "https://example.com/tenis2.jpg"}
    ],
    "stock": [
        {"id": 1, "amount": 5},
        {"id": 2, "amount": 1}
    ]
}"#;

/// A running catalog server plus handles to steer it.
pub struct TestContext {
    pub client: reqwest::Client,
    pub base_url: String,
    pub catalog: CatalogState,
}

impl TestContext {
    /// Start a catalog server seeded with [`TEST_DB`].
    ///
    /// # Panics
    ///
    /// Panics if the catalog cannot be parsed or the server cannot bind.
    pub async fn new() -> Self {
        let catalog: Catalog = serde_json::from_str(TEST_DB).expect("Invalid test catalog");
        Self::with_catalog(catalog).await
    }

    /// Start a catalog server serving `catalog`.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot bind.
    pub async fn with_catalog(catalog: Catalog) -> Self {
        let state = CatalogState::new(catalog);
        let addr = spawn_catalog(state.clone()).await;

        Self {
            client: reqwest::Client::new(),
            base_url: format!("http://{addr}"),
            catalog: state,
        }
    }

    /// An inventory client pointed at this server.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn inventory(&self) -> HttpInventoryClient {
        let config = InventoryConfig::with_base_url(&self.base_url).expect("Invalid base URL");
        HttpInventoryClient::new(&config).expect("Failed to build inventory client")
    }

    /// Load a cart store over `storage` using the default key.
    ///
    /// Returns the receiver notices arrive on.
    ///
    /// # Errors
    ///
    /// Returns the load error, e.g. for a corrupt stored cart.
    pub fn store(
        &self,
        storage: Arc<dyn PersistentKv>,
    ) -> Result<(CartStore, mpsc::UnboundedReceiver<Notice>), CartError> {
        let (sink, notices) = ChannelSink::channel();
        let store = CartStore::load(
            DEFAULT_CART_KEY,
            Arc::new(self.inventory()),
            storage,
            Arc::new(sink),
        )?;
        Ok((store, notices))
    }

    /// Change a product's stock on the running server.
    pub async fn set_stock(&self, id: i32, amount: u32) {
        self.catalog.set_stock(ProductId::new(id), amount).await;
    }
}

/// Serve the catalog router on an ephemeral local port.
///
/// # Panics
///
/// Panics if the listener cannot bind.
pub async fn spawn_catalog(state: CatalogState) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");

    tokio::spawn(async move {
        axum::serve(listener, router(state))
            .await
            .expect("Catalog server error");
    });

    addr
}
