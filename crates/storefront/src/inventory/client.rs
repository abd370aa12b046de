//! REST client for the inventory service.
//!
//! Uses `reqwest` for HTTP and caches product metadata with `moka`.

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use rocketshoes_core::{Product, ProductId, StockInfo};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{Inventory, InventoryError};
use crate::config::InventoryConfig;

/// Body of `GET /stock/{id}`.
#[derive(Debug, Deserialize)]
struct StockResponse {
    amount: u64,
}

impl StockResponse {
    /// Units on hand, saturated to the largest quantity a cart line can hold.
    fn available(&self) -> u32 {
        u32::try_from(self.amount).unwrap_or(u32::MAX)
    }
}

/// Client for the inventory REST API.
///
/// Cheaply cloneable; clones share the connection pool and product cache.
#[derive(Clone)]
pub struct HttpInventoryClient {
    inner: Arc<HttpInventoryClientInner>,
}

struct HttpInventoryClientInner {
    client: reqwest::Client,
    base_url: Url,
    products: Cache<ProductId, Product>,
}

impl HttpInventoryClient {
    /// Create a new inventory client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &InventoryConfig) -> Result<Self, InventoryError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let products = Cache::builder()
            .max_capacity(config.product_cache_capacity)
            .time_to_live(config.product_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(HttpInventoryClientInner {
                client,
                base_url: config.base_url.clone(),
                products,
            }),
        })
    }

    /// Build the URL of a resource, e.g. `stock/3`.
    fn resource_url(&self, resource: &str, product_id: ProductId) -> Result<Url, url::ParseError> {
        self.inner
            .base_url
            .join(&format!("{resource}/{product_id}"))
    }

    /// Fetch and decode a JSON resource.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, InventoryError> {
        let response = self.inner.client.get(url.clone()).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(InventoryError::RateLimited(retry_after));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(InventoryError::NotFound(url.path().to_string()));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                url = %url,
                body = %response_text.chars().take(500).collect::<String>(),
                "Inventory API returned non-success status"
            );
            return Err(InventoryError::Api {
                status: status.as_u16(),
                message: response_text.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                url = %url,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse inventory API response"
            );
            InventoryError::Parse(e)
        })
    }
}

#[async_trait]
impl Inventory for HttpInventoryClient {
    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn stock(&self, product_id: ProductId) -> Result<StockInfo, InventoryError> {
        let url = self.resource_url("stock", product_id)?;
        let stock: StockResponse = self.get_json(url).await?;
        debug!(available = stock.amount, "Fetched stock");
        Ok(StockInfo::new(product_id, stock.available()))
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn product(&self, product_id: ProductId) -> Result<Product, InventoryError> {
        if let Some(product) = self.inner.products.get(&product_id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let url = self.resource_url("products", product_id)?;
        let product: Product = self.get_json(url).await?;
        if product.id != product_id {
            return Err(InventoryError::Mismatch {
                requested: product_id,
                returned: product.id,
            });
        }

        self.inner
            .products
            .insert(product_id, product.clone())
            .await;

        Ok(product)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> HttpInventoryClient {
        HttpInventoryClient::new(&InventoryConfig::with_base_url(base_url).unwrap()).unwrap()
    }

    #[test]
    fn test_resource_url() {
        let client = client("http://localhost:3333");
        let url = client.resource_url("stock", ProductId::new(5)).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3333/stock/5");
    }

    #[test]
    fn test_resource_url_with_prefix() {
        let client = client("https://api.example.com/shop/");
        let url = client.resource_url("products", ProductId::new(12)).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/shop/products/12");
    }

    #[test]
    fn test_stock_response_shape() {
        let stock: StockResponse = serde_json::from_str(r#"{"id": 3, "amount": 4}"#).unwrap();
        assert_eq!(stock.available(), 4);
        assert!(serde_json::from_str::<StockResponse>(r#"{"amount": -1}"#).is_err());
    }

    #[test]
    fn test_huge_stock_saturates() {
        let stock: StockResponse = serde_json::from_str(r#"{"amount": 10000000000}"#).unwrap();
        assert_eq!(stock.available(), u32::MAX);
    }
}
