//! Integration tests for cart operations over HTTP.
//!
//! Each test runs the catalog server in-process and drives a `CartStore`
//! through the real `HttpInventoryClient`.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use rocketshoes_core::ProductId;
use rocketshoes_integration_tests::TestContext;
use rocketshoes_storefront::catalog::Catalog;
use rocketshoes_storefront::config::DEFAULT_CART_KEY;
use rocketshoes_storefront::storage::{FileStorage, MemoryStorage, PersistentKv, StorageError};
use rocketshoes_storefront::{CartError, Notice, NoticeKind, Outcome};

const SHOE: ProductId = ProductId::new(1);
const SANDAL: ProductId = ProductId::new(2);

// ============================================================================
// Walkthrough
// ============================================================================

#[tokio::test]
async fn test_add_update_remove_walkthrough() {
    let ctx = TestContext::new().await;
    let (store, mut notices) = ctx.store(Arc::new(MemoryStorage::new())).unwrap();

    assert_eq!(store.add_product(SHOE).await, Outcome::Committed);
    let cart = store.cart();
    assert_eq!(cart.len(), 1);
    assert_eq!(cart.quantity_of(SHOE), 1);
    assert_eq!(
        cart.get(SHOE).unwrap().product.title,
        "Tênis de Caminhada Leve Confortável"
    );

    assert_eq!(store.add_product(SHOE).await, Outcome::Committed);
    assert_eq!(store.cart().quantity_of(SHOE), 2);

    assert_eq!(
        store.update_product_amount(SHOE, 10).await,
        Outcome::Rejected(NoticeKind::StockExceeded)
    );
    assert_eq!(store.cart().quantity_of(SHOE), 2);
    assert_eq!(
        notices.try_recv().unwrap(),
        Notice::new(NoticeKind::StockExceeded, SHOE)
    );

    assert_eq!(store.remove_product(SHOE).await, Outcome::Committed);
    assert!(store.cart().is_empty());
    assert!(notices.try_recv().is_err());
}

#[tokio::test]
async fn test_add_stops_at_available_stock() {
    let ctx = TestContext::new().await;
    let (store, mut notices) = ctx.store(Arc::new(MemoryStorage::new())).unwrap();

    assert_eq!(store.add_product(SANDAL).await, Outcome::Committed);
    assert_eq!(
        store.add_product(SANDAL).await,
        Outcome::Rejected(NoticeKind::StockExceeded)
    );
    assert_eq!(store.cart().quantity_of(SANDAL), 1);
    assert_eq!(notices.try_recv().unwrap().kind, NoticeKind::StockExceeded);
}

// ============================================================================
// Live Stock
// ============================================================================

#[tokio::test]
async fn test_stock_is_read_on_every_operation() {
    let ctx = TestContext::new().await;
    let (store, _notices) = ctx.store(Arc::new(MemoryStorage::new())).unwrap();

    assert_eq!(store.add_product(SHOE).await, Outcome::Committed);

    ctx.set_stock(1, 1).await;
    assert_eq!(
        store.add_product(SHOE).await,
        Outcome::Rejected(NoticeKind::StockExceeded)
    );

    ctx.set_stock(1, 8).await;
    assert_eq!(store.update_product_amount(SHOE, 8).await, Outcome::Committed);
    assert_eq!(store.cart().quantity_of(SHOE), 8);
}

#[tokio::test]
async fn test_zero_stock_blocks_first_add() {
    let ctx = TestContext::new().await;
    ctx.set_stock(2, 0).await;
    let (store, mut notices) = ctx.store(Arc::new(MemoryStorage::new())).unwrap();

    assert_eq!(
        store.add_product(SANDAL).await,
        Outcome::Rejected(NoticeKind::StockExceeded)
    );
    assert!(store.cart().is_empty());
    assert_eq!(notices.try_recv().unwrap().kind, NoticeKind::StockExceeded);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_unknown_product_fails_add() {
    let ctx = TestContext::new().await;
    let (store, mut notices) = ctx.store(Arc::new(MemoryStorage::new())).unwrap();

    let unknown = ProductId::new(99);
    assert_eq!(
        store.add_product(unknown).await,
        Outcome::Failed(NoticeKind::AddFailed)
    );
    assert!(store.cart().is_empty());
    assert_eq!(
        notices.try_recv().unwrap(),
        Notice::new(NoticeKind::AddFailed, unknown)
    );
}

#[tokio::test]
async fn test_product_without_metadata_fails_add() {
    let ctx = TestContext::new().await;
    ctx.set_stock(7, 4).await;
    let (store, mut notices) = ctx.store(Arc::new(MemoryStorage::new())).unwrap();

    assert_eq!(
        store.add_product(ProductId::new(7)).await,
        Outcome::Failed(NoticeKind::AddFailed)
    );
    assert!(store.cart().is_empty());
    assert_eq!(notices.try_recv().unwrap().kind, NoticeKind::AddFailed);
}

#[tokio::test]
async fn test_remove_and_update_absent_product() {
    let ctx = TestContext::new().await;
    let (store, mut notices) = ctx.store(Arc::new(MemoryStorage::new())).unwrap();

    assert_eq!(
        store.remove_product(SHOE).await,
        Outcome::Failed(NoticeKind::RemoveFailed)
    );
    assert_eq!(
        store.update_product_amount(SHOE, 2).await,
        Outcome::Failed(NoticeKind::UpdateFailed)
    );
    assert_eq!(store.update_product_amount(SHOE, 0).await, Outcome::Ignored);

    assert_eq!(notices.try_recv().unwrap().kind, NoticeKind::RemoveFailed);
    assert_eq!(notices.try_recv().unwrap().kind, NoticeKind::UpdateFailed);
    assert!(notices.try_recv().is_err());
}

#[tokio::test]
async fn test_unreachable_inventory_fails_without_change() {
    let ctx = TestContext::new().await;
    let storage = Arc::new(MemoryStorage::new());
    let (store, _notices) = ctx.store(storage.clone()).unwrap();
    assert_eq!(store.add_product(SHOE).await, Outcome::Committed);
    let stored = storage.get(DEFAULT_CART_KEY).unwrap();

    // Same storage, inventory pointed at a server that has gone away
    let gone = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let offline = TestContext {
        client: reqwest::Client::new(),
        base_url: format!("http://{gone}"),
        catalog: ctx.catalog.clone(),
    };
    let (store, mut notices) = offline.store(storage.clone()).unwrap();

    assert_eq!(
        store.add_product(SHOE).await,
        Outcome::Failed(NoticeKind::AddFailed)
    );
    assert_eq!(store.cart().quantity_of(SHOE), 1);
    assert_eq!(storage.get(DEFAULT_CART_KEY).unwrap(), stored);
    assert_eq!(notices.try_recv().unwrap().kind, NoticeKind::AddFailed);
}

#[tokio::test]
async fn test_sparse_product_metadata_is_added_and_kept() {
    let catalog: Catalog = serde_json::from_str(
        r#"{
            "products": [{"id": 5, "title": "Chinelo", "price": 49.9, "brand": "Rocket"}],
            "stock": [{"id": 5, "amount": 2}]
        }"#,
    )
    .unwrap();
    let ctx = TestContext::with_catalog(catalog).await;
    let storage = Arc::new(MemoryStorage::new());
    let (store, _notices) = ctx.store(storage.clone()).unwrap();

    let id = ProductId::new(5);
    assert_eq!(store.add_product(id).await, Outcome::Committed);
    let item = store.cart().get(id).unwrap().clone();
    assert!(item.product.image.is_empty());
    assert_eq!(item.product.extra["brand"], "Rocket");

    let raw = storage.get(DEFAULT_CART_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["items"][0]["brand"], "Rocket");
}

// ============================================================================
// Product Cache
// ============================================================================

#[tokio::test]
async fn test_product_metadata_is_cached_by_client() {
    let ctx = TestContext::new().await;
    let (store, _notices) = ctx.store(Arc::new(MemoryStorage::new())).unwrap();

    assert_eq!(store.add_product(SHOE).await, Outcome::Committed);
    assert_eq!(store.remove_product(SHOE).await, Outcome::Committed);

    // Metadata is gone from the server, but the client still has it
    ctx.catalog.remove_product(SHOE).await;
    assert_eq!(store.add_product(SHOE).await, Outcome::Committed);
    assert_eq!(store.cart().quantity_of(SHOE), 1);
}

// ============================================================================
// Persistence
// ============================================================================

#[tokio::test]
async fn test_cart_survives_restart_on_disk() {
    let ctx = TestContext::new().await;
    let dir = tempfile::tempdir().unwrap();

    {
        let (store, _notices) = ctx.store(Arc::new(FileStorage::new(dir.path()))).unwrap();
        assert_eq!(store.add_product(SANDAL).await, Outcome::Committed);
        assert_eq!(store.add_product(SHOE).await, Outcome::Committed);
        assert_eq!(store.update_product_amount(SHOE, 3).await, Outcome::Committed);
    }

    let (store, _notices) = ctx.store(Arc::new(FileStorage::new(dir.path()))).unwrap();
    let ids: Vec<ProductId> = store.cart().items().iter().map(|item| item.product_id()).collect();
    assert_eq!(ids, vec![SANDAL, SHOE]);
    assert_eq!(store.cart().quantity_of(SHOE), 3);
    assert_eq!(store.cart().quantity_of(SANDAL), 1);

    let raw = std::fs::read_to_string(FileStorage::new(dir.path()).path_for(DEFAULT_CART_KEY))
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["schema"], "cart/v1");
    assert_eq!(value["items"][1]["amount"], 3);
}

#[tokio::test]
async fn test_corrupt_file_is_reported_then_cleared() {
    let ctx = TestContext::new().await;
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path());
    storage.set(DEFAULT_CART_KEY, "{not json").unwrap();

    let err = ctx.store(Arc::new(storage.clone())).unwrap_err();
    assert!(matches!(
        err,
        CartError::Storage(StorageError::Corrupt { .. })
    ));
    // The unreadable value is left for the user to inspect
    assert!(storage.get(DEFAULT_CART_KEY).unwrap().is_some());

    storage.remove(DEFAULT_CART_KEY).unwrap();
    let (store, _notices) = ctx.store(Arc::new(storage)).unwrap();
    assert!(store.cart().is_empty());
}

#[tokio::test]
async fn test_legacy_array_is_upgraded_on_commit() {
    let ctx = TestContext::new().await;
    let storage = Arc::new(MemoryStorage::with_entry(
        DEFAULT_CART_KEY,
        r#"[{"id": 2, "title": "Tênis VR", "price": 139.9, "image": "tenis2.jpg", "amount": 1}]"#,
    ));

    let (store, _notices) = ctx.store(storage.clone()).unwrap();
    assert_eq!(store.cart().quantity_of(SANDAL), 1);

    assert_eq!(store.add_product(SHOE).await, Outcome::Committed);
    let raw = storage.get(DEFAULT_CART_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["schema"], "cart/v1");
    assert_eq!(value["items"][0]["title"], "Tênis VR");
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test]
async fn test_concurrent_adds_respect_stock() {
    let ctx = TestContext::new().await;
    let (store, mut notices) = ctx.store(Arc::new(MemoryStorage::new())).unwrap();

    let (first, second) = tokio::join!(store.add_product(SANDAL), store.add_product(SANDAL));
    let mut outcomes = [first, second];
    outcomes.sort_by_key(|outcome| outcome.is_committed());

    assert_eq!(
        outcomes,
        [Outcome::Rejected(NoticeKind::StockExceeded), Outcome::Committed]
    );
    assert_eq!(store.cart().quantity_of(SANDAL), 1);
    assert_eq!(notices.try_recv().unwrap().kind, NoticeKind::StockExceeded);
}

#[tokio::test]
async fn test_subscriber_sees_http_backed_commits() {
    let ctx = TestContext::new().await;
    let (store, _notices) = ctx.store(Arc::new(MemoryStorage::new())).unwrap();
    let mut changes = store.subscribe();

    assert_eq!(store.add_product(SHOE).await, Outcome::Committed);
    changes.changed().await.unwrap();
    assert_eq!(changes.borrow_and_update().quantity_of(SHOE), 1);

    // A rejection publishes nothing
    ctx.set_stock(1, 1).await;
    let _ = store.add_product(SHOE).await;
    assert!(!changes.has_changed().unwrap());
}
