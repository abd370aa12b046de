//! Cart commands against the persisted cart.
//!
//! Each invocation loads the cart from `CART_STORAGE_DIR`, applies one
//! operation and exits. Notices go to the log through [`LogSink`].

use std::sync::Arc;

use rocketshoes_core::{Cart, ProductId};
use rocketshoes_storefront::cart::LogSink;
use rocketshoes_storefront::config::CartConfig;
use rocketshoes_storefront::inventory::HttpInventoryClient;
use rocketshoes_storefront::storage::{FileStorage, PersistentKv, StorageError};
use rocketshoes_storefront::{CartError, CartStore, Outcome};

use super::CommandError;

/// Load the store configured by `config`.
fn open_store(config: &CartConfig) -> Result<CartStore, CommandError> {
    let inventory = HttpInventoryClient::new(&config.inventory)?;
    let storage = FileStorage::new(&config.storage.dir);

    CartStore::load(
        &config.storage.cart_key,
        Arc::new(inventory),
        Arc::new(storage),
        Arc::new(LogSink),
    )
    .map_err(|e| {
        if matches!(e, CartError::Storage(StorageError::Corrupt { .. })) {
            tracing::warn!("The stored cart is unreadable. Run `rs-cart clear` to discard it.");
        }
        e.into()
    })
}

/// Log every line of the cart.
fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        tracing::info!("Cart is empty");
        return;
    }

    for item in cart {
        tracing::info!(
            "{:>4} x {} [{}] {}",
            item.amount,
            item.product.title,
            item.product.id,
            item.product.price
        );
    }
    tracing::info!(
        "{} line(s), {} unit(s)",
        cart.len(),
        cart.total_quantity()
    );
}

/// Turn an operation outcome into the command result.
fn finish(store: &CartStore, outcome: Outcome) -> Result<(), CommandError> {
    match outcome {
        Outcome::Committed => {
            print_cart(&store.cart());
            Ok(())
        }
        Outcome::Ignored => {
            tracing::info!("Nothing to do: quantity must be at least 1");
            Ok(())
        }
        Outcome::Rejected(kind) => {
            tracing::info!("{kind}; the cart is unchanged");
            Ok(())
        }
        Outcome::Failed(kind) => Err(CommandError::NotApplied(kind)),
    }
}

/// Print the persisted cart.
///
/// # Errors
///
/// Returns an error if the cart cannot be loaded.
pub fn show(config: &CartConfig) -> Result<(), CommandError> {
    let store = open_store(config)?;
    print_cart(&store.cart());
    Ok(())
}

/// Add one unit of a product.
///
/// # Errors
///
/// Returns an error if the cart cannot be loaded or the add was not applied.
pub async fn add(config: &CartConfig, product_id: ProductId) -> Result<(), CommandError> {
    let store = open_store(config)?;
    let outcome = store.add_product(product_id).await;
    finish(&store, outcome)
}

/// Remove a product's line.
///
/// # Errors
///
/// Returns an error if the cart cannot be loaded or the removal was not applied.
pub async fn remove(config: &CartConfig, product_id: ProductId) -> Result<(), CommandError> {
    let store = open_store(config)?;
    let outcome = store.remove_product(product_id).await;
    finish(&store, outcome)
}

/// Set the quantity of a product already in the cart.
///
/// # Errors
///
/// Returns an error if the cart cannot be loaded or the update was not applied.
pub async fn update(
    config: &CartConfig,
    product_id: ProductId,
    amount: i64,
) -> Result<(), CommandError> {
    let store = open_store(config)?;
    let outcome = store.update_product_amount(product_id, amount).await;
    finish(&store, outcome)
}

/// Delete the stored cart.
///
/// Goes straight to storage without decoding, so it also recovers from a
/// corrupt cart.
///
/// # Errors
///
/// Returns an error if the stored value cannot be deleted.
pub fn clear(config: &CartConfig) -> Result<(), CommandError> {
    let storage = FileStorage::new(&config.storage.dir);
    storage.remove(&config.storage.cart_key)?;
    tracing::info!(
        "Cleared cart at {}",
        storage.path_for(&config.storage.cart_key).display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use rocketshoes_storefront::NoticeKind;
    use rocketshoes_storefront::config::InventoryConfig;
    use rocketshoes_storefront::storage::MemoryStorage;

    use super::*;

    fn offline_store() -> CartStore {
        let config = InventoryConfig::with_base_url("http://127.0.0.1:9").expect("valid URL");
        let inventory = HttpInventoryClient::new(&config).expect("client builds");
        CartStore::load(
            "cart",
            Arc::new(inventory),
            Arc::new(MemoryStorage::new()),
            Arc::new(LogSink),
        )
        .expect("empty storage loads")
    }

    #[test]
    fn test_stock_rejection_is_not_a_command_error() {
        let store = offline_store();
        assert!(finish(&store, Outcome::Rejected(NoticeKind::StockExceeded)).is_ok());
    }

    #[test]
    fn test_ignored_is_not_a_command_error() {
        let store = offline_store();
        assert!(finish(&store, Outcome::Ignored).is_ok());
    }

    #[test]
    fn test_failure_is_a_command_error() {
        let store = offline_store();
        assert!(matches!(
            finish(&store, Outcome::Failed(NoticeKind::AddFailed)),
            Err(CommandError::NotApplied(NoticeKind::AddFailed))
        ));
    }
}
