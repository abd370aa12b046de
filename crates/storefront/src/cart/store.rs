//! The cart store: stock-checked mutations with write-through persistence.

use std::sync::Arc;

use rocketshoes_core::{Cart, LineItem, ProductId};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, instrument, warn};

use super::notify::{Notice, NoticeKind, NotificationSink};
use super::snapshot;
use crate::error::{CartError, Result};
use crate::inventory::Inventory;
use crate::storage::PersistentKv;

/// What a cart operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Outcome {
    /// The cart changed and was persisted.
    Committed,
    /// The request was ignored without any notice (non-positive quantity).
    Ignored,
    /// The request was refused for lack of stock. Not an error.
    Rejected(NoticeKind),
    /// The operation failed; the cart is unchanged.
    Failed(NoticeKind),
}

impl Outcome {
    #[must_use]
    pub const fn is_committed(self) -> bool {
        matches!(self, Self::Committed)
    }

    /// The notice the shopper was shown, if any.
    #[must_use]
    pub const fn notice(self) -> Option<NoticeKind> {
        match self {
            Self::Rejected(kind) | Self::Failed(kind) => Some(kind),
            Self::Committed | Self::Ignored => None,
        }
    }
}

/// Shared handle to a shopper's cart.
///
/// Cheaply cloneable via `Arc`. Operations on the same store are serialized:
/// the cart lock is held from the first read until the commit, including
/// while waiting on the inventory service, so concurrent requests for the
/// same product always see each other's results.
///
/// Operations never return errors. Failures are logged, reported to the
/// [`NotificationSink`] and summarized in the returned [`Outcome`].
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    key: String,
    inventory: Arc<dyn Inventory>,
    storage: Arc<dyn PersistentKv>,
    sink: Arc<dyn NotificationSink>,
    cart: Mutex<Cart>,
    changes: watch::Sender<Cart>,
}

impl CartStore {
    /// Load the cart stored under `key`, or start empty if there is none.
    ///
    /// Stored line items are trusted; stock is not re-checked on load.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read or the stored cart is corrupt.
    /// A corrupt cart is never silently discarded.
    #[instrument(skip(inventory, storage, sink))]
    pub fn load(
        key: &str,
        inventory: Arc<dyn Inventory>,
        storage: Arc<dyn PersistentKv>,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self> {
        let cart = match storage.get(key)? {
            Some(raw) => snapshot::decode(key, &raw)?,
            None => Cart::new(),
        };
        debug!(lines = cart.len(), "Loaded cart");

        let (changes, _) = watch::channel(cart.clone());

        Ok(Self {
            inner: Arc::new(CartStoreInner {
                key: key.to_string(),
                inventory,
                storage,
                sink,
                cart: Mutex::new(cart),
                changes,
            }),
        })
    }

    /// The last committed cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.inner.changes.borrow().clone()
    }

    /// Watch the cart; the receiver sees every committed change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.inner.changes.subscribe()
    }

    /// Add one unit of a product, fetching its details if it is new to the cart.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) -> Outcome {
        let result = self.try_add(product_id).await;
        self.settle(product_id, NoticeKind::AddFailed, result)
    }

    /// Remove a product's line from the cart.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_product(&self, product_id: ProductId) -> Outcome {
        let result = self.try_remove(product_id).await;
        self.settle(product_id, NoticeKind::RemoveFailed, result)
    }

    /// Set the quantity of a product already in the cart.
    ///
    /// Quantities below 1 are ignored without a notice.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn update_product_amount(&self, product_id: ProductId, amount: i64) -> Outcome {
        if amount < 1 {
            debug!(amount, "Ignoring non-positive quantity");
            return Outcome::Ignored;
        }
        let result = self.try_update(product_id, amount).await;
        self.settle(product_id, NoticeKind::UpdateFailed, result)
    }

    /// Empty the cart and delete its stored value.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored value cannot be removed; the in-memory
    /// cart is left unchanged in that case.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<()> {
        let mut cart = self.inner.cart.lock().await;
        self.inner.storage.remove(&self.inner.key)?;
        *cart = Cart::new();
        self.inner.changes.send_replace(cart.clone());
        info!("Cart cleared");
        Ok(())
    }

    async fn try_add(&self, product_id: ProductId) -> Result<()> {
        let mut cart = self.inner.cart.lock().await;

        let current = cart.quantity_of(product_id);
        let stock = self.inner.inventory.stock(product_id).await?;
        let requested = u64::from(current) + 1;

        if !stock.covers(requested) {
            return Err(CartError::StockExceeded {
                product_id,
                requested,
                available: stock.available,
            });
        }

        let mut next = cart.clone();
        if current == 0 {
            let product = self.inner.inventory.product(product_id).await?;
            next.insert(LineItem::new(product, 1))?;
        } else {
            // requested <= available, so this cannot overflow
            next.set_amount(product_id, current + 1)?;
        }

        self.commit(&mut cart, next)
    }

    async fn try_remove(&self, product_id: ProductId) -> Result<()> {
        let mut cart = self.inner.cart.lock().await;

        let mut next = cart.clone();
        next.remove(product_id)
            .ok_or(CartError::NotInCart(product_id))?;

        self.commit(&mut cart, next)
    }

    async fn try_update(&self, product_id: ProductId, amount: i64) -> Result<()> {
        let mut cart = self.inner.cart.lock().await;

        if !cart.contains(product_id) {
            return Err(CartError::NotInCart(product_id));
        }

        let stock = self.inner.inventory.stock(product_id).await?;
        let requested = amount.unsigned_abs();
        let exceeded = || CartError::StockExceeded {
            product_id,
            requested,
            available: stock.available,
        };

        if !stock.covers(requested) {
            return Err(exceeded());
        }
        let amount = u32::try_from(requested).map_err(|_| exceeded())?;

        let mut next = cart.clone();
        next.set_amount(product_id, amount)?;

        self.commit(&mut cart, next)
    }

    /// Persist `next`, then make it the current cart.
    ///
    /// Writing first means a storage failure leaves memory and storage agreeing
    /// on the previous cart.
    fn commit(&self, current: &mut Cart, next: Cart) -> Result<()> {
        let encoded = snapshot::encode(&next)?;
        self.inner.storage.set(&self.inner.key, &encoded)?;

        *current = next;
        self.inner.changes.send_replace(current.clone());
        Ok(())
    }

    /// Turn an operation result into an outcome, notifying the shopper if needed.
    fn settle(&self, product_id: ProductId, failure: NoticeKind, result: Result<()>) -> Outcome {
        match result {
            Ok(()) => {
                info!("Cart updated");
                Outcome::Committed
            }
            Err(err) if err.is_stock_rejection() => {
                debug!(reason = %err, "Not enough stock");
                self.notify(NoticeKind::StockExceeded, product_id);
                Outcome::Rejected(NoticeKind::StockExceeded)
            }
            Err(err) => {
                warn!(error = %err, "Cart operation failed");
                self.notify(failure, product_id);
                Outcome::Failed(failure)
            }
        }
    }

    fn notify(&self, kind: NoticeKind, product_id: ProductId) {
        self.inner.sink.notify(Notice::new(kind, product_id));
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.inner.key)
            .field("storage", &self.inner.storage)
            .field("lines", &self.inner.changes.borrow().len())
            .finish_non_exhaustive()
    }
}
