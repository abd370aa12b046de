//! Cart and line item types.
//!
//! A [`Cart`] is an ordered list of [`LineItem`]s with two invariants:
//!
//! - every line holds at least one unit
//! - no product appears on more than one line
//!
//! Both are enforced by every constructor and mutator, including
//! deserialization, so a `Cart` value is always valid.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Product, ProductId};

/// Violations of the cart invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartInvariantError {
    /// A line item would hold zero units.
    #[error("line item for product {0} must hold at least one unit")]
    ZeroAmount(ProductId),

    /// A second line item for the same product.
    #[error("product {0} is already in the cart")]
    DuplicateProduct(ProductId),

    /// The product has no line item to change.
    #[error("product {0} is not in the cart")]
    MissingProduct(ProductId),
}

/// One product entry in the cart with its quantity.
///
/// Serializes as the product object with an extra `amount` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(flatten)]
    pub product: Product,
    pub amount: u32,
}

impl LineItem {
    /// Create a line item.
    #[must_use]
    pub const fn new(product: Product, amount: u32) -> Self {
        Self { product, amount }
    }

    /// The id of the product on this line.
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product.id
    }
}

/// The ordered set of line items a shopper has selected.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<LineItem>", into = "Vec<LineItem>")]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find the line item for a product.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.product_id() == product_id)
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.get(product_id).is_some()
    }

    /// Units of a product currently in the cart, 0 if absent.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.get(product_id).map_or(0, |item| item.amount)
    }

    /// Total units across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.amount)).sum()
    }

    /// Append a new line item at the end of the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is zero or the product already has a line.
    pub fn insert(&mut self, item: LineItem) -> Result<(), CartInvariantError> {
        let id = item.product_id();
        if item.amount == 0 {
            return Err(CartInvariantError::ZeroAmount(id));
        }
        if self.contains(id) {
            return Err(CartInvariantError::DuplicateProduct(id));
        }
        self.items.push(item);
        Ok(())
    }

    /// Set the quantity of an existing line, keeping its position.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is zero or the product is not in the cart.
    pub fn set_amount(
        &mut self,
        product_id: ProductId,
        amount: u32,
    ) -> Result<(), CartInvariantError> {
        if amount == 0 {
            return Err(CartInvariantError::ZeroAmount(product_id));
        }
        let item = self
            .items
            .iter_mut()
            .find(|item| item.product_id() == product_id)
            .ok_or(CartInvariantError::MissingProduct(product_id))?;
        item.amount = amount;
        Ok(())
    }

    /// Remove the line for a product, returning it if it was present.
    pub fn remove(&mut self, product_id: ProductId) -> Option<LineItem> {
        let index = self
            .items
            .iter()
            .position(|item| item.product_id() == product_id)?;
        Some(self.items.remove(index))
    }
}

impl TryFrom<Vec<LineItem>> for Cart {
    type Error = CartInvariantError;

    fn try_from(items: Vec<LineItem>) -> Result<Self, Self::Error> {
        let mut cart = Self::new();
        for item in items {
            cart.insert(item)?;
        }
        Ok(cart)
    }
}

impl From<Cart> for Vec<LineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
