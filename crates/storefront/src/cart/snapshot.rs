//! Versioned on-disk format of the cart.
//!
//! Current format:
//!
//! ```json
//! { "schema": "cart/v1", "items": [ { "id": 1, "title": "...", "price": "179.9", "image": "...", "amount": 2 } ] }
//! ```
//!
//! Carts saved before the schema tag existed are a bare JSON array of line
//! items. They are still read, and are rewritten in the current format on the
//! next commit.

use rocketshoes_core::Cart;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::storage::StorageError;

/// Schema tag written with every snapshot.
pub const CURRENT_SCHEMA: &str = "cart/v1";

#[derive(Serialize)]
#[serde(tag = "schema")]
enum SnapshotRef<'a> {
    #[serde(rename = "cart/v1")]
    V1 { items: &'a Cart },
}

#[derive(Deserialize)]
#[serde(tag = "schema")]
enum Snapshot {
    #[serde(rename = "cart/v1")]
    V1 { items: Cart },
}

/// Serialize a cart in the current format.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode(cart: &Cart) -> Result<String, serde_json::Error> {
    serde_json::to_string(&SnapshotRef::V1 { items: cart })
}

/// Decode a stored cart, accepting the current and legacy formats.
///
/// # Errors
///
/// Returns [`StorageError::Corrupt`] if the value is not valid JSON, has an
/// unknown schema, or violates a cart invariant.
pub fn decode(key: &str, raw: &str) -> Result<Cart, StorageError> {
    let corrupt = |reason: String| StorageError::Corrupt {
        key: key.to_string(),
        reason,
    };

    let value: Value = serde_json::from_str(raw).map_err(|e| corrupt(e.to_string()))?;
    match value {
        Value::Array(_) => Cart::deserialize(value).map_err(|e| corrupt(e.to_string())),
        Value::Object(_) => match Snapshot::deserialize(value) {
            Ok(Snapshot::V1 { items }) => Ok(items),
            Err(e) => Err(corrupt(e.to_string())),
        },
        other => Err(corrupt(format!("expected object or array, found {other}"))),
    }
}
