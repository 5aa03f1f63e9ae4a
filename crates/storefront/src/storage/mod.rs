//! Durable key/value storage for client-side state.
//!
//! Each key holds one JSON document (the cart array, the wishlist array,
//! the last order number). The stores above this layer never let a
//! [`StorageError`] escape; they log it and keep working from memory.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

/// Storage key holding the cart line items.
pub const CART_KEY: &str = "cc_cart";
/// Storage key holding the wishlist.
pub const WISHLIST_KEY: &str = "classiccarrry_wishlist";
/// Storage key holding the number of the last order placed.
pub const LAST_ORDER_KEY: &str = "lastOrderNumber";
/// Storage key holding the API bearer token.
pub const TOKEN_KEY: &str = "token";

/// Errors that can occur when reading or writing storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error on key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Stored document could not be decoded or encoded.
    #[error("corrupt JSON under key '{key}': {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Key contains characters the backend cannot store.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// Backend refused the operation (quota, read-only, disabled).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A string-keyed store of string values.
///
/// Implementations must be safe to share between the cart and wishlist
/// stores, hence `Send + Sync` and `&self` receivers.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. A missing key is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Shared handle to a storage backend.
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Read and decode a JSON document.
///
/// # Errors
///
/// Returns `StorageError` on backend failure or undecodable content.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    store
        .get(key)?
        .map(|raw| {
            serde_json::from_str(&raw).map_err(|source| StorageError::Json {
                key: key.to_string(),
                source,
            })
        })
        .transpose()
}

/// Read a JSON array, decoding each element on its own.
///
/// Elements that do not decode as `T` are skipped with a warning, so one
/// bad entry never costs the rest of the list.
///
/// # Errors
///
/// Returns `StorageError` on backend failure or when the document is not a
/// JSON array.
pub fn load_json_list<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Vec<T>, StorageError> {
    let Some(entries) = load_json::<Vec<serde_json::Value>>(store, key)? else {
        return Ok(Vec::new());
    };
    Ok(entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(key = %key, index, error = %e, "Skipping undecodable entry");
                None
            }
        })
        .collect())
}

/// Encode and write a JSON document.
///
/// # Errors
///
/// Returns `StorageError` on encoding or backend failure.
pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Json {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &raw)
}

/// Validate a key for backends that map keys to file names.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key(CART_KEY).is_ok());
        assert!(validate_key(WISHLIST_KEY).is_ok());
        assert!(validate_key("lastOrderNumber").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key(".hidden").is_err());
        assert!(validate_key("with space").is_err());
    }

    #[test]
    fn test_json_helpers() {
        let store = MemoryStore::new();
        save_json(&store, "numbers", &[1, 2, 3]).unwrap();
        let loaded: Option<Vec<i32>> = load_json(&store, "numbers").unwrap();
        assert_eq!(loaded, Some(vec![1, 2, 3]));

        let missing: Option<Vec<i32>> = load_json(&store, "absent").unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn test_load_json_reports_corruption() {
        let store = MemoryStore::new();
        store.set("broken", "[{not json").unwrap();
        let result: Result<Option<Vec<i32>>, _> = load_json(&store, "broken");
        assert!(matches!(result, Err(StorageError::Json { .. })));
    }

    #[test]
    fn test_load_json_list_skips_bad_entries() {
        let store = MemoryStore::new();
        store.set("mixed", r#"[1, "two", 3, null]"#).unwrap();
        let loaded: Vec<i32> = load_json_list(&store, "mixed").unwrap();
        assert_eq!(loaded, vec![1, 3]);

        let missing: Vec<i32> = load_json_list(&store, "absent").unwrap();
        assert!(missing.is_empty());

        store.set("object", r#"{"not": "a list"}"#).unwrap();
        let result: Result<Vec<i32>, _> = load_json_list(&store, "object");
        assert!(matches!(result, Err(StorageError::Json { .. })));
    }

    #[test]
    fn test_arc_forwarding() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }
}
