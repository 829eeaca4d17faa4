//! Abstract key-value storage interface for pluggable backends
//!
//! Mirrors the async string store available on the device: values are
//! JSON text, keys are fixed names such as the session user or token pair.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

/// Asynchronous string key-value store
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under a key
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store a raw value, replacing any previous one
    async fn set_item(&self, key: &str, value: String) -> Result<()>;

    /// Remove a key; removing a missing key is not an error
    async fn remove_item(&self, key: &str) -> Result<()>;

    /// Get the backend name for logging/debugging
    fn store_name(&self) -> &'static str;
}

/// Read and decode a JSON value
pub async fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>> {
    match store.get_item(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encode and store a JSON value
pub async fn write_json<T: Serialize + Sync>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set_item(key, raw).await
}
