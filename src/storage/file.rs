//! JSON-file-backed key-value store
//!
//! The whole map is loaded on open and rewritten on every mutation, which
//! keeps the on-disk file a plain JSON object of key -> value strings.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::sync::RwLock;

use super::traits::KeyValueStore;
use crate::error::{AgriSessionError, Result};

/// Persistent key-value store kept in a single JSON file
pub struct FileStore {
    path: PathBuf,
    items: RwLock<HashMap<String, String>>,
}

impl FileStore {
    /// Open a store, loading existing contents if the file is present
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let items = match tokio::fs::read_to_string(&path).await {
            Ok(contents) if contents.trim().is_empty() => HashMap::new(),
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                AgriSessionError::StorageError(format!(
                    "Failed to parse store file {}: {}",
                    path.display(),
                    e
                ))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(AgriSessionError::StorageError(format!(
                    "Failed to read store file {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        log::debug!("Opened file store at {} with {} keys", path.display(), items.len());

        Ok(Self {
            path,
            items: RwLock::new(items),
        })
    }

    async fn flush(&self, items: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let contents = serde_json::to_string_pretty(items)?;
        tokio::fs::write(&self.path, contents).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: String) -> Result<()> {
        let mut items = self.items.write().await;
        items.insert(key.to_string(), value);
        self.flush(&items).await
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.items.write().await;
        if items.remove(key).is_some() {
            self.flush(&items).await?;
        }
        Ok(())
    }

    fn store_name(&self) -> &'static str {
        "file"
    }
}
