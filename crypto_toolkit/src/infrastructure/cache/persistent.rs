// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # L2 Persistent Cache Stores
//!
//! Concrete [`PersistentCacheStore`] backends. The adaptive cache manager
//! needs only `get`/`set`/`delete`/`clear`; which backend sits behind those
//! four calls is the caller's choice:
//!
//! - [`InMemoryStore`]: process-local map, the default for tests and for
//!   deployments that only want the L1 tier's semantics
//! - [`JsonFileStore`]: single-file JSON snapshot, loaded on open and
//!   rewritten on every mutation; durable across restarts for
//!   moderately-sized caches

use async_trait::async_trait;
use base64::Engine as _;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;

use crypto_toolkit_domain::services::PersistentCacheStore;
use crypto_toolkit_domain::CryptoError;

/// Volatile key→value store over a tokio `RwLock` map.
#[derive(Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl PersistentCacheStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CryptoError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CryptoError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CryptoError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), CryptoError> {
        self.entries.write().await.clear();
        Ok(())
    }
}

/// Durable store that snapshots the whole map to one JSON file.
///
/// Values are Base64 inside the file. Every mutation rewrites the file;
/// the store is intended for caches in the thousands of entries, not
/// millions.
pub struct JsonFileStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl JsonFileStore {
    /// Opens the store, loading the existing snapshot when the file exists.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, CryptoError> {
        let path = path.as_ref().to_path_buf();
        let entries = match tokio::fs::read(&path).await {
            Ok(raw) => {
                let encoded: HashMap<String, String> = serde_json::from_slice(&raw)
                    .map_err(|e| CryptoError::storage_failed(format!("corrupt store file: {}", e)))?;
                let mut decoded = HashMap::with_capacity(encoded.len());
                for (key, value) in encoded {
                    let bytes = base64::engine::general_purpose::STANDARD
                        .decode(&value)
                        .map_err(|e| CryptoError::storage_failed(format!("corrupt store value: {}", e)))?;
                    decoded.insert(key, bytes);
                }
                decoded
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(CryptoError::storage_failed(format!("cannot open store: {}", e))),
        };
        debug!(path = %path.display(), entries = entries.len(), "opened JSON file store");
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    async fn flush(&self, entries: &HashMap<String, Vec<u8>>) -> Result<(), CryptoError> {
        let encoded: HashMap<&String, String> = entries
            .iter()
            .map(|(key, value)| (key, base64::engine::general_purpose::STANDARD.encode(value)))
            .collect();
        let raw = serde_json::to_vec(&encoded)
            .map_err(|e| CryptoError::storage_failed(format!("cannot serialize store: {}", e)))?;
        tokio::fs::write(&self.path, raw)
            .await
            .map_err(|e| CryptoError::storage_failed(format!("cannot write store: {}", e)))
    }
}

#[async_trait]
impl PersistentCacheStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CryptoError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CryptoError> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value);
        self.flush(&entries).await
    }

    async fn delete(&self, key: &str) -> Result<(), CryptoError> {
        let mut entries = self.entries.write().await;
        if entries.remove(key).is_some() {
            self.flush(&entries).await?;
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), CryptoError> {
        let mut entries = self.entries.write().await;
        entries.clear();
        self.flush(&entries).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_store_contract() {
        let store = InMemoryStore::new();
        assert_eq!(store.get("missing").await.unwrap(), None);
        store.set("k", vec![1, 2, 3]).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(vec![1, 2, 3]));
        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    /// Tests that the file store survives reopening.
    ///
    /// Validates that:
    /// - Values written before close are visible after reopen
    /// - clear() empties both the map and the snapshot
    #[tokio::test]
    async fn test_json_file_store_durability() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("l2.json");

        {
            let store = JsonFileStore::open(&path).await.unwrap();
            store.set("alpha", b"payload".to_vec()).await.unwrap();
            store.set("beta", vec![0, 255, 7]).await.unwrap();
        }

        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(reopened.get("alpha").await.unwrap(), Some(b"payload".to_vec()));
        assert_eq!(reopened.get("beta").await.unwrap(), Some(vec![0, 255, 7]));

        reopened.clear().await.unwrap();
        let again = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(again.get("alpha").await.unwrap(), None);
    }
}
