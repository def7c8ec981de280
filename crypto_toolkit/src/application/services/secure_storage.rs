// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Secure Storage
//!
//! Encrypt-at-rest key/value store over an injected persistence backend.
//! Values are sealed with AES-256-GCM under the store's master key; the
//! backend only ever sees JSON records of
//! `{ ciphertext, iv, createdAt, ttl? }`.
//!
//! Entries expire lazily on read and eagerly when an iteration is
//! requested. Reading an absent or expired key yields `Ok(None)`, never an
//! error.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

use crypto_toolkit_domain::services::StorageBackend;
use crypto_toolkit_domain::value_objects::{CipherMode, PaddingScheme, SymmetricAlgorithm};
use crypto_toolkit_domain::{CryptoError, SecretBuffer};

use crate::application::runtime::CoreRuntime;
use crate::application::services::support::normalize_key;
use crate::application::services::symmetric::{SymmetricFacade, SymmetricOptions};

/// Store configuration.
#[derive(Debug, Clone, Default)]
pub struct SecureStorageConfig {
    /// Namespace prefix prepended to every backend key.
    pub prefix: Option<String>,
    /// Default TTL applied when `set` passes none.
    pub default_ttl: Option<Duration>,
}

/// On-backend record shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StorageRecord {
    ciphertext: String,
    iv: String,
    #[serde(rename = "createdAt")]
    created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    ttl: Option<i64>,
}

impl StorageRecord {
    fn is_expired(&self, now_ms: i64) -> bool {
        self.ttl.is_some_and(|ttl| self.created_at + ttl <= now_ms)
    }
}

/// Encrypt-at-rest store.
pub struct SecureStorage<'r> {
    runtime: &'r CoreRuntime,
    backend: Arc<dyn StorageBackend>,
    master_key: SecretBuffer,
    config: SecureStorageConfig,
}

impl<'r> SecureStorage<'r> {
    /// Builds a store sealing under the given master key (normalized to
    /// 256 bits with the toolkit's key rules).
    pub fn new(
        runtime: &'r CoreRuntime,
        backend: Arc<dyn StorageBackend>,
        master_key: &str,
        config: SecureStorageConfig,
    ) -> Result<Self, CryptoError> {
        Ok(Self {
            runtime,
            backend,
            master_key: normalize_key(master_key, 32)?,
            config,
        })
    }

    fn backend_key(&self, key: &str) -> String {
        match &self.config.prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }

    fn strip_prefix<'a>(&self, backend_key: &'a str) -> Option<&'a str> {
        match &self.config.prefix {
            Some(prefix) => backend_key
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix(':')),
            None => Some(backend_key),
        }
    }

    fn seal_options() -> SymmetricOptions {
        SymmetricOptions {
            mode: CipherMode::Gcm,
            padding: PaddingScheme::NoPadding,
            ..SymmetricOptions::default()
        }
    }

    /// Seals and stores a value.
    pub async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<(), CryptoError> {
        if key.is_empty() {
            return Err(CryptoError::invalid_input("storage key must not be empty"));
        }
        let sealed = SymmetricFacade::new(self.runtime).encrypt_with_key_bytes(
            SymmetricAlgorithm::Aes,
            value,
            self.master_key.as_slice(),
            &Self::seal_options(),
        );
        let sealed = sealed.ok()?;
        let record = StorageRecord {
            ciphertext: sealed
                .data
                .ok_or_else(|| CryptoError::invalid_state("sealed record carries no data"))?,
            iv: sealed
                .iv
                .ok_or_else(|| CryptoError::invalid_state("sealed record carries no IV"))?,
            created_at: Utc::now().timestamp_millis(),
            ttl: ttl
                .or(self.config.default_ttl)
                .map(|ttl| ttl.as_millis() as i64),
        };
        self.backend
            .set(&self.backend_key(key), serde_json::to_string(&record)?)
            .await
    }

    /// Reads and unseals a value. Absent and expired keys both read as
    /// `None`; expired records are removed on the way.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CryptoError> {
        let backend_key = self.backend_key(key);
        let Some(raw) = self.backend.get(&backend_key).await? else {
            return Ok(None);
        };
        let record: StorageRecord = serde_json::from_str(&raw)?;
        if record.is_expired(Utc::now().timestamp_millis()) {
            debug!(key, "removing expired storage entry");
            self.backend.remove(&backend_key).await?;
            return Ok(None);
        }
        let opened = SymmetricFacade::new(self.runtime).decrypt_with_key_bytes(
            SymmetricAlgorithm::Aes,
            &record.ciphertext,
            self.master_key.as_slice(),
            &SymmetricOptions {
                iv: Some(record.iv),
                ..Self::seal_options()
            },
        );
        Ok(Some(opened.ok()?.data_bytes()?))
    }

    pub async fn remove(&self, key: &str) -> Result<(), CryptoError> {
        self.backend.remove(&self.backend_key(key)).await
    }

    /// Clears this store's namespace. Without a prefix the whole backend
    /// is cleared.
    pub async fn clear(&self) -> Result<(), CryptoError> {
        match &self.config.prefix {
            None => self.backend.clear().await,
            Some(_) => {
                for backend_key in self.backend.keys().await? {
                    if self.strip_prefix(&backend_key).is_some() {
                        self.backend.remove(&backend_key).await?;
                    }
                }
                Ok(())
            }
        }
    }

    /// Lists live keys, eagerly sweeping expired records.
    pub async fn keys(&self) -> Result<Vec<String>, CryptoError> {
        let now_ms = Utc::now().timestamp_millis();
        let mut live = Vec::new();
        for backend_key in self.backend.keys().await? {
            let Some(key) = self.strip_prefix(&backend_key) else {
                continue;
            };
            let Some(raw) = self.backend.get(&backend_key).await? else {
                continue;
            };
            match serde_json::from_str::<StorageRecord>(&raw) {
                Ok(record) if record.is_expired(now_ms) => {
                    self.backend.remove(&backend_key).await?;
                }
                Ok(_) => live.push(key.to_string()),
                Err(_) => live.push(key.to_string()), // foreign record, listed as-is
            }
        }
        live.sort();
        Ok(live)
    }
}

/// Volatile [`StorageBackend`] for tests and in-process use.
#[derive(Default)]
pub struct MemoryStorageBackend {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorageBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorageBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, CryptoError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CryptoError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CryptoError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), CryptoError> {
        self.entries.write().await.clear();
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, CryptoError> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::runtime::CoreRuntime;

    fn store<'r>(runtime: &'r CoreRuntime, backend: Arc<MemoryStorageBackend>) -> SecureStorage<'r> {
        SecureStorage::new(
            runtime,
            backend,
            "storage master key",
            SecureStorageConfig {
                prefix: Some("app".to_string()),
                default_ttl: None,
            },
        )
        .unwrap()
    }

    /// Tests the set/get round trip and that the backend only sees sealed
    /// records.
    #[tokio::test]
    async fn test_round_trip_and_at_rest_shape() {
        let runtime = CoreRuntime::new();
        let backend = Arc::new(MemoryStorageBackend::new());
        let storage = store(&runtime, Arc::clone(&backend));

        storage.set("token", b"plaintext value", None).await.unwrap();
        assert_eq!(storage.get("token").await.unwrap(), Some(b"plaintext value".to_vec()));

        let raw = backend.get("app:token").await.unwrap().unwrap();
        assert!(!raw.contains("plaintext value"));
        let record: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(record.get("ciphertext").is_some());
        assert!(record.get("iv").is_some());
        assert!(record.get("createdAt").is_some());
    }

    /// Tests lazy expiry on read and eager expiry on iteration.
    #[tokio::test]
    async fn test_ttl_expiry_paths() {
        let runtime = CoreRuntime::new();
        let backend = Arc::new(MemoryStorageBackend::new());
        let storage = store(&runtime, Arc::clone(&backend));

        storage.set("gone", b"v", Some(Duration::from_millis(0))).await.unwrap();
        storage.set("kept", b"v", Some(Duration::from_secs(600))).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert_eq!(storage.get("gone").await.unwrap(), None, "lazy expiry on read");
        assert!(backend.get("app:gone").await.unwrap().is_none(), "expired record removed");

        storage.set("gone2", b"v", Some(Duration::from_millis(0))).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(storage.keys().await.unwrap(), vec!["kept".to_string()]);
    }

    /// Tests that absent keys read as None and clear respects the prefix.
    #[tokio::test]
    async fn test_absent_reads_and_namespaced_clear() {
        let runtime = CoreRuntime::new();
        let backend = Arc::new(MemoryStorageBackend::new());
        backend.set("other:foreign", "data".to_string()).await.unwrap();
        let storage = store(&runtime, Arc::clone(&backend));

        assert_eq!(storage.get("missing").await.unwrap(), None);

        storage.set("mine", b"v", None).await.unwrap();
        storage.clear().await.unwrap();
        assert_eq!(storage.get("mine").await.unwrap(), None);
        assert!(backend.get("other:foreign").await.unwrap().is_some(), "foreign namespace kept");
    }

    /// Tests that a wrong master key cannot unseal existing records.
    #[tokio::test]
    async fn test_wrong_master_key_fails_uniformly() {
        let runtime = CoreRuntime::new();
        let backend = Arc::new(MemoryStorageBackend::new());
        let storage = store(&runtime, Arc::clone(&backend));
        storage.set("k", b"sealed", None).await.unwrap();

        let wrong = SecureStorage::new(
            &runtime,
            Arc::clone(&backend) as Arc<dyn StorageBackend>,
            "a different master key",
            SecureStorageConfig {
                prefix: Some("app".to_string()),
                default_ttl: None,
            },
        )
        .unwrap();
        assert!(matches!(wrong.get("k").await, Err(CryptoError::DecryptionFailed)));
    }
}
