// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Domain service interfaces (ports) and pure domain services.
//!
//! CPU-bound services are synchronous and run on the caller; only the
//! persistence ports ([`PersistentCacheStore`], [`StorageBackend`]) are
//! async, since they deal with I/O. Infrastructure provides the concrete
//! implementations.

pub mod key_validator;
pub mod primitive;

pub use key_validator::{KeyStrength, KeyType, KeyValidation, KeyValidator, SuitabilityMap, ValidationOptions};
pub use primitive::{CryptoPrimitive, RsaKeyPair, SymmetricRequest};

use async_trait::async_trait;

use crate::error::CryptoError;

/// Durable key→value store backing the L2 cache tier (infrastructure
/// port). The adaptive cache requires only these four operations.
#[async_trait]
pub trait PersistentCacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CryptoError>;
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CryptoError>;
    async fn delete(&self, key: &str) -> Result<(), CryptoError>;
    async fn clear(&self) -> Result<(), CryptoError>;
}

/// Persistence adapter consumed by the secure storage service
/// (infrastructure port). Values are opaque serialized records.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CryptoError>;
    async fn set(&self, key: &str, value: String) -> Result<(), CryptoError>;
    async fn remove(&self, key: &str) -> Result<(), CryptoError>;
    async fn clear(&self) -> Result<(), CryptoError>;
    async fn keys(&self) -> Result<Vec<String>, CryptoError>;
}
