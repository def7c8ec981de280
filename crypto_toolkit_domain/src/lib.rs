// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Crypto Toolkit Domain
//!
//! Pure domain layer for the crypto toolkit: the error taxonomy, algorithm
//! value objects, result records, secure memory primitives, and the ports
//! that infrastructure implements (primitive provider, persistent cache
//! store, storage backend).
//!
//! This crate contains no I/O and no concrete algorithm implementation.
//! CPU-bound domain services are synchronous; only the persistence ports
//! are async. See the `crypto-toolkit` crate for the infrastructure
//! adapters and the public facades.

pub mod entities;
pub mod error;
pub mod security;
pub mod services;
pub mod value_objects;

// Flat re-exports for the common types, mirroring how callers import them.
pub use entities::{KeyInfo, KeyInfoExport, OperationStats, PerformanceMetric, PerformanceReport, TimeseriesBin};
pub use error::{sanitize_message, CryptoError, ErrorInfo};
pub use security::{timing_safe_eq, timing_safe_eq_base64, timing_safe_eq_hex, SecretBuffer};
pub use services::{
    CryptoPrimitive, KeyStrength, KeyType, KeyValidation, KeyValidator, PersistentCacheStore, RsaKeyPair,
    StorageBackend, SuitabilityMap, SymmetricRequest, ValidationOptions,
};
pub use value_objects::{
    AesKeySize, ChunkSize, CipherMode, DecryptResult, DerivedKey, EncryptResult, Fingerprint, HashAlgorithm,
    HashResult, KeyVersion, OutputEncoding, PaddingScheme, Pbkdf2Prf, RsaKeySize, RsaPadding, SignatureResult,
    SymmetricAlgorithm,
};
