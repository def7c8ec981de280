// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Crypto Toolkit
//!
//! A unified cryptographic facade: symmetric encryption (AES, DES, 3DES,
//! Blowfish), RSA, the SHA/MD5 digest family, HMAC, PBKDF2, and digital
//! signatures behind one result-typed API, with the cross-cutting
//! machinery that makes a bag of primitives usable in production:
//!
//! - **Adaptive memoization**: a two-tier cache with access-pattern
//!   prediction, prewarming, and pressure-driven resizing for the
//!   deterministic operations (hashing, key derivation, decryption)
//! - **Object and buffer pooling** for hot allocations, plus a Base64
//!   result cache
//! - **Key rotation** with versioned keys and batch re-encryption
//! - **Secure memory**: zero-on-drop buffers and timing-safe comparison
//! - **Rate limiting** on the expensive asymmetric and derivation paths
//! - **Chunked streaming** for inputs too large to hold in memory
//! - **Result serialization** in JSON, compact, and Base64 envelopes
//! - **Performance observation** with per-operation reports
//!
//! ## Getting started
//!
//! ```
//! use crypto_toolkit::{CoreRuntime, SymmetricFacade, SymmetricOptions};
//!
//! let runtime = CoreRuntime::new();
//! let crypto = SymmetricFacade::new(&runtime);
//!
//! let sealed = crypto.encrypt_aes(b"Hello World", "my passphrase", &SymmetricOptions::default());
//! assert!(sealed.success);
//!
//! let opened = crypto.decrypt_aes(
//!     sealed.data.as_deref().unwrap(),
//!     "my passphrase",
//!     &SymmetricOptions { iv: sealed.iv.clone(), ..SymmetricOptions::default() },
//! );
//! assert_eq!(opened.text().unwrap(), "Hello World");
//! ```
//!
//! Every public operation returns a result record; failures carry a
//! sanitized, typed error instead of unwinding. The shared machinery
//! lives in a [`CoreRuntime`]; use [`CoreRuntime::global`] for a
//! process-wide instance or construct private ones freely.

pub mod application;
pub mod infrastructure;

// Public surface, re-exported flat.
pub use application::runtime::{CancellationFlag, CoreRuntime, RuntimeBuilder};
pub use application::services::{
    ChunkDecryptor, ChunkEncryptor, EnvelopeInfo, HashFacade, HashOptions, KeyPairResult, KeyRotationEngine,
    MemoryStorageBackend, OperationOptions, Pbkdf2Facade, Pbkdf2Options, ReencryptOutcome, RegistryExport,
    ResultSerializer, RsaFacade, RsaOptions, SecureStorage, SecureStorageConfig, SerializationFormat,
    SerializerOptions, SignatureFacade, StreamConfig, StreamProgress, SymmetricFacade, SymmetricOptions,
    VersionedEncryptResult, ENVELOPE_VERSION, MIN_ITERATIONS,
};
pub use infrastructure::cache::{AdaptiveCache, AdaptiveCacheConfig, CacheStatistics, PrewarmStrategy};
pub use infrastructure::config::RuntimeConfig;
pub use infrastructure::encoding::{decode, encode, validate, EncodingKind};
pub use infrastructure::logging::init_tracing;
pub use infrastructure::metrics::{ObserverConfig, PerformanceObserver};
pub use infrastructure::pools::{Base64ResultCache, BufferPool, ObjectPool, PoolStats};
pub use infrastructure::rate_limiter::{Admission, RateLimiter, RateLimiterConfig};

// The domain crate is part of the public API surface.
pub use crypto_toolkit_domain as domain;
pub use crypto_toolkit_domain::{
    timing_safe_eq, timing_safe_eq_base64, timing_safe_eq_hex, AesKeySize, ChunkSize, CipherMode, CryptoError,
    DecryptResult, DerivedKey, EncryptResult, ErrorInfo, Fingerprint, HashAlgorithm, HashResult, KeyValidation,
    KeyValidator, OutputEncoding, PaddingScheme, Pbkdf2Prf, RsaKeySize, RsaPadding, SecretBuffer, SignatureResult,
    SymmetricAlgorithm, ValidationOptions,
};
