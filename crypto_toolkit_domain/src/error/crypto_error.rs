// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error System
//!
//! This module provides the error taxonomy for the crypto toolkit domain.
//! Every public operation reports failure through a [`CryptoError`] wrapped
//! into a result record; no panic or exception crosses the public boundary.
//!
//! ## Error Architecture
//!
//! Errors are organized into stable kinds with fixed numeric codes so that
//! callers can branch on the kind rather than on message text:
//!
//! - **Input errors** (1000-1199): malformed arguments, unknown algorithms
//! - **Key and cipher errors** (2000-3099): bad keys, bad IVs, primitive
//!   failures during encryption or decryption
//! - **Derivation and lookup errors** (4000-5399): digest failures, key
//!   registry misses, expired keys, KDF failures
//! - **Transport errors** (6000-8099): encoding failures, rate limiting,
//!   persistence failures
//! - **Lifecycle errors** (9000-9299): timeouts, cancellation, operations
//!   invoked in the wrong state
//!
//! ## Uniform decryption failures
//!
//! `DecryptionFailed` deliberately does not distinguish a wrong key from
//! corrupted ciphertext or a bad padding block. Classification never depends
//! on plaintext, key bytes, or IV bytes, which keeps padding-oracle and
//! key-probing signals out of the API surface.
//!
//! ## Message sanitization
//!
//! User-visible messages pass through [`sanitize_message`], which redacts
//! any `key=`, `password=`, `secret=`, or `token=` value before the message
//! is surfaced or serialized.

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Domain-specific errors for the crypto toolkit.
///
/// Each variant represents a specific failure mode with a stable numeric
/// code. Messages provide context for debugging; the variant is the
/// authoritative signal and callers must never branch on message text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid IV: {0}")]
    InvalidIv(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Uniform decryption failure. Wrong key, corrupted ciphertext, and bad
    /// padding all surface this variant with the same message.
    #[error("Decryption failed")]
    DecryptionFailed,

    #[error("Hash operation failed: {0}")]
    HashFailed(String),

    #[error("Key version not found: {0}")]
    KeyNotFound(String),

    #[error("Key expired: {0}")]
    KeyExpired(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Encoding failed: {0}")]
    EncodingFailed(String),

    #[error("Rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("Storage failed: {0}")]
    StorageFailed(String),

    #[error("Operation deadline exceeded: {0}")]
    Timeout(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl CryptoError {
    /// Creates a new invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Creates a new unsupported algorithm error
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedAlgorithm(msg.into())
    }

    /// Creates a new invalid key error
    pub fn invalid_key(msg: impl Into<String>) -> Self {
        Self::InvalidKey(msg.into())
    }

    /// Creates a new encryption failure
    pub fn encryption_failed(msg: impl Into<String>) -> Self {
        Self::EncryptionFailed(msg.into())
    }

    /// Creates a new storage failure
    pub fn storage_failed(msg: impl Into<String>) -> Self {
        Self::StorageFailed(msg.into())
    }

    /// Creates a new invalid state error
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Stable numeric code for this error kind.
    pub fn code(&self) -> u32 {
        match self {
            CryptoError::InvalidInput(_) => 1000,
            CryptoError::UnsupportedAlgorithm(_) => 1100,
            CryptoError::InvalidKey(_) => 2000,
            CryptoError::InvalidIv(_) => 2100,
            CryptoError::EncryptionFailed(_) => 2200,
            CryptoError::DecryptionFailed => 3000,
            CryptoError::HashFailed(_) => 4000,
            CryptoError::KeyNotFound(_) => 5100,
            CryptoError::KeyExpired(_) => 5200,
            CryptoError::KeyDerivationFailed(_) => 5300,
            CryptoError::EncodingFailed(_) => 6000,
            CryptoError::RateLimited { .. } => 7000,
            CryptoError::StorageFailed(_) => 8000,
            CryptoError::Timeout(_) => 9000,
            CryptoError::Cancelled(_) => 9100,
            CryptoError::InvalidState(_) => 9200,
        }
    }

    /// Stable kind name used on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            CryptoError::InvalidInput(_) => "InvalidInput",
            CryptoError::UnsupportedAlgorithm(_) => "UnsupportedAlgorithm",
            CryptoError::InvalidKey(_) => "InvalidKey",
            CryptoError::InvalidIv(_) => "InvalidIV",
            CryptoError::EncryptionFailed(_) => "EncryptionFailed",
            CryptoError::DecryptionFailed => "DecryptionFailed",
            CryptoError::HashFailed(_) => "HashFailed",
            CryptoError::KeyNotFound(_) => "KeyNotFound",
            CryptoError::KeyExpired(_) => "KeyExpired",
            CryptoError::KeyDerivationFailed(_) => "KeyDerivationFailed",
            CryptoError::EncodingFailed(_) => "EncodingFailed",
            CryptoError::RateLimited { .. } => "RateLimited",
            CryptoError::StorageFailed(_) => "StorageFailed",
            CryptoError::Timeout(_) => "Timeout",
            CryptoError::Cancelled(_) => "Cancelled",
            CryptoError::InvalidState(_) => "InvalidState",
        }
    }

    /// Gets the error category
    pub fn category(&self) -> &'static str {
        match self {
            CryptoError::InvalidInput(_) | CryptoError::UnsupportedAlgorithm(_) => "input",
            CryptoError::InvalidKey(_) | CryptoError::InvalidIv(_) => "key",
            CryptoError::EncryptionFailed(_) | CryptoError::DecryptionFailed => "cipher",
            CryptoError::HashFailed(_) | CryptoError::KeyDerivationFailed(_) => "digest",
            CryptoError::KeyNotFound(_) | CryptoError::KeyExpired(_) => "rotation",
            CryptoError::EncodingFailed(_) => "encoding",
            CryptoError::RateLimited { .. } => "throttle",
            CryptoError::StorageFailed(_) => "storage",
            CryptoError::Timeout(_) | CryptoError::Cancelled(_) | CryptoError::InvalidState(_) => "lifecycle",
        }
    }

    /// Checks if the error indicates a retriable condition
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CryptoError::RateLimited { .. } | CryptoError::StorageFailed(_) | CryptoError::Timeout(_)
        )
    }

    /// Checks if the error must stay uniform at the API boundary
    pub fn is_uniform(&self) -> bool {
        matches!(self, CryptoError::DecryptionFailed)
    }
}

// Implement conversion from standard library errors
impl From<std::io::Error> for CryptoError {
    fn from(err: std::io::Error) -> Self {
        CryptoError::StorageFailed(err.to_string())
    }
}

impl From<serde_json::Error> for CryptoError {
    fn from(err: serde_json::Error) -> Self {
        CryptoError::EncodingFailed(err.to_string())
    }
}

static SENSITIVE_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(key|password|secret|token)=\S+").expect("static redaction pattern"));

/// Redacts sensitive `name=value` pairs from an error message.
///
/// Any substring matching `key=`, `password=`, `secret=`, or `token=`
/// followed by non-whitespace is replaced before the message is surfaced.
pub fn sanitize_message(message: &str) -> String {
    SENSITIVE_PAIR.replace_all(message, "$1=[REDACTED]").into_owned()
}

/// Serializable error record carried inside result records.
///
/// The `kind` string is authoritative for control flow; `message` is
/// sanitized, human-readable context only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: String,
    pub code: u32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    /// Kind-specific structured context (e.g. `retryAfterMs` for
    /// `RateLimited`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl ErrorInfo {
    /// Builds a sanitized wire record from a domain error.
    pub fn from_error(error: &CryptoError, algorithm: Option<&str>) -> Self {
        let details = match error {
            CryptoError::RateLimited { retry_after_ms } => {
                Some(serde_json::json!({ "retryAfterMs": retry_after_ms }))
            }
            _ => None,
        };
        Self {
            kind: error.kind().to_string(),
            code: error.code(),
            message: sanitize_message(&error.to_string()),
            algorithm: algorithm.map(|a| a.to_string()),
            details,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// Retry hint for rate-limited operations, if present.
    pub fn retry_after_ms(&self) -> Option<u64> {
        self.details
            .as_ref()
            .and_then(|details| details.get("retryAfterMs"))
            .and_then(serde_json::Value::as_u64)
    }
}
