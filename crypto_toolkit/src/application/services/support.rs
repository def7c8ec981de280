// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Shared helpers for the facade services: key normalization and the
//! deadline/cancellation checks every operation performs at its dispatch
//! points.

use sha2::{Digest, Sha256};
use std::time::Instant;

use crypto_toolkit_domain::{CryptoError, SecretBuffer};

use crate::application::runtime::CancellationFlag;

/// Deadline and cancellation context carried by an operation.
///
/// Both are observed at dispatch points: before the primitive runs and
/// again before the result is returned. A primitive that already started
/// is allowed to finish; its output is discarded.
#[derive(Debug, Clone, Default)]
pub struct OperationOptions {
    pub deadline: Option<Instant>,
    pub cancel: Option<CancellationFlag>,
}

impl OperationOptions {
    pub fn check(&self, operation: &str) -> Result<(), CryptoError> {
        if let Some(cancel) = &self.cancel {
            if cancel.is_cancelled() {
                return Err(CryptoError::Cancelled(format!("{} cancelled", operation)));
            }
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(CryptoError::Timeout(format!("{} deadline exceeded", operation)));
            }
        }
        Ok(())
    }
}

/// Normalizes textual key material to an exact byte length.
///
/// The spelling rules are deterministic and applied identically on both
/// sides of a round trip:
///
/// 1. a hex string decoding to exactly the target length is decoded
/// 2. a string whose UTF-8 bytes are exactly the target length is used raw
/// 3. anything else is stretched through SHA-256
pub fn normalize_key(key: &str, target_len: usize) -> Result<SecretBuffer, CryptoError> {
    if key.is_empty() {
        return Err(CryptoError::invalid_key("key must not be empty"));
    }
    if key.len() == target_len * 2 && key.chars().all(|c| c.is_ascii_hexdigit()) {
        let decoded = hex::decode(key).map_err(|e| CryptoError::invalid_key(format!("hex key rejected: {}", e)))?;
        return Ok(SecretBuffer::new(decoded));
    }
    if key.len() == target_len {
        return Ok(SecretBuffer::from_slice(key.as_bytes()));
    }
    Ok(stretch_key(key.as_bytes(), target_len))
}

/// Fits raw key bytes to an exact length: exact material passes through,
/// everything else is stretched.
pub fn normalize_key_bytes(key: &[u8], target_len: usize) -> Result<SecretBuffer, CryptoError> {
    if key.is_empty() {
        return Err(CryptoError::invalid_key("key must not be empty"));
    }
    if key.len() == target_len {
        return Ok(SecretBuffer::from_slice(key));
    }
    Ok(stretch_key(key, target_len))
}

/// Counter-mode SHA-256 expansion truncated to the target length.
fn stretch_key(material: &[u8], target_len: usize) -> SecretBuffer {
    let mut out = Vec::with_capacity(target_len);
    let mut counter = 0u8;
    while out.len() < target_len {
        let mut hasher = Sha256::new();
        hasher.update(material);
        hasher.update([counter]);
        out.extend_from_slice(&hasher.finalize());
        counter = counter.wrapping_add(1);
    }
    out.truncate(target_len);
    SecretBuffer::new(out)
}
