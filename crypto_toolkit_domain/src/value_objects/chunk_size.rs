// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Chunk Size Value Object
//!
//! Type-safe representation of the chunk sizes consumed by the streaming
//! engine. Chunk sizes are validated at creation time and immutable
//! afterwards; two chunk sizes are equal if they carry the same byte count.
//!
//! ## Constraints
//!
//! - **Minimum**: 1 byte. Zero-byte chunks are meaningless to the stream
//!   processor.
//! - **Maximum**: 512 MiB. Larger chunks defeat the point of chunked
//!   processing and would let a single `update` call monopolize memory.
//! - **Default**: 64 KiB, the streaming engine's preferred read size.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CryptoError;

/// Validated chunk size for streaming operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChunkSize(usize);

impl ChunkSize {
    /// Minimum allowed chunk size in bytes.
    pub const MIN_BYTES: usize = 1;

    /// Maximum allowed chunk size in bytes (512 MiB).
    pub const MAX_BYTES: usize = 512 * 1024 * 1024;

    /// Default chunk size in bytes (64 KiB).
    pub const DEFAULT_BYTES: usize = 64 * 1024;

    /// Creates a chunk size, validating the bounds.
    pub fn new(bytes: usize) -> Result<Self, CryptoError> {
        if bytes < Self::MIN_BYTES {
            return Err(CryptoError::invalid_input("chunk size must be at least 1 byte"));
        }
        if bytes > Self::MAX_BYTES {
            return Err(CryptoError::invalid_input(format!(
                "chunk size {} exceeds maximum of {} bytes",
                bytes,
                Self::MAX_BYTES
            )));
        }
        Ok(Self(bytes))
    }

    /// Creates a chunk size from whole kibibytes.
    pub fn from_kib(kib: usize) -> Result<Self, CryptoError> {
        kib.checked_mul(1024)
            .ok_or_else(|| CryptoError::invalid_input("chunk size overflow"))
            .and_then(Self::new)
    }

    /// Creates a chunk size from whole mebibytes.
    pub fn from_mib(mib: usize) -> Result<Self, CryptoError> {
        mib.checked_mul(1024 * 1024)
            .ok_or_else(|| CryptoError::invalid_input("chunk size overflow"))
            .and_then(Self::new)
    }

    pub fn bytes(&self) -> usize {
        self.0
    }
}

impl Default for ChunkSize {
    fn default() -> Self {
        Self(Self::DEFAULT_BYTES)
    }
}

impl fmt::Display for ChunkSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 >= 1024 * 1024 && self.0 % (1024 * 1024) == 0 {
            write!(f, "{}MiB", self.0 / (1024 * 1024))
        } else if self.0 >= 1024 && self.0 % 1024 == 0 {
            write!(f, "{}KiB", self.0 / 1024)
        } else {
            write!(f, "{}B", self.0)
        }
    }
}
