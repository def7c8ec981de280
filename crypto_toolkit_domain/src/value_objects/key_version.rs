// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Key version identifier for the rotation registry.
//!
//! A version is a non-empty, trimmed, printable string chosen by the caller
//! (`"v1"`, `"2025-q3"`, ...). Versions are compared verbatim; the registry
//! never infers ordering from them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CryptoError;

/// Validated key version identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyVersion(String);

impl KeyVersion {
    pub const MAX_LEN: usize = 128;

    pub fn new(version: impl Into<String>) -> Result<Self, CryptoError> {
        let version = version.into();
        let trimmed = version.trim();
        if trimmed.is_empty() {
            return Err(CryptoError::invalid_input("key version must not be empty"));
        }
        if trimmed.len() > Self::MAX_LEN {
            return Err(CryptoError::invalid_input(format!(
                "key version exceeds {} characters",
                Self::MAX_LEN
            )));
        }
        if trimmed.chars().any(|c| c.is_control()) {
            return Err(CryptoError::invalid_input("key version must not contain control characters"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_version_accepts_reasonable_ids() {
        assert_eq!(KeyVersion::new("v1").unwrap().as_str(), "v1");
        assert_eq!(KeyVersion::new("  2025-q3  ").unwrap().as_str(), "2025-q3");
    }

    #[test]
    fn test_key_version_rejects_empty_and_control() {
        assert!(KeyVersion::new("").is_err());
        assert!(KeyVersion::new("   ").is_err());
        assert!(KeyVersion::new("v\n1").is_err());
        assert!(KeyVersion::new("x".repeat(200)).is_err());
    }
}
