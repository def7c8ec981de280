// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Operation Fingerprint
//!
//! A fingerprint is the cache key for deterministic operations: a SHA-256
//! digest over the operation name, algorithm parameters, input bytes, key
//! bytes, and ancillary material. Each field is framed with its length
//! before hashing so that no two distinct field sequences can collide by
//! concatenation (`("ab", "c")` never fingerprints like `("a", "bc")`).
//!
//! Key bytes are folded into the digest, never stored: the fingerprint
//! reveals nothing recoverable about the key.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Collision-resistant tag identifying a deterministic operation and its
/// complete parameter set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Starts a fingerprint over the named operation.
    pub fn builder(operation: &str) -> FingerprintBuilder {
        let mut hasher = Sha256::new();
        hasher.update((operation.len() as u64).to_le_bytes());
        hasher.update(operation.as_bytes());
        FingerprintBuilder { hasher }
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex form used as the cache map key.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Incremental fingerprint construction with length-framed fields.
pub struct FingerprintBuilder {
    hasher: Sha256,
}

impl FingerprintBuilder {
    /// Folds a named byte field into the fingerprint.
    pub fn field(mut self, name: &str, value: &[u8]) -> Self {
        self.hasher.update((name.len() as u64).to_le_bytes());
        self.hasher.update(name.as_bytes());
        self.hasher.update((value.len() as u64).to_le_bytes());
        self.hasher.update(value);
        self
    }

    /// Folds a named textual field into the fingerprint.
    pub fn text(self, name: &str, value: &str) -> Self {
        self.field(name, value.as_bytes())
    }

    /// Folds a named integer field into the fingerprint.
    pub fn number(self, name: &str, value: u64) -> Self {
        self.field(name, &value.to_le_bytes())
    }

    pub fn finish(self) -> Fingerprint {
        Fingerprint(self.hasher.finalize().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests that fingerprints are deterministic over identical inputs.
    #[test]
    fn test_fingerprint_deterministic() {
        let a = Fingerprint::builder("hash").text("algo", "SHA256").field("input", b"hello").finish();
        let b = Fingerprint::builder("hash").text("algo", "SHA256").field("input", b"hello").finish();
        assert_eq!(a, b);
        assert_eq!(a.to_hex().len(), 64);
    }

    /// Tests that field framing prevents concatenation collisions.
    ///
    /// Validates that:
    /// - Splitting the same bytes across fields differently changes the tag
    /// - Distinct operations never share a tag for identical fields
    #[test]
    fn test_fingerprint_framing_resists_ambiguity() {
        let ab_c = Fingerprint::builder("op").field("x", b"ab").field("y", b"c").finish();
        let a_bc = Fingerprint::builder("op").field("x", b"a").field("y", b"bc").finish();
        assert_ne!(ab_c, a_bc);

        let op1 = Fingerprint::builder("encrypt").field("input", b"data").finish();
        let op2 = Fingerprint::builder("decrypt").field("input", b"data").finish();
        assert_ne!(op1, op2);
    }

    #[test]
    fn test_fingerprint_sensitive_to_every_field() {
        let base = Fingerprint::builder("derive").number("iterations", 1000).field("salt", b"s1").finish();
        let changed = Fingerprint::builder("derive").number("iterations", 1001).field("salt", b"s1").finish();
        assert_ne!(base, changed);
    }
}
