// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Key Info Entity
//!
//! Registry entry for one versioned key. `KeyInfo` is mutated only by the
//! key rotation engine: it is created by `add_key`, activated by
//! `set_active_key`, deprecated by `rotate_key`, and removed by
//! `remove_key`. The key material lives in a [`SecretBuffer`] and is zeroed
//! when the entry is dropped.
//!
//! The registry's lossless export form ([`KeyInfoExport`]) carries the
//! material as Base64 and the dates as ISO-8601; it exists only for
//! `export`/`import` round trips and should be handled like the key
//! material it contains.

use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CryptoError;
use crate::security::SecretBuffer;
use crate::value_objects::KeyVersion;

/// One versioned key held by the rotation registry.
#[derive(Debug)]
pub struct KeyInfo {
    version: KeyVersion,
    material: SecretBuffer,
    created_at: DateTime<Utc>,
    active: bool,
    deprecated: bool,
    expires_at: Option<DateTime<Utc>>,
}

impl KeyInfo {
    pub fn new(version: KeyVersion, material: SecretBuffer, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            version,
            material,
            created_at: Utc::now(),
            active: false,
            deprecated: false,
            expires_at,
        }
    }

    pub fn version(&self) -> &KeyVersion {
        &self.version
    }

    pub fn material(&self) -> &[u8] {
        self.material.as_slice()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }

    /// Marks the key active. Deprecated keys cannot be reactivated.
    pub fn activate(&mut self) -> Result<(), CryptoError> {
        if self.deprecated {
            return Err(CryptoError::invalid_state(format!(
                "key version '{}' is deprecated",
                self.version
            )));
        }
        self.active = true;
        Ok(())
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Marks the key deprecated: usable for decryption only.
    pub fn deprecate(&mut self) {
        self.active = false;
        self.deprecated = true;
    }

    /// Lossless export record for this entry.
    pub fn export(&self) -> KeyInfoExport {
        KeyInfoExport {
            version: self.version.as_str().to_string(),
            material: base64::engine::general_purpose::STANDARD.encode(self.material.as_slice()),
            created_at: self.created_at,
            active: self.active,
            deprecated: self.deprecated,
            expires_at: self.expires_at,
        }
    }

    /// Rebuilds an entry from its export record.
    pub fn from_export(export: KeyInfoExport) -> Result<Self, CryptoError> {
        let version = KeyVersion::new(export.version)?;
        let material = base64::engine::general_purpose::STANDARD
            .decode(&export.material)
            .map_err(|e| CryptoError::EncodingFailed(format!("key material is not Base64: {}", e)))?;
        Ok(Self {
            version,
            material: SecretBuffer::new(material),
            created_at: export.created_at,
            active: export.active,
            deprecated: export.deprecated,
            expires_at: export.expires_at,
        })
    }
}

/// Serializable projection of a [`KeyInfo`]; material is Base64, dates are
/// ISO-8601.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyInfoExport {
    pub version: String,
    pub material: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    pub active: bool,
    pub deprecated: bool,
    #[serde(rename = "expiresAt", skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample() -> KeyInfo {
        KeyInfo::new(
            KeyVersion::new("v1").unwrap(),
            SecretBuffer::from_slice(&[7u8; 32]),
            None,
        )
    }

    /// Tests the activate / deprecate lifecycle.
    ///
    /// Validates that:
    /// - New keys start inactive and non-deprecated
    /// - Deprecation clears the active flag
    /// - Deprecated keys refuse reactivation
    #[test]
    fn test_lifecycle_transitions() {
        let mut key = sample();
        assert!(!key.is_active());
        key.activate().unwrap();
        assert!(key.is_active());
        key.deprecate();
        assert!(!key.is_active());
        assert!(key.is_deprecated());
        assert!(key.activate().is_err());
    }

    #[test]
    fn test_expiry_check() {
        let now = Utc::now();
        let expired = KeyInfo::new(
            KeyVersion::new("old").unwrap(),
            SecretBuffer::from_slice(&[1u8; 16]),
            Some(now - Duration::seconds(1)),
        );
        assert!(expired.is_expired_at(now));
        assert!(!sample().is_expired_at(now));
    }

    /// Tests that export/import round-trips the full entry state.
    #[test]
    fn test_export_import_round_trip() {
        let mut key = sample();
        key.activate().unwrap();
        let export = key.export();
        let json = serde_json::to_string(&export).unwrap();
        let back = KeyInfo::from_export(serde_json::from_str(&json).unwrap()).unwrap();
        assert_eq!(back.version().as_str(), "v1");
        assert_eq!(back.material(), &[7u8; 32]);
        assert!(back.is_active());
        assert!(!back.is_deprecated());
        assert_eq!(back.created_at(), key.created_at());
    }
}
