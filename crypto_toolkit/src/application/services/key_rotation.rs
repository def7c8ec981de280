// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Key Rotation Engine
//!
//! Versioned key registry with exactly one active version at any instant.
//! Ciphertext leaves the engine tagged with the version that produced it;
//! decryption routes by that tag, so deprecated keys keep decrypting long
//! after they stop encrypting.
//!
//! The engine is not a singleton: every caller owns its registry. The
//! active-pointer swap in `rotate_key` happens under one write lock, so
//! concurrent `encrypt`/`decrypt` calls see either the old or the new
//! active version, never neither.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

use crypto_toolkit_domain::entities::{KeyInfo, KeyInfoExport};
use crypto_toolkit_domain::value_objects::{AesKeySize, CipherMode, DecryptResult, EncryptResult, KeyVersion};
use crypto_toolkit_domain::{CryptoError, SecretBuffer};

use crate::application::runtime::CoreRuntime;
use crate::application::services::symmetric::{SymmetricFacade, SymmetricOptions};

/// Ciphertext envelope tagged with the producing key version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionedEncryptResult {
    #[serde(flatten)]
    pub result: EncryptResult,
    #[serde(rename = "keyVersion", skip_serializing_if = "Option::is_none")]
    pub key_version: Option<String>,
}

/// Per-item outcome of a re-encryption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReencryptOutcome {
    pub success: bool,
    #[serde(rename = "oldKeyVersion", skip_serializing_if = "Option::is_none")]
    pub old_key_version: Option<String>,
    #[serde(rename = "newKeyVersion", skip_serializing_if = "Option::is_none")]
    pub new_key_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub envelope: Option<VersionedEncryptResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Lossless registry snapshot: material Base64, dates ISO-8601.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryExport {
    pub keys: Vec<KeyInfoExport>,
    #[serde(rename = "activeKeyVersion", skip_serializing_if = "Option::is_none")]
    pub active_key_version: Option<String>,
}

struct Registry {
    keys: HashMap<KeyVersion, KeyInfo>,
    active: Option<KeyVersion>,
}

/// Versioned key registry plus the encrypt/decrypt/re-encrypt operations
/// that consult it.
pub struct KeyRotationEngine<'r> {
    runtime: &'r CoreRuntime,
    registry: RwLock<Registry>,
}

impl<'r> KeyRotationEngine<'r> {
    pub fn new(runtime: &'r CoreRuntime) -> Self {
        Self {
            runtime,
            registry: RwLock::new(Registry {
                keys: HashMap::new(),
                active: None,
            }),
        }
    }

    /// Registers a new key version. Registering an existing version is an
    /// error; versions are immutable once created.
    pub fn add_key(&self, version: &str, material: &[u8], expires_at: Option<DateTime<Utc>>) -> Result<(), CryptoError> {
        let version = KeyVersion::new(version)?;
        if material.is_empty() {
            return Err(CryptoError::invalid_key("key material must not be empty"));
        }
        let mut registry = self.registry.write();
        if registry.keys.contains_key(&version) {
            return Err(CryptoError::invalid_state(format!(
                "key version '{}' already exists",
                version
            )));
        }
        registry
            .keys
            .insert(version.clone(), KeyInfo::new(version, SecretBuffer::from_slice(material), expires_at));
        Ok(())
    }

    /// Makes the version active, deactivating the prior one.
    pub fn set_active_key(&self, version: &str) -> Result<(), CryptoError> {
        let version = KeyVersion::new(version)?;
        let mut registry = self.registry.write();
        let now = Utc::now();
        {
            let key = registry
                .keys
                .get(&version)
                .ok_or_else(|| CryptoError::KeyNotFound(version.to_string()))?;
            if key.is_expired_at(now) {
                return Err(CryptoError::KeyExpired(version.to_string()));
            }
        }
        if let Some(previous) = registry.active.take() {
            if let Some(previous) = registry.keys.get_mut(&previous) {
                previous.deactivate();
            }
        }
        if let Some(key) = registry.keys.get_mut(&version) {
            key.activate()?;
        }
        registry.active = Some(version.clone());
        info!(version = %version, "key version activated");
        Ok(())
    }

    /// Atomic deprecate-then-add-then-activate.
    pub fn rotate_key(
        &self,
        new_version: &str,
        material: &[u8],
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), CryptoError> {
        let new_version = KeyVersion::new(new_version)?;
        if material.is_empty() {
            return Err(CryptoError::invalid_key("key material must not be empty"));
        }
        let mut registry = self.registry.write();
        if registry.keys.contains_key(&new_version) {
            return Err(CryptoError::invalid_state(format!(
                "key version '{}' already exists",
                new_version
            )));
        }
        if let Some(previous) = registry.active.take() {
            if let Some(previous) = registry.keys.get_mut(&previous) {
                previous.deprecate();
            }
        }
        let mut key = KeyInfo::new(new_version.clone(), SecretBuffer::from_slice(material), expires_at);
        key.activate()?;
        registry.keys.insert(new_version.clone(), key);
        registry.active = Some(new_version.clone());
        info!(version = %new_version, "key rotated");
        Ok(())
    }

    /// Removes a version. Removing the active version is forbidden.
    pub fn remove_key(&self, version: &str) -> Result<(), CryptoError> {
        let version = KeyVersion::new(version)?;
        let mut registry = self.registry.write();
        if registry.active.as_ref() == Some(&version) {
            return Err(CryptoError::invalid_state("cannot remove the active key version"));
        }
        registry
            .keys
            .remove(&version)
            .map(|_| ())
            .ok_or_else(|| CryptoError::KeyNotFound(version.to_string()))
    }

    /// Removes expired, non-active versions; returns how many went away.
    pub fn cleanup_expired_keys(&self) -> usize {
        let mut registry = self.registry.write();
        let now = Utc::now();
        let active = registry.active.clone();
        let before = registry.keys.len();
        registry
            .keys
            .retain(|version, key| Some(version) == active.as_ref() || !key.is_expired_at(now));
        before - registry.keys.len()
    }

    pub fn active_version(&self) -> Option<String> {
        self.registry.read().active.as_ref().map(|v| v.to_string())
    }

    pub fn len(&self) -> usize {
        self.registry.read().keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Encrypts under the active key; the envelope carries the version.
    pub fn encrypt(&self, plaintext: &[u8], options: &SymmetricOptions) -> VersionedEncryptResult {
        let gate = self.runtime.rate_limiter().check();
        let outcome = gate.and_then(|_| {
            let registry = self.registry.read();
            let version = registry
                .active
                .clone()
                .ok_or_else(|| CryptoError::invalid_state("no active key version"))?;
            let key = registry
                .keys
                .get(&version)
                .ok_or_else(|| CryptoError::KeyNotFound(version.to_string()))?;
            if key.is_expired_at(Utc::now()) {
                return Err(CryptoError::KeyExpired(version.to_string()));
            }
            let material = SecretBuffer::from_slice(key.material());
            drop(registry);

            let algorithm = crypto_toolkit_domain::SymmetricAlgorithm::Aes;
            let result = SymmetricFacade::new(self.runtime).encrypt_with_key_bytes(
                algorithm,
                plaintext,
                material.as_slice(),
                options,
            );
            Ok((version, result))
        });
        match outcome {
            Ok((version, result)) => VersionedEncryptResult {
                key_version: result.success.then(|| version.to_string()),
                result,
            },
            Err(error) => VersionedEncryptResult {
                result: EncryptResult::failure("AES", &error),
                key_version: None,
            },
        }
    }

    /// Decrypts an envelope, routing to the version it names. Deprecated
    /// versions still decrypt; unknown versions fail with `KeyNotFound`.
    pub fn decrypt(&self, envelope: &VersionedEncryptResult) -> DecryptResult {
        let outcome = (|| {
            let version = envelope
                .key_version
                .as_deref()
                .ok_or_else(|| CryptoError::invalid_input("envelope carries no key version"))?;
            let version = KeyVersion::new(version)?;
            let registry = self.registry.read();
            let key = registry
                .keys
                .get(&version)
                .ok_or_else(|| CryptoError::KeyNotFound(version.to_string()))?;
            let material = SecretBuffer::from_slice(key.material());
            drop(registry);

            let options = Self::options_from_envelope(envelope)?;
            let data = envelope
                .result
                .data
                .as_deref()
                .ok_or_else(|| CryptoError::invalid_input("envelope carries no data"))?;
            Ok::<_, CryptoError>(SymmetricFacade::new(self.runtime).decrypt_with_key_bytes(
                crypto_toolkit_domain::SymmetricAlgorithm::Aes,
                data,
                material.as_slice(),
                &options,
            ))
        })();
        outcome.unwrap_or_else(|error| DecryptResult::failure("AES", &error))
    }

    /// Decrypts with the envelope's version and re-encrypts with the
    /// active one.
    pub fn reencrypt(&self, envelope: &VersionedEncryptResult) -> ReencryptOutcome {
        let old_version = envelope.key_version.clone();
        let new_version = self.active_version();

        if old_version == new_version {
            return ReencryptOutcome {
                success: true,
                old_key_version: old_version,
                new_key_version: new_version,
                envelope: Some(envelope.clone()),
                error: None,
            };
        }

        let decrypted = self.decrypt(envelope);
        let plaintext = match decrypted.ok().and_then(|d| d.data_bytes()) {
            Ok(plaintext) => plaintext,
            Err(error) => {
                return ReencryptOutcome {
                    success: false,
                    old_key_version: old_version,
                    new_key_version: new_version,
                    envelope: None,
                    error: Some(error.to_string()),
                }
            }
        };

        let reencrypted = self.encrypt(&plaintext, &SymmetricOptions::default());
        if reencrypted.result.success {
            ReencryptOutcome {
                success: true,
                old_key_version: old_version,
                new_key_version: reencrypted.key_version.clone(),
                envelope: Some(reencrypted),
                error: None,
            }
        } else {
            ReencryptOutcome {
                success: false,
                old_key_version: old_version,
                new_key_version: new_version,
                envelope: None,
                error: reencrypted.result.error.map(|e| e.message),
            }
        }
    }

    /// Re-encrypts a batch in parallel. Individual failures never abort
    /// the batch; outcomes keep the input order.
    pub fn reencrypt_batch(&self, envelopes: &[VersionedEncryptResult]) -> Vec<ReencryptOutcome> {
        envelopes.par_iter().map(|envelope| self.reencrypt(envelope)).collect()
    }

    /// Lossless registry snapshot.
    pub fn export(&self) -> RegistryExport {
        let registry = self.registry.read();
        let mut keys: Vec<KeyInfoExport> = registry.keys.values().map(KeyInfo::export).collect();
        keys.sort_by(|a, b| a.version.cmp(&b.version));
        RegistryExport {
            keys,
            active_key_version: registry.active.as_ref().map(|v| v.to_string()),
        }
    }

    pub fn export_json(&self) -> Result<String, CryptoError> {
        serde_json::to_string_pretty(&self.export()).map_err(CryptoError::from)
    }

    /// Replaces the registry with an exported snapshot.
    pub fn import(&self, export: RegistryExport) -> Result<(), CryptoError> {
        let mut keys = HashMap::new();
        for entry in export.keys {
            let key = KeyInfo::from_export(entry)?;
            keys.insert(key.version().clone(), key);
        }
        let active = match export.active_key_version {
            Some(version) => {
                let version = KeyVersion::new(version)?;
                if !keys.contains_key(&version) {
                    return Err(CryptoError::KeyNotFound(version.to_string()));
                }
                Some(version)
            }
            None => None,
        };
        *self.registry.write() = Registry { keys, active };
        Ok(())
    }

    pub fn import_json(&self, raw: &str) -> Result<(), CryptoError> {
        self.import(serde_json::from_str(raw)?)
    }

    fn options_from_envelope(envelope: &VersionedEncryptResult) -> Result<SymmetricOptions, CryptoError> {
        let mode = match envelope.result.mode.as_deref() {
            Some(mode) => mode.parse::<CipherMode>()?,
            None => CipherMode::Cbc,
        };
        let key_size = match envelope.result.key_size {
            Some(bits) => AesKeySize::from_bits(bits)?,
            None => AesKeySize::Bits256,
        };
        Ok(SymmetricOptions {
            mode,
            key_size,
            iv: envelope.result.iv.clone(),
            ..SymmetricOptions::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::runtime::CoreRuntime;
    use chrono::Duration;

    fn engine(runtime: &CoreRuntime) -> KeyRotationEngine<'_> {
        KeyRotationEngine::new(runtime)
    }

    /// Tests the rotation reference scenario: encrypt under v1, rotate to
    /// v2, re-encrypt, decrypt under the registry.
    #[test]
    fn test_rotate_and_reencrypt() {
        let runtime = CoreRuntime::new();
        let engine = engine(&runtime);

        engine.add_key("v1", &[0xAAu8; 32], None).unwrap();
        engine.set_active_key("v1").unwrap();
        let envelope = engine.encrypt(b"data", &SymmetricOptions::default());
        assert!(envelope.result.success);
        assert_eq!(envelope.key_version.as_deref(), Some("v1"));

        engine.rotate_key("v2", &[0xBBu8; 32], None).unwrap();
        assert_eq!(engine.active_version().as_deref(), Some("v2"));

        let outcome = engine.reencrypt(&envelope);
        assert!(outcome.success);
        assert_eq!(outcome.old_key_version.as_deref(), Some("v1"));
        assert_eq!(outcome.new_key_version.as_deref(), Some("v2"));

        let restored = engine.decrypt(outcome.envelope.as_ref().unwrap());
        assert_eq!(restored.text().unwrap(), "data");

        // The deprecated version still decrypts the old envelope.
        let old = engine.decrypt(&envelope);
        assert_eq!(old.text().unwrap(), "data");
    }

    /// Tests that exactly one version is active across transitions.
    #[test]
    fn test_single_active_invariant() {
        let runtime = CoreRuntime::new();
        let engine = engine(&runtime);
        engine.add_key("v1", &[1u8; 32], None).unwrap();
        engine.add_key("v2", &[2u8; 32], None).unwrap();
        engine.set_active_key("v1").unwrap();
        engine.set_active_key("v2").unwrap();

        let export = engine.export();
        let active: Vec<_> = export.keys.iter().filter(|k| k.active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].version, "v2");
    }

    /// Tests lifecycle refusals.
    ///
    /// Validates that:
    /// - Duplicate versions are rejected
    /// - Removing the active version is InvalidState
    /// - Unknown versions fail decryption with KeyNotFound
    #[test]
    fn test_lifecycle_refusals() {
        let runtime = CoreRuntime::new();
        let engine = engine(&runtime);
        engine.add_key("v1", &[1u8; 32], None).unwrap();
        assert!(matches!(
            engine.add_key("v1", &[2u8; 32], None),
            Err(CryptoError::InvalidState(_))
        ));

        engine.set_active_key("v1").unwrap();
        assert!(matches!(engine.remove_key("v1"), Err(CryptoError::InvalidState(_))));
        assert!(matches!(
            engine.set_active_key("ghost"),
            Err(CryptoError::KeyNotFound(_))
        ));

        let mut envelope = engine.encrypt(b"x", &SymmetricOptions::default());
        envelope.key_version = Some("ghost".to_string());
        let result = engine.decrypt(&envelope);
        assert!(!result.success);
        assert_eq!(result.error.unwrap().kind, "KeyNotFound");
    }

    #[test]
    fn test_expired_keys() {
        let runtime = CoreRuntime::new();
        let engine = engine(&runtime);
        let past = Utc::now() - Duration::seconds(5);
        engine.add_key("stale", &[1u8; 32], Some(past)).unwrap();
        engine.add_key("fresh", &[2u8; 32], None).unwrap();

        assert!(matches!(engine.set_active_key("stale"), Err(CryptoError::KeyExpired(_))));
        engine.set_active_key("fresh").unwrap();
        assert_eq!(engine.cleanup_expired_keys(), 1);
        assert_eq!(engine.len(), 1);
    }

    /// Tests batch re-encryption with a poisoned item in the middle.
    #[test]
    fn test_reencrypt_batch_is_per_item() {
        let runtime = CoreRuntime::new();
        let engine = engine(&runtime);
        engine.add_key("v1", &[3u8; 32], None).unwrap();
        engine.set_active_key("v1").unwrap();

        let good_a = engine.encrypt(b"alpha", &SymmetricOptions::default());
        let good_b = engine.encrypt(b"beta", &SymmetricOptions::default());
        let mut poisoned = good_a.clone();
        poisoned.key_version = Some("ghost".to_string());

        engine.rotate_key("v2", &[4u8; 32], None).unwrap();
        let outcomes = engine.reencrypt_batch(&[good_a, poisoned, good_b]);
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].success);
        assert!(!outcomes[1].success);
        assert!(outcomes[2].success);
        assert_eq!(outcomes[2].new_key_version.as_deref(), Some("v2"));
    }

    /// Tests the lossless export/import round trip.
    #[test]
    fn test_export_import_round_trip() {
        let runtime = CoreRuntime::new();
        let engine = engine(&runtime);
        engine.add_key("v1", &[5u8; 32], None).unwrap();
        engine.set_active_key("v1").unwrap();
        let envelope = engine.encrypt(b"survives import", &SymmetricOptions::default());

        let exported = engine.export_json().unwrap();
        let replacement = KeyRotationEngine::new(&runtime);
        replacement.import_json(&exported).unwrap();

        assert_eq!(replacement.active_version().as_deref(), Some("v1"));
        assert_eq!(replacement.decrypt(&envelope).text().unwrap(), "survives import");
    }
}
