// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Symmetric Cipher Facade
//!
//! Public encrypt/decrypt operations for AES, DES, 3DES, and Blowfish.
//! Every operation follows the same shape: validate inputs, derive
//! ancillary material (IV when the mode needs one), consult the
//! memoization cache, dispatch to the primitive provider, and wrap the
//! outcome in a result record. No error escapes as a panic or a bare
//! `Err`; callers always receive a record.
//!
//! ## Caching
//!
//! Decryption is deterministic and memoized under a fingerprint of the
//! complete parameter set. Encryption is memoized only when the caller
//! pinned the IV; with an auto-generated IV two calls can never collide,
//! so caching would only pollute the tiers.
//!
//! ## Weak algorithms
//!
//! DES and 3DES work but their results carry an advisory warning. The
//! warning is metadata, never a failure.

use tracing::debug;

use crypto_toolkit_domain::services::SymmetricRequest;
use crypto_toolkit_domain::value_objects::{
    AesKeySize, CipherMode, DecryptResult, EncryptResult, Fingerprint, PaddingScheme, SymmetricAlgorithm,
};
use crypto_toolkit_domain::{CryptoError, SecretBuffer};

use crate::application::runtime::CoreRuntime;
use crate::application::services::support::{normalize_key, normalize_key_bytes, OperationOptions};
use crate::infrastructure::encoding::{self, EncodingKind};

/// Options for one symmetric operation.
#[derive(Debug, Clone)]
pub struct SymmetricOptions {
    pub mode: CipherMode,
    pub padding: PaddingScheme,
    /// AES key size; ignored by the fixed-key-length algorithms.
    pub key_size: AesKeySize,
    /// Hex IV. Auto-generated on encrypt when absent; required on decrypt
    /// for IV-bearing modes.
    pub iv: Option<String>,
    pub op: OperationOptions,
}

impl Default for SymmetricOptions {
    fn default() -> Self {
        Self {
            mode: CipherMode::Cbc,
            padding: PaddingScheme::Pkcs7,
            key_size: AesKeySize::Bits256,
            iv: None,
            op: OperationOptions::default(),
        }
    }
}

/// Facade over the symmetric cipher family.
pub struct SymmetricFacade<'r> {
    runtime: &'r CoreRuntime,
}

impl<'r> SymmetricFacade<'r> {
    pub fn new(runtime: &'r CoreRuntime) -> Self {
        Self { runtime }
    }

    // ---- public per-algorithm surface ------------------------------------

    pub fn encrypt_aes(&self, plaintext: &[u8], key: &str, options: &SymmetricOptions) -> EncryptResult {
        self.encrypt(SymmetricAlgorithm::Aes, plaintext, key, options)
    }

    pub fn decrypt_aes(&self, data_b64: &str, key: &str, options: &SymmetricOptions) -> DecryptResult {
        self.decrypt(SymmetricAlgorithm::Aes, data_b64, key, options)
    }

    pub fn encrypt_des(&self, plaintext: &[u8], key: &str, options: &SymmetricOptions) -> EncryptResult {
        self.encrypt(SymmetricAlgorithm::Des, plaintext, key, options)
    }

    pub fn decrypt_des(&self, data_b64: &str, key: &str, options: &SymmetricOptions) -> DecryptResult {
        self.decrypt(SymmetricAlgorithm::Des, data_b64, key, options)
    }

    pub fn encrypt_tripledes(&self, plaintext: &[u8], key: &str, options: &SymmetricOptions) -> EncryptResult {
        self.encrypt(SymmetricAlgorithm::TripleDes, plaintext, key, options)
    }

    pub fn decrypt_tripledes(&self, data_b64: &str, key: &str, options: &SymmetricOptions) -> DecryptResult {
        self.decrypt(SymmetricAlgorithm::TripleDes, data_b64, key, options)
    }

    pub fn encrypt_blowfish(&self, plaintext: &[u8], key: &str, options: &SymmetricOptions) -> EncryptResult {
        self.encrypt(SymmetricAlgorithm::Blowfish, plaintext, key, options)
    }

    pub fn decrypt_blowfish(&self, data_b64: &str, key: &str, options: &SymmetricOptions) -> DecryptResult {
        self.decrypt(SymmetricAlgorithm::Blowfish, data_b64, key, options)
    }

    // ---- generic operations ----------------------------------------------

    /// Encrypts under any supported algorithm; the result record carries
    /// the Base64 ciphertext and the hex IV that was used.
    pub fn encrypt(
        &self,
        algorithm: SymmetricAlgorithm,
        plaintext: &[u8],
        key: &str,
        options: &SymmetricOptions,
    ) -> EncryptResult {
        let span = self.runtime.next_operation_id("encrypt");
        self.runtime.observer().start_operation(&span, Some(algorithm.name()));
        let outcome = self.try_encrypt(algorithm, plaintext, key, options, |key, target| normalize_key(key, target));
        self.finish_encrypt(span, algorithm, plaintext.len(), outcome)
    }

    /// Byte-key variant used by the rotation engine and secure storage,
    /// which hold raw material instead of textual keys.
    pub fn encrypt_with_key_bytes(
        &self,
        algorithm: SymmetricAlgorithm,
        plaintext: &[u8],
        key: &[u8],
        options: &SymmetricOptions,
    ) -> EncryptResult {
        let span = self.runtime.next_operation_id("encrypt");
        self.runtime.observer().start_operation(&span, Some(algorithm.name()));
        let outcome = self.try_encrypt(algorithm, plaintext, key, options, |key, target| {
            normalize_key_bytes(key, target)
        });
        self.finish_encrypt(span, algorithm, plaintext.len(), outcome)
    }

    pub fn decrypt(
        &self,
        algorithm: SymmetricAlgorithm,
        data_b64: &str,
        key: &str,
        options: &SymmetricOptions,
    ) -> DecryptResult {
        let span = self.runtime.next_operation_id("decrypt");
        self.runtime.observer().start_operation(&span, Some(algorithm.name()));
        let outcome = self.try_decrypt(algorithm, data_b64, key, options, |key, target| normalize_key(key, target));
        self.finish_decrypt(span, algorithm, outcome)
    }

    pub fn decrypt_with_key_bytes(
        &self,
        algorithm: SymmetricAlgorithm,
        data_b64: &str,
        key: &[u8],
        options: &SymmetricOptions,
    ) -> DecryptResult {
        let span = self.runtime.next_operation_id("decrypt");
        self.runtime.observer().start_operation(&span, Some(algorithm.name()));
        let outcome = self.try_decrypt(algorithm, data_b64, key, options, |key, target| {
            normalize_key_bytes(key, target)
        });
        self.finish_decrypt(span, algorithm, outcome)
    }

    /// Per-item batch encryption; failures never abort the batch.
    pub fn encrypt_batch(
        &self,
        algorithm: SymmetricAlgorithm,
        items: &[&[u8]],
        key: &str,
        options: &SymmetricOptions,
    ) -> Vec<EncryptResult> {
        items
            .iter()
            .map(|plaintext| self.encrypt(algorithm, plaintext, key, options))
            .collect()
    }

    /// Per-item batch decryption; failures never abort the batch.
    pub fn decrypt_batch(
        &self,
        algorithm: SymmetricAlgorithm,
        items: &[&str],
        key: &str,
        options: &SymmetricOptions,
    ) -> Vec<DecryptResult> {
        items
            .iter()
            .map(|data| self.decrypt(algorithm, data, key, options))
            .collect()
    }

    /// Fresh random key for the algorithm, hex-encoded.
    pub fn generate_key(&self, algorithm: SymmetricAlgorithm, key_size: AesKeySize) -> Result<String, CryptoError> {
        let len = Self::target_key_len(algorithm, key_size);
        Ok(hex::encode(self.runtime.primitive().random_bytes(len)?))
    }

    /// Fresh random IV for the algorithm and mode, hex-encoded.
    pub fn generate_iv(&self, algorithm: SymmetricAlgorithm, mode: CipherMode) -> Result<String, CryptoError> {
        let len = mode.iv_len(algorithm.block_size());
        if len == 0 {
            return Err(CryptoError::InvalidIv(format!("{} mode takes no IV", mode)));
        }
        Ok(hex::encode(self.runtime.primitive().random_bytes(len)?))
    }

    // ---- internals -------------------------------------------------------

    fn target_key_len(algorithm: SymmetricAlgorithm, key_size: AesKeySize) -> usize {
        match algorithm {
            SymmetricAlgorithm::Aes => key_size.bytes(),
            SymmetricAlgorithm::Blowfish => 56,
            other => other.fixed_key_len().unwrap_or(32),
        }
    }

    fn advisory_warnings(algorithm: SymmetricAlgorithm) -> Vec<String> {
        if algorithm.is_weak() {
            vec![format!("{} is cryptographically weak; prefer AES", algorithm.name())]
        } else {
            Vec::new()
        }
    }

    /// Resolves the IV for an encrypt call: validates a caller-supplied hex
    /// IV or generates one. ECB rejects any IV; an over-length IV is an
    /// error, never truncated.
    fn resolve_encrypt_iv(
        &self,
        algorithm: SymmetricAlgorithm,
        mode: CipherMode,
        supplied: Option<&str>,
    ) -> Result<Option<Vec<u8>>, CryptoError> {
        let required = mode.iv_len(algorithm.block_size());
        match supplied {
            Some(_) if required == 0 => Err(CryptoError::InvalidIv(format!("{} mode takes no IV", mode))),
            Some(iv_hex) => {
                let iv = encoding::decode(iv_hex, EncodingKind::Hex)
                    .map_err(|_| CryptoError::InvalidIv("IV must be hex".to_string()))?;
                if iv.len() != required {
                    return Err(CryptoError::InvalidIv(format!(
                        "{} {} requires a {}-byte IV, got {}",
                        algorithm, mode, required, iv.len()
                    )));
                }
                Ok(Some(iv))
            }
            None if required == 0 => Ok(None),
            None => Ok(Some(self.runtime.primitive().random_bytes(required)?)),
        }
    }

    fn fingerprint(
        operation: &str,
        algorithm: SymmetricAlgorithm,
        options: &SymmetricOptions,
        key: &SecretBuffer,
        iv: Option<&[u8]>,
        data: &[u8],
    ) -> Fingerprint {
        Fingerprint::builder(operation)
            .text("algorithm", algorithm.name())
            .text("mode", options.mode.name())
            .text("padding", options.padding.name())
            .field("key", key.as_slice())
            .field("iv", iv.unwrap_or(&[]))
            .field("data", data)
            .finish()
    }

    fn try_encrypt<K: ?Sized>(
        &self,
        algorithm: SymmetricAlgorithm,
        plaintext: &[u8],
        key: &K,
        options: &SymmetricOptions,
        normalize: impl Fn(&K, usize) -> Result<SecretBuffer, CryptoError>,
    ) -> Result<EncryptResult, CryptoError> {
        options.op.check("encrypt")?;
        if !algorithm.supports_mode(options.mode) {
            return Err(CryptoError::unsupported(format!(
                "{} does not support {} mode",
                algorithm, options.mode
            )));
        }

        let key = normalize(key, Self::target_key_len(algorithm, options.key_size))?;
        let iv = self.resolve_encrypt_iv(algorithm, options.mode, options.iv.as_deref())?;

        // Deterministic only when the caller pinned the IV.
        let fingerprint = options.iv.as_ref().map(|_| {
            Self::fingerprint("encrypt_sym", algorithm, options, &key, iv.as_deref(), plaintext)
        });
        if let Some(fp) = &fingerprint {
            if let Some(cached) = self.runtime.cache().get_sync(&fp.to_hex()) {
                debug!(algorithm = %algorithm, "encrypt served from cache");
                return Ok(self.build_encrypt_result(algorithm, options, iv.as_deref(), cached));
            }
        }

        // Stage the plaintext through the buffer pool; the staging copy is
        // scrubbed on release.
        let pool = self.runtime.buffer_pool();
        let mut staging = pool.acquire(plaintext.len());
        staging.copy_from_slice(plaintext);
        let request = SymmetricRequest {
            algorithm,
            mode: options.mode,
            padding: options.padding,
            key: key.as_slice(),
            iv: iv.as_deref(),
            input: &staging,
        };
        let outcome = self.runtime.primitive().encrypt_sym(&request);
        pool.release(staging);
        let ciphertext = outcome?;
        options.op.check("encrypt")?;

        if let Some(fp) = fingerprint {
            self.runtime.cache().set_sync(&fp.to_hex(), ciphertext.clone());
        }
        Ok(self.build_encrypt_result(algorithm, options, iv.as_deref(), ciphertext))
    }

    fn build_encrypt_result(
        &self,
        algorithm: SymmetricAlgorithm,
        options: &SymmetricOptions,
        iv: Option<&[u8]>,
        ciphertext: Vec<u8>,
    ) -> EncryptResult {
        EncryptResult {
            success: true,
            algorithm: algorithm.name().to_string(),
            mode: Some(options.mode.name().to_string()),
            key_size: match algorithm {
                SymmetricAlgorithm::Aes => Some(options.key_size.bits()),
                other => other.fixed_key_len().map(|len| (len * 8) as u32),
            },
            data: Some(self.runtime.base64_cache().encode(&ciphertext)),
            iv: iv.map(hex::encode),
            salt: None,
            warnings: Self::advisory_warnings(algorithm),
            error: None,
        }
    }

    fn try_decrypt<K: ?Sized>(
        &self,
        algorithm: SymmetricAlgorithm,
        data_b64: &str,
        key: &K,
        options: &SymmetricOptions,
        normalize: impl Fn(&K, usize) -> Result<SecretBuffer, CryptoError>,
    ) -> Result<Vec<u8>, CryptoError> {
        options.op.check("decrypt")?;
        if !algorithm.supports_mode(options.mode) {
            return Err(CryptoError::unsupported(format!(
                "{} does not support {} mode",
                algorithm, options.mode
            )));
        }

        let ciphertext = encoding::decode(data_b64, EncodingKind::Base64)
            .map_err(|_| CryptoError::invalid_input("ciphertext must be Base64"))?;
        let key = normalize(key, Self::target_key_len(algorithm, options.key_size))?;

        let required_iv = options.mode.iv_len(algorithm.block_size());
        let iv = match (options.iv.as_deref(), required_iv) {
            (Some(_), 0) => return Err(CryptoError::InvalidIv(format!("{} mode takes no IV", options.mode))),
            (Some(iv_hex), required) => {
                let iv = encoding::decode(iv_hex, EncodingKind::Hex)
                    .map_err(|_| CryptoError::InvalidIv("IV must be hex".to_string()))?;
                if iv.len() != required {
                    return Err(CryptoError::InvalidIv(format!(
                        "{} {} requires a {}-byte IV, got {}",
                        algorithm, options.mode, required, iv.len()
                    )));
                }
                Some(iv)
            }
            (None, 0) => None,
            (None, _) => {
                return Err(CryptoError::InvalidIv(format!(
                    "{} {} requires an IV to decrypt",
                    algorithm, options.mode
                )))
            }
        };

        let fingerprint = Self::fingerprint("decrypt_sym", algorithm, options, &key, iv.as_deref(), &ciphertext);
        if let Some(cached) = self.runtime.cache().get_sync(&fingerprint.to_hex()) {
            debug!(algorithm = %algorithm, "decrypt served from cache");
            return Ok(cached);
        }

        let pool = self.runtime.buffer_pool();
        let mut staging = pool.acquire(ciphertext.len());
        staging.copy_from_slice(&ciphertext);
        let request = SymmetricRequest {
            algorithm,
            mode: options.mode,
            padding: options.padding,
            key: key.as_slice(),
            iv: iv.as_deref(),
            input: &staging,
        };
        let outcome = self.runtime.primitive().decrypt_sym(&request);
        pool.release(staging);
        let plaintext = outcome?;
        options.op.check("decrypt")?;

        self.runtime.cache().set_sync(&fingerprint.to_hex(), plaintext.clone());
        Ok(plaintext)
    }

    fn finish_encrypt(
        &self,
        span: String,
        algorithm: SymmetricAlgorithm,
        input_len: usize,
        outcome: Result<EncryptResult, CryptoError>,
    ) -> EncryptResult {
        match outcome {
            Ok(result) => {
                self.runtime
                    .observer()
                    .end_operation(&span, "encrypt", true, Some(input_len as u64), None, Some(algorithm.name()));
                result
            }
            Err(error) => {
                self.runtime.observer().end_operation(
                    &span,
                    "encrypt",
                    false,
                    Some(input_len as u64),
                    Some(error.kind()),
                    Some(algorithm.name()),
                );
                EncryptResult::failure(algorithm.name(), &error)
            }
        }
    }

    fn finish_decrypt(
        &self,
        span: String,
        algorithm: SymmetricAlgorithm,
        outcome: Result<Vec<u8>, CryptoError>,
    ) -> DecryptResult {
        match outcome {
            Ok(plaintext) => {
                use base64::Engine as _;
                self.runtime.observer().end_operation(
                    &span,
                    "decrypt",
                    true,
                    Some(plaintext.len() as u64),
                    None,
                    Some(algorithm.name()),
                );
                DecryptResult {
                    success: true,
                    algorithm: algorithm.name().to_string(),
                    mode: None,
                    data: Some(base64::engine::general_purpose::STANDARD.encode(&plaintext)),
                    warnings: Self::advisory_warnings(algorithm),
                    error: None,
                }
            }
            Err(error) => {
                // Every cipher-level failure surfaces the uniform kind; the
                // record carries no hint of the sub-cause.
                self.runtime.observer().end_operation(
                    &span,
                    "decrypt",
                    false,
                    None,
                    Some(error.kind()),
                    Some(algorithm.name()),
                );
                DecryptResult::failure(algorithm.name(), &error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::runtime::CoreRuntime;

    fn runtime() -> CoreRuntime {
        CoreRuntime::new()
    }

    /// Tests the reference AES-256-CBC scenario.
    ///
    /// Validates that:
    /// - A 32-character key with keySize 256 is used raw
    /// - The result carries algorithm, mode, keySize, and a fresh IV
    /// - Decrypting the produced envelope restores the plaintext
    #[test]
    fn test_aes_256_cbc_round_trip() {
        let runtime = runtime();
        let facade = SymmetricFacade::new(&runtime);
        let key = "0123456789abcdef0123456789abcdef";

        let encrypted = facade.encrypt_aes(b"Hello World", key, &SymmetricOptions::default());
        assert!(encrypted.success);
        assert_eq!(encrypted.algorithm, "AES");
        assert_eq!(encrypted.mode.as_deref(), Some("CBC"));
        assert_eq!(encrypted.key_size, Some(256));
        assert!(encrypted.iv.is_some());

        let decrypted = facade.decrypt_aes(
            encrypted.data.as_deref().unwrap(),
            key,
            &SymmetricOptions {
                iv: encrypted.iv.clone(),
                ..SymmetricOptions::default()
            },
        );
        assert!(decrypted.success);
        assert_eq!(decrypted.text().unwrap(), "Hello World");
    }

    /// Tests that a wrong key and a corrupted ciphertext fail identically.
    #[test]
    fn test_wrong_key_and_corruption_are_indistinguishable() {
        let runtime = runtime();
        let facade = SymmetricFacade::new(&runtime);

        let encrypted = facade.encrypt_aes(b"secret", "k1", &SymmetricOptions::default());
        let data = encrypted.data.as_deref().unwrap();
        let options = SymmetricOptions {
            iv: encrypted.iv.clone(),
            ..SymmetricOptions::default()
        };

        let wrong_key = facade.decrypt_aes(data, "k2", &options);

        // Flip one ciphertext bit.
        let mut raw = encrypted.data_bytes().unwrap();
        raw[0] ^= 0x01;
        use base64::Engine as _;
        let corrupted = base64::engine::general_purpose::STANDARD.encode(&raw);
        let bit_flipped = facade.decrypt_aes(&corrupted, "k1", &options);

        assert!(!wrong_key.success);
        assert!(!bit_flipped.success);
        let a = wrong_key.error.unwrap();
        let b = bit_flipped.error.unwrap();
        assert_eq!(a.kind, "DecryptionFailed");
        assert_eq!(a.kind, b.kind);
        assert_eq!(a.message, b.message, "identical message for both causes");
    }

    /// Tests the ECB-rejects-IV and over-length-IV edge cases.
    #[test]
    fn test_iv_edge_cases() {
        let runtime = runtime();
        let facade = SymmetricFacade::new(&runtime);

        let ecb = facade.encrypt_aes(
            b"data",
            "key",
            &SymmetricOptions {
                mode: CipherMode::Ecb,
                iv: Some("00112233445566778899aabbccddeeff".to_string()),
                ..SymmetricOptions::default()
            },
        );
        assert!(!ecb.success);
        assert_eq!(ecb.error.unwrap().kind, "InvalidIV");

        let oversize = facade.encrypt_aes(
            b"data",
            "key",
            &SymmetricOptions {
                iv: Some("00".repeat(17)),
                ..SymmetricOptions::default()
            },
        );
        assert!(!oversize.success);
        assert_eq!(oversize.error.unwrap().kind, "InvalidIV");
    }

    /// Tests empty-plaintext behavior per mode.
    #[test]
    fn test_empty_plaintext_edges() {
        let runtime = runtime();
        let facade = SymmetricFacade::new(&runtime);

        // Block mode with PKCS7: one full padding block.
        let block = facade.encrypt_aes(b"", "key", &SymmetricOptions::default());
        assert!(block.success);
        assert_eq!(block.data_bytes().unwrap().len(), 16);

        // Stream mode: empty in, empty out.
        let stream = facade.encrypt_aes(
            b"",
            "key",
            &SymmetricOptions {
                mode: CipherMode::Ctr,
                padding: PaddingScheme::NoPadding,
                ..SymmetricOptions::default()
            },
        );
        assert!(stream.success);
        assert!(stream.data_bytes().unwrap().is_empty());
    }

    /// Tests the DES advisory warning and round trip.
    #[test]
    fn test_des_round_trip_carries_warning() {
        let runtime = runtime();
        let facade = SymmetricFacade::new(&runtime);

        let encrypted = facade.encrypt_des(b"legacy data", "legacy-key", &SymmetricOptions::default());
        assert!(encrypted.success);
        assert!(encrypted.warnings.iter().any(|w| w.contains("weak")));
        assert_eq!(encrypted.key_size, Some(64));

        let decrypted = facade.decrypt_des(
            encrypted.data.as_deref().unwrap(),
            "legacy-key",
            &SymmetricOptions {
                iv: encrypted.iv.clone(),
                ..SymmetricOptions::default()
            },
        );
        assert_eq!(decrypted.text().unwrap(), "legacy data");
    }

    #[test]
    fn test_blowfish_and_tripledes_round_trip() {
        let runtime = runtime();
        let facade = SymmetricFacade::new(&runtime);

        for algorithm in [SymmetricAlgorithm::Blowfish, SymmetricAlgorithm::TripleDes] {
            let encrypted = facade.encrypt(algorithm, b"payload", "some passphrase", &SymmetricOptions::default());
            assert!(encrypted.success, "{} encrypt", algorithm);
            let decrypted = facade.decrypt(
                algorithm,
                encrypted.data.as_deref().unwrap(),
                "some passphrase",
                &SymmetricOptions {
                    iv: encrypted.iv.clone(),
                    ..SymmetricOptions::default()
                },
            );
            assert_eq!(decrypted.data_bytes().unwrap(), b"payload", "{} round trip", algorithm);
        }
    }

    /// Tests decrypt memoization: the second identical call is a cache hit.
    #[test]
    fn test_decrypt_memoization() {
        let runtime = runtime();
        let facade = SymmetricFacade::new(&runtime);

        let encrypted = facade.encrypt_aes(b"cache me", "key", &SymmetricOptions::default());
        let options = SymmetricOptions {
            iv: encrypted.iv.clone(),
            ..SymmetricOptions::default()
        };
        let first = facade.decrypt_aes(encrypted.data.as_deref().unwrap(), "key", &options);
        let hits_before = runtime.cache().statistics().hit_rate;
        let second = facade.decrypt_aes(encrypted.data.as_deref().unwrap(), "key", &options);
        assert_eq!(first.data, second.data);
        assert!(runtime.cache().statistics().hit_rate >= hits_before);
    }

    #[test]
    fn test_batch_reports_per_item_outcomes() {
        let runtime = runtime();
        let facade = SymmetricFacade::new(&runtime);
        let options = SymmetricOptions {
            mode: CipherMode::Ecb,
            iv: Some("00".repeat(16)), // invalid for ECB: every item fails
            ..SymmetricOptions::default()
        };
        let results = facade.encrypt_batch(SymmetricAlgorithm::Aes, &[b"a".as_ref(), b"b".as_ref()], "key", &options);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| !r.success));
    }

    #[test]
    fn test_generate_key_and_iv() {
        let runtime = runtime();
        let facade = SymmetricFacade::new(&runtime);

        let key = facade.generate_key(SymmetricAlgorithm::Aes, AesKeySize::Bits256).unwrap();
        assert_eq!(key.len(), 64);
        let iv = facade.generate_iv(SymmetricAlgorithm::Aes, CipherMode::Gcm).unwrap();
        assert_eq!(iv.len(), 24);
        assert!(facade.generate_iv(SymmetricAlgorithm::Aes, CipherMode::Ecb).is_err());
    }
}
