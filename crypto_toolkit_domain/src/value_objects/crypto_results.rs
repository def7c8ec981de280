// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Operation Result Records
//!
//! Every public operation of the toolkit returns one of these records; no
//! panic or error propagates across the public boundary. A record is either
//! a success carrying its payload, or a failure carrying a sanitized
//! [`ErrorInfo`], and it is immutable once returned.
//!
//! ## Canonical wire form
//!
//! The JSON form fixes the field encodings: `data` is Base64, `iv` and
//! `salt` are hex, `keySize` is bits. Optional fields are omitted when
//! absent. The compact and Base64 envelope forms produced by the result
//! serializer are projections of this record.
//!
//! ```json
//! { "success": true, "algorithm": "AES", "mode": "CBC", "keySize": 256,
//!   "data": "<base64>", "iv": "<hex>" }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CryptoError, ErrorInfo};

/// Result of an encrypt-family operation.
///
/// `data` holds Base64 ciphertext on success. For AES-GCM the
/// authentication tag is appended to the ciphertext before encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncryptResult {
    pub success: bool,
    pub algorithm: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(rename = "keySize", skip_serializing_if = "Option::is_none")]
    pub key_size: Option<u32>,
    /// Base64-encoded ciphertext.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Hex-encoded IV or nonce.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iv: Option<String>,
    /// Hex-encoded salt, when key material was derived.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
    /// Advisory warnings (weak algorithm, legacy key size). Never failures.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl EncryptResult {
    /// Builds a failure record from a domain error.
    pub fn failure(algorithm: &str, error: &CryptoError) -> Self {
        Self {
            success: false,
            algorithm: algorithm.to_string(),
            mode: None,
            key_size: None,
            data: None,
            iv: None,
            salt: None,
            warnings: Vec::new(),
            error: Some(ErrorInfo::from_error(error, Some(algorithm))),
        }
    }

    /// Ciphertext bytes, when present and well-formed.
    pub fn data_bytes(&self) -> Result<Vec<u8>, CryptoError> {
        use base64::Engine as _;
        let data = self
            .data
            .as_deref()
            .ok_or_else(|| CryptoError::invalid_state("result carries no data"))?;
        base64::engine::general_purpose::STANDARD
            .decode(data)
            .map_err(|e| CryptoError::EncodingFailed(format!("result data is not Base64: {}", e)))
    }

    /// IV bytes, when present and well-formed.
    pub fn iv_bytes(&self) -> Result<Option<Vec<u8>>, CryptoError> {
        match self.iv.as_deref() {
            None => Ok(None),
            Some(iv) => hex::decode(iv)
                .map(Some)
                .map_err(|e| CryptoError::EncodingFailed(format!("result iv is not hex: {}", e))),
        }
    }

    /// Converts to `Result`, surfacing the carried error on failure.
    pub fn ok(self) -> Result<Self, CryptoError> {
        if self.success {
            Ok(self)
        } else {
            Err(error_info_to_domain(self.error.as_ref()))
        }
    }
}

/// Result of a decrypt-family operation. `data` holds Base64 plaintext on
/// success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecryptResult {
    pub success: bool,
    pub algorithm: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Base64-encoded plaintext.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl DecryptResult {
    pub fn failure(algorithm: &str, error: &CryptoError) -> Self {
        Self {
            success: false,
            algorithm: algorithm.to_string(),
            mode: None,
            data: None,
            warnings: Vec::new(),
            error: Some(ErrorInfo::from_error(error, Some(algorithm))),
        }
    }

    /// Plaintext bytes, when present.
    pub fn data_bytes(&self) -> Result<Vec<u8>, CryptoError> {
        use base64::Engine as _;
        let data = self
            .data
            .as_deref()
            .ok_or_else(|| CryptoError::invalid_state("result carries no data"))?;
        base64::engine::general_purpose::STANDARD
            .decode(data)
            .map_err(|e| CryptoError::EncodingFailed(format!("result data is not Base64: {}", e)))
    }

    /// Plaintext as UTF-8 text, when it is valid UTF-8.
    pub fn text(&self) -> Result<String, CryptoError> {
        String::from_utf8(self.data_bytes()?)
            .map_err(|_| CryptoError::EncodingFailed("plaintext is not valid UTF-8".to_string()))
    }

    pub fn ok(self) -> Result<Self, CryptoError> {
        if self.success {
            Ok(self)
        } else {
            Err(error_info_to_domain(self.error.as_ref()))
        }
    }
}

/// Result of a hash, HMAC, or key-derivation digest operation. `data`
/// carries the digest in the encoding the caller requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashResult {
    pub success: bool,
    pub algorithm: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Hex-encoded salt, when one was prepended.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl HashResult {
    pub fn success(algorithm: &str, data: String, salt: Option<String>) -> Self {
        Self {
            success: true,
            algorithm: algorithm.to_string(),
            data: Some(data),
            salt,
            error: None,
        }
    }

    pub fn failure(algorithm: &str, error: &CryptoError) -> Self {
        Self {
            success: false,
            algorithm: algorithm.to_string(),
            data: None,
            salt: None,
            error: Some(ErrorInfo::from_error(error, Some(algorithm))),
        }
    }

    /// Digest string, surfacing the carried error on failure.
    pub fn digest(self) -> Result<String, CryptoError> {
        if self.success {
            self.data
                .ok_or_else(|| CryptoError::invalid_state("result carries no digest"))
        } else {
            Err(error_info_to_domain(self.error.as_ref()))
        }
    }
}

/// Result of a sign operation. `data` carries the Base64 signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureResult {
    pub success: bool,
    pub algorithm: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl SignatureResult {
    pub fn success(algorithm: &str, data: String) -> Self {
        Self {
            success: true,
            algorithm: algorithm.to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(algorithm: &str, error: &CryptoError) -> Self {
        Self {
            success: false,
            algorithm: algorithm.to_string(),
            data: None,
            error: Some(ErrorInfo::from_error(error, Some(algorithm))),
        }
    }

    pub fn signature(self) -> Result<String, CryptoError> {
        if self.success {
            self.data
                .ok_or_else(|| CryptoError::invalid_state("result carries no signature"))
        } else {
            Err(error_info_to_domain(self.error.as_ref()))
        }
    }
}

/// Result of a PBKDF2 derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedKey {
    pub success: bool,
    pub algorithm: String,
    /// Hex-encoded derived key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Hex-encoded salt actually used (supplied or generated).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
    pub iterations: u32,
    #[serde(rename = "keySize")]
    pub key_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl DerivedKey {
    pub fn failure(error: &CryptoError, iterations: u32, key_size: u32) -> Self {
        Self {
            success: false,
            algorithm: "PBKDF2".to_string(),
            key: None,
            salt: None,
            iterations,
            key_size,
            error: Some(ErrorInfo::from_error(error, Some("PBKDF2"))),
        }
    }

    pub fn key_bytes(&self) -> Result<Vec<u8>, CryptoError> {
        let key = self
            .key
            .as_deref()
            .ok_or_else(|| CryptoError::invalid_state("result carries no key"))?;
        hex::decode(key).map_err(|e| CryptoError::EncodingFailed(format!("derived key is not hex: {}", e)))
    }
}

fn error_info_to_domain(info: Option<&ErrorInfo>) -> CryptoError {
    match info {
        Some(info) => match info.code {
            3000 => CryptoError::DecryptionFailed,
            7000 => CryptoError::RateLimited {
                retry_after_ms: info.retry_after_ms().unwrap_or(0),
            },
            1100 => CryptoError::UnsupportedAlgorithm(info.message.clone()),
            2000 => CryptoError::InvalidKey(info.message.clone()),
            2100 => CryptoError::InvalidIv(info.message.clone()),
            2200 => CryptoError::EncryptionFailed(info.message.clone()),
            4000 => CryptoError::HashFailed(info.message.clone()),
            5100 => CryptoError::KeyNotFound(info.message.clone()),
            5200 => CryptoError::KeyExpired(info.message.clone()),
            5300 => CryptoError::KeyDerivationFailed(info.message.clone()),
            6000 => CryptoError::EncodingFailed(info.message.clone()),
            8000 => CryptoError::StorageFailed(info.message.clone()),
            9000 => CryptoError::Timeout(info.message.clone()),
            9100 => CryptoError::Cancelled(info.message.clone()),
            9200 => CryptoError::InvalidState(info.message.clone()),
            _ => CryptoError::InvalidInput(info.message.clone()),
        },
        None => CryptoError::invalid_state("failure record carries no error info"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests the canonical JSON projection of a successful encrypt result.
    ///
    /// Validates that:
    /// - Present fields serialize with their wire names (`keySize`)
    /// - Absent optional fields are omitted entirely
    /// - The record survives a JSON round trip unchanged
    #[test]
    fn test_encrypt_result_canonical_json() {
        let result = EncryptResult {
            success: true,
            algorithm: "AES".to_string(),
            mode: Some("CBC".to_string()),
            key_size: Some(256),
            data: Some("AAECAw==".to_string()),
            iv: Some("00112233445566778899aabbccddeeff".to_string()),
            salt: None,
            warnings: Vec::new(),
            error: None,
        };

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"keySize\":256"));
        assert!(!json.contains("salt"));
        assert!(!json.contains("error"));

        let back: EncryptResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
        assert_eq!(back.data_bytes().unwrap(), vec![0, 1, 2, 3]);
    }

    /// Tests that a failure record surfaces its carried error through ok().
    #[test]
    fn test_failure_record_round_trips_error_kind() {
        let result = EncryptResult::failure("AES", &CryptoError::DecryptionFailed);
        assert!(!result.success);
        assert_eq!(result.error.as_ref().unwrap().code, 3000);
        assert!(matches!(result.ok(), Err(CryptoError::DecryptionFailed)));
    }

    #[test]
    fn test_decrypt_result_text_helper() {
        use base64::Engine as _;
        let result = DecryptResult {
            success: true,
            algorithm: "AES".to_string(),
            mode: Some("CBC".to_string()),
            data: Some(base64::engine::general_purpose::STANDARD.encode("Hello World")),
            warnings: Vec::new(),
            error: None,
        };
        assert_eq!(result.text().unwrap(), "Hello World");
    }

    #[test]
    fn test_hash_result_digest_on_failure() {
        let result = HashResult::failure("SHA256", &CryptoError::HashFailed("boom".into()));
        assert!(matches!(result.digest(), Err(CryptoError::HashFailed(_))));
    }

    #[test]
    fn test_warnings_survive_round_trip() {
        let mut result = EncryptResult::failure("DES", &CryptoError::DecryptionFailed);
        result.success = true;
        result.error = None;
        result.data = Some("AA==".to_string());
        result.warnings.push("DES is cryptographically weak".to_string());
        let json = serde_json::to_string(&result).unwrap();
        let back: EncryptResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.warnings.len(), 1);
    }
}
