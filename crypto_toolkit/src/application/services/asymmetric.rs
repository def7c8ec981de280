// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # RSA Facade
//!
//! Public-key encryption and keypair generation. RSA operations are
//! expensive and therefore gated by the rate limiter; none of them is
//! memoized (OAEP is randomized, keygen must never repeat).
//!
//! Payload capacity is bounded by `modulus - padding overhead`; oversized
//! inputs surface `InvalidInput`, not a primitive failure.

use serde::{Deserialize, Serialize};
use tracing::info;

use crypto_toolkit_domain::value_objects::{DecryptResult, EncryptResult, RsaKeySize, RsaPadding};
use crypto_toolkit_domain::{CryptoError, ErrorInfo};

use crate::application::runtime::CoreRuntime;
use crate::application::services::support::OperationOptions;
use crate::infrastructure::encoding::{self, EncodingKind};

/// Options for one RSA operation.
#[derive(Debug, Clone, Default)]
pub struct RsaOptions {
    pub padding: RsaPadding,
    pub op: OperationOptions,
}

/// Result record for keypair generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyPairResult {
    pub success: bool,
    pub algorithm: String,
    #[serde(rename = "publicKey", skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(rename = "privateKey", skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl KeyPairResult {
    fn failure(error: &CryptoError) -> Self {
        Self {
            success: false,
            algorithm: "RSA".to_string(),
            public_key: None,
            private_key: None,
            warnings: Vec::new(),
            error: Some(ErrorInfo::from_error(error, Some("RSA"))),
        }
    }
}

/// Facade over RSA encryption and key generation.
pub struct RsaFacade<'r> {
    runtime: &'r CoreRuntime,
}

impl<'r> RsaFacade<'r> {
    pub fn new(runtime: &'r CoreRuntime) -> Self {
        Self { runtime }
    }

    /// Generates a PEM-encoded keypair. 1024-bit keys are produced but
    /// flagged with an advisory warning.
    pub fn generate_keypair(&self, bits: usize) -> KeyPairResult {
        let span = self.runtime.next_operation_id("rsa-keygen");
        self.runtime.observer().start_operation(&span, Some("RSA"));
        let outcome = (|| {
            self.runtime.rate_limiter().check()?;
            let size = RsaKeySize::from_bits(bits)?;
            let pair = self.runtime.primitive().generate_rsa_keypair(size)?;
            info!(bits, "generated RSA keypair");
            Ok::<_, CryptoError>(KeyPairResult {
                success: true,
                algorithm: "RSA".to_string(),
                public_key: Some(pair.public_pem),
                private_key: Some(pair.private_pem),
                warnings: if size.is_legacy() {
                    vec!["1024-bit RSA keys are legacy; prefer 2048 bits or more".to_string()]
                } else {
                    Vec::new()
                },
                error: None,
            })
        })();
        match outcome {
            Ok(result) => {
                self.runtime
                    .observer()
                    .end_operation(&span, "generate_keypair", true, None, None, Some("RSA"));
                result
            }
            Err(error) => {
                self.runtime
                    .observer()
                    .end_operation(&span, "generate_keypair", false, None, Some(error.kind()), Some("RSA"));
                KeyPairResult::failure(&error)
            }
        }
    }

    /// Encrypts under the given public key.
    pub fn encrypt(&self, plaintext: &[u8], public_key_pem: &str, options: &RsaOptions) -> EncryptResult {
        let span = self.runtime.next_operation_id("rsa-encrypt");
        self.runtime.observer().start_operation(&span, Some("RSA"));
        let outcome = (|| {
            options.op.check("RSA encrypt")?;
            self.runtime.rate_limiter().check()?;
            if public_key_pem.trim().is_empty() {
                return Err(CryptoError::invalid_key("public key must not be empty"));
            }
            let ciphertext = self
                .runtime
                .primitive()
                .rsa_encrypt(public_key_pem, options.padding, plaintext)?;
            options.op.check("RSA encrypt")?;
            Ok::<_, CryptoError>(EncryptResult {
                success: true,
                algorithm: "RSA".to_string(),
                mode: Some(options.padding.name().to_string()),
                key_size: None,
                data: Some(self.runtime.base64_cache().encode(&ciphertext)),
                iv: None,
                salt: None,
                warnings: Vec::new(),
                error: None,
            })
        })();
        match outcome {
            Ok(result) => {
                self.runtime.observer().end_operation(
                    &span,
                    "rsa_encrypt",
                    true,
                    Some(plaintext.len() as u64),
                    None,
                    Some("RSA"),
                );
                result
            }
            Err(error) => {
                self.runtime.observer().end_operation(
                    &span,
                    "rsa_encrypt",
                    false,
                    Some(plaintext.len() as u64),
                    Some(error.kind()),
                    Some("RSA"),
                );
                EncryptResult::failure("RSA", &error)
            }
        }
    }

    /// Decrypts under the given private key.
    pub fn decrypt(&self, data_b64: &str, private_key_pem: &str, options: &RsaOptions) -> DecryptResult {
        let span = self.runtime.next_operation_id("rsa-decrypt");
        self.runtime.observer().start_operation(&span, Some("RSA"));
        let outcome = (|| {
            options.op.check("RSA decrypt")?;
            self.runtime.rate_limiter().check()?;
            if private_key_pem.trim().is_empty() {
                return Err(CryptoError::invalid_key("private key must not be empty"));
            }
            let ciphertext = encoding::decode(data_b64, EncodingKind::Base64)
                .map_err(|_| CryptoError::invalid_input("ciphertext must be Base64"))?;
            let plaintext = self
                .runtime
                .primitive()
                .rsa_decrypt(private_key_pem, options.padding, &ciphertext)?;
            options.op.check("RSA decrypt")?;
            Ok::<_, CryptoError>(plaintext)
        })();
        match outcome {
            Ok(plaintext) => {
                use base64::Engine as _;
                self.runtime.observer().end_operation(
                    &span,
                    "rsa_decrypt",
                    true,
                    Some(plaintext.len() as u64),
                    None,
                    Some("RSA"),
                );
                DecryptResult {
                    success: true,
                    algorithm: "RSA".to_string(),
                    mode: None,
                    data: Some(base64::engine::general_purpose::STANDARD.encode(&plaintext)),
                    warnings: Vec::new(),
                    error: None,
                }
            }
            Err(error) => {
                self.runtime
                    .observer()
                    .end_operation(&span, "rsa_decrypt", false, None, Some(error.kind()), Some("RSA"));
                DecryptResult::failure("RSA", &error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::runtime::CoreRuntime;

    /// Tests keygen, encrypt, decrypt end to end at 1024 bits (fast, and
    /// exercises the legacy warning path).
    #[test]
    fn test_rsa_round_trip_with_legacy_warning() {
        let runtime = CoreRuntime::new();
        let facade = RsaFacade::new(&runtime);

        let pair = facade.generate_keypair(1024);
        assert!(pair.success);
        assert!(pair.warnings.iter().any(|w| w.contains("legacy")));

        let encrypted = facade.encrypt(b"rsa payload", pair.public_key.as_deref().unwrap(), &RsaOptions::default());
        assert!(encrypted.success);
        assert_eq!(encrypted.algorithm, "RSA");

        let decrypted = facade.decrypt(
            encrypted.data.as_deref().unwrap(),
            pair.private_key.as_deref().unwrap(),
            &RsaOptions::default(),
        );
        assert!(decrypted.success);
        assert_eq!(decrypted.data_bytes().unwrap(), b"rsa payload");
    }

    /// Tests that oversized payloads are rejected as invalid input.
    #[test]
    fn test_oversize_payload_rejected() {
        let runtime = CoreRuntime::new();
        let facade = RsaFacade::new(&runtime);
        let pair = facade.generate_keypair(1024);

        // 1024-bit modulus holds at most 128 - 66 = 62 OAEP bytes.
        let oversize = vec![7u8; 200];
        let result = facade.encrypt(&oversize, pair.public_key.as_deref().unwrap(), &RsaOptions::default());
        assert!(!result.success);
        assert_eq!(result.error.unwrap().kind, "InvalidInput");
    }

    #[test]
    fn test_invalid_bits_rejected() {
        let runtime = CoreRuntime::new();
        let facade = RsaFacade::new(&runtime);
        let result = facade.generate_keypair(1536);
        assert!(!result.success);
        assert_eq!(result.error.unwrap().kind, "InvalidKey");
    }
}
