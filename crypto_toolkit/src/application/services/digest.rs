// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Hash and HMAC Facade
//!
//! Digest operations over MD5, SHA-1, and the SHA-2 family, plus HMAC and
//! its timing-safe verifier. Both families are deterministic and memoized
//! under a full-parameter fingerprint.
//!
//! A caller-supplied salt is prepended to the input before hashing.
//! Output defaults to hex; Base64 goes through the shared encoding cache.

use crypto_toolkit_domain::value_objects::{Fingerprint, HashAlgorithm, HashResult, OutputEncoding};
use crypto_toolkit_domain::{timing_safe_eq, CryptoError};

use crate::application::runtime::CoreRuntime;
use crate::application::services::support::OperationOptions;
use crate::infrastructure::encoding::{self, EncodingKind};

/// Options for hash operations.
#[derive(Debug, Clone, Default)]
pub struct HashOptions {
    /// Hex salt prepended to the input before hashing.
    pub salt: Option<String>,
    pub encoding: OutputEncoding,
    pub op: OperationOptions,
}

/// Facade over digests and MACs.
pub struct HashFacade<'r> {
    runtime: &'r CoreRuntime,
}

impl<'r> HashFacade<'r> {
    pub fn new(runtime: &'r CoreRuntime) -> Self {
        Self { runtime }
    }

    pub fn md5(&self, input: &[u8], options: &HashOptions) -> HashResult {
        self.hash(HashAlgorithm::Md5, input, options)
    }

    pub fn sha1(&self, input: &[u8], options: &HashOptions) -> HashResult {
        self.hash(HashAlgorithm::Sha1, input, options)
    }

    pub fn sha224(&self, input: &[u8], options: &HashOptions) -> HashResult {
        self.hash(HashAlgorithm::Sha224, input, options)
    }

    pub fn sha256(&self, input: &[u8], options: &HashOptions) -> HashResult {
        self.hash(HashAlgorithm::Sha256, input, options)
    }

    pub fn sha384(&self, input: &[u8], options: &HashOptions) -> HashResult {
        self.hash(HashAlgorithm::Sha384, input, options)
    }

    pub fn sha512(&self, input: &[u8], options: &HashOptions) -> HashResult {
        self.hash(HashAlgorithm::Sha512, input, options)
    }

    /// Hashes `salt || input` under the given algorithm.
    pub fn hash(&self, algorithm: HashAlgorithm, input: &[u8], options: &HashOptions) -> HashResult {
        let span = self.runtime.next_operation_id("hash");
        self.runtime.observer().start_operation(&span, Some(algorithm.name()));
        let outcome = self.try_hash(algorithm, input, options);
        match outcome {
            Ok(result) => {
                self.runtime.observer().end_operation(
                    &span,
                    "hash",
                    true,
                    Some(input.len() as u64),
                    None,
                    Some(algorithm.name()),
                );
                result
            }
            Err(error) => {
                self.runtime.observer().end_operation(
                    &span,
                    "hash",
                    false,
                    Some(input.len() as u64),
                    Some(error.kind()),
                    Some(algorithm.name()),
                );
                HashResult::failure(algorithm.name(), &error)
            }
        }
    }

    fn try_hash(&self, algorithm: HashAlgorithm, input: &[u8], options: &HashOptions) -> Result<HashResult, CryptoError> {
        options.op.check("hash")?;
        let salt = match options.salt.as_deref() {
            Some(salt_hex) => Some(
                encoding::decode(salt_hex, EncodingKind::Hex)
                    .map_err(|_| CryptoError::invalid_input("salt must be hex"))?,
            ),
            None => None,
        };

        let fingerprint = Fingerprint::builder("hash")
            .text("algorithm", algorithm.name())
            .field("salt", salt.as_deref().unwrap_or(&[]))
            .field("input", input)
            .number("encoding", matches!(options.encoding, OutputEncoding::Base64) as u64)
            .finish();

        let digest = match self.runtime.cache().get_sync(&fingerprint.to_hex()) {
            Some(cached) => cached,
            None => {
                let mut material = Vec::with_capacity(salt.as_ref().map_or(0, |s| s.len()) + input.len());
                if let Some(salt) = &salt {
                    material.extend_from_slice(salt);
                }
                material.extend_from_slice(input);
                let digest = self.runtime.primitive().hash(algorithm, &material)?;
                self.runtime.cache().set_sync(&fingerprint.to_hex(), digest.clone());
                digest
            }
        };
        options.op.check("hash")?;

        let rendered = match options.encoding {
            OutputEncoding::Hex => hex::encode(&digest),
            OutputEncoding::Base64 => self.runtime.base64_cache().encode(&digest),
        };
        Ok(HashResult::success(
            algorithm.name(),
            rendered,
            options.salt.clone(),
        ))
    }

    /// HMAC over the message with the given key.
    pub fn hmac(&self, algorithm: HashAlgorithm, message: &[u8], key: &str, options: &HashOptions) -> HashResult {
        let name = format!("HMAC-{}", algorithm.name());
        let span = self.runtime.next_operation_id("hmac");
        self.runtime.observer().start_operation(&span, Some(name.as_str()));
        let outcome = (|| {
            options.op.check("hmac")?;
            if key.is_empty() {
                return Err(CryptoError::invalid_key("HMAC key must not be empty"));
            }

            let fingerprint = Fingerprint::builder("hmac")
                .text("algorithm", algorithm.name())
                .field("key", key.as_bytes())
                .field("message", message)
                .finish();

            let mac = match self.runtime.cache().get_sync(&fingerprint.to_hex()) {
                Some(cached) => cached,
                None => {
                    let mac = self.runtime.primitive().hmac(algorithm, key.as_bytes(), message)?;
                    self.runtime.cache().set_sync(&fingerprint.to_hex(), mac.clone());
                    mac
                }
            };
            options.op.check("hmac")?;

            let rendered = match options.encoding {
                OutputEncoding::Hex => hex::encode(&mac),
                OutputEncoding::Base64 => self.runtime.base64_cache().encode(&mac),
            };
            Ok::<_, CryptoError>(HashResult::success(&name, rendered, None))
        })();
        match outcome {
            Ok(result) => {
                self.runtime
                    .observer()
                    .end_operation(&span, "hmac", true, Some(message.len() as u64), None, Some(name.as_str()));
                result
            }
            Err(error) => {
                self.runtime.observer().end_operation(
                    &span,
                    "hmac",
                    false,
                    Some(message.len() as u64),
                    Some(error.kind()),
                    Some(name.as_str()),
                );
                HashResult::failure(&name, &error)
            }
        }
    }

    /// Verifies a MAC in constant time. The candidate may be spelled in
    /// hex or Base64; malformed candidates verify as `false`, never as an
    /// error a caller could branch on.
    pub fn hmac_verify(&self, algorithm: HashAlgorithm, message: &[u8], key: &str, candidate: &str) -> bool {
        let computed = match self.runtime.primitive().hmac(algorithm, key.as_bytes(), message) {
            Ok(mac) => mac,
            Err(_) => return false,
        };
        let decoded = if encoding::validate(candidate, EncodingKind::Hex) {
            encoding::decode(candidate, EncodingKind::Hex)
        } else {
            encoding::decode(candidate, EncodingKind::Base64)
        };
        match decoded {
            Ok(candidate) => timing_safe_eq(&computed, &candidate),
            Err(_) => false,
        }
    }
}
