// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Digital Signature Facade
//!
//! RSA PKCS#1 v1.5 signatures over the SHA family. Signing is
//! rate-limited and never memoized. Verification delegates to the RSA
//! crate, whose comparison of the recovered encoded message is already
//! constant-time; MAC-style comparisons elsewhere in the toolkit go
//! through the timing-safe equality helpers.

use crypto_toolkit_domain::value_objects::{HashAlgorithm, SignatureResult};
use crypto_toolkit_domain::CryptoError;

use crate::application::runtime::CoreRuntime;
use crate::application::services::support::OperationOptions;
use crate::infrastructure::encoding::{self, EncodingKind};

/// Facade over RSA signing and verification.
pub struct SignatureFacade<'r> {
    runtime: &'r CoreRuntime,
}

impl<'r> SignatureFacade<'r> {
    pub fn new(runtime: &'r CoreRuntime) -> Self {
        Self { runtime }
    }

    /// Signs the message; the result carries the Base64 signature.
    pub fn sign(
        &self,
        message: &[u8],
        private_key_pem: &str,
        hash: HashAlgorithm,
        op: &OperationOptions,
    ) -> SignatureResult {
        let name = format!("RSA-{}", hash.name());
        let span = self.runtime.next_operation_id("sign");
        self.runtime.observer().start_operation(&span, Some(name.as_str()));
        let outcome = (|| {
            op.check("sign")?;
            self.runtime.rate_limiter().check()?;
            if private_key_pem.trim().is_empty() {
                return Err(CryptoError::invalid_key("private key must not be empty"));
            }
            let signature = self.runtime.primitive().sign(private_key_pem, hash, message)?;
            op.check("sign")?;
            Ok::<_, CryptoError>(self.runtime.base64_cache().encode(&signature))
        })();
        match outcome {
            Ok(signature) => {
                self.runtime.observer().end_operation(
                    &span,
                    "sign",
                    true,
                    Some(message.len() as u64),
                    None,
                    Some(name.as_str()),
                );
                SignatureResult::success(&name, signature)
            }
            Err(error) => {
                self.runtime.observer().end_operation(
                    &span,
                    "sign",
                    false,
                    Some(message.len() as u64),
                    Some(error.kind()),
                    Some(name.as_str()),
                );
                SignatureResult::failure(&name, &error)
            }
        }
    }

    /// Verifies a Base64 signature. Malformed input verifies as `false`.
    pub fn verify(&self, message: &[u8], public_key_pem: &str, signature_b64: &str, hash: HashAlgorithm) -> bool {
        let Ok(signature) = encoding::decode(signature_b64, EncodingKind::Base64) else {
            return false;
        };
        self.runtime
            .primitive()
            .verify(public_key_pem, hash, message, &signature)
            .unwrap_or(false)
    }
}
