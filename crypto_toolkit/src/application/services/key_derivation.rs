// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # PBKDF2 Facade
//!
//! Password-based key derivation. Deliberately expensive, so derivations
//! are both rate-limited and memoized: the fingerprint covers the
//! password, salt, iteration count, key length, and PRF, and a repeated
//! derivation with identical parameters is served from the cache.

use crypto_toolkit_domain::value_objects::{DerivedKey, Fingerprint, Pbkdf2Prf};
use crypto_toolkit_domain::CryptoError;

use crate::application::runtime::CoreRuntime;
use crate::application::services::support::OperationOptions;
use crate::infrastructure::encoding::{self, EncodingKind};

/// Minimum accepted iteration count.
pub const MIN_ITERATIONS: u32 = 1000;

/// Options for a derivation.
#[derive(Debug, Clone)]
pub struct Pbkdf2Options {
    /// Hex salt; generated (16 bytes) when absent.
    pub salt: Option<String>,
    pub iterations: u32,
    /// Derived key length in bytes.
    pub key_length: usize,
    pub prf: Pbkdf2Prf,
    pub op: OperationOptions,
}

impl Default for Pbkdf2Options {
    fn default() -> Self {
        Self {
            salt: None,
            iterations: 10_000,
            key_length: 32,
            prf: Pbkdf2Prf::Sha256,
            op: OperationOptions::default(),
        }
    }
}

/// Facade over PBKDF2.
pub struct Pbkdf2Facade<'r> {
    runtime: &'r CoreRuntime,
}

impl<'r> Pbkdf2Facade<'r> {
    pub fn new(runtime: &'r CoreRuntime) -> Self {
        Self { runtime }
    }

    /// Derives a key from the password. The salt actually used (supplied
    /// or generated) is echoed in the result.
    pub fn derive(&self, password: &str, options: &Pbkdf2Options) -> DerivedKey {
        let span = self.runtime.next_operation_id("pbkdf2");
        self.runtime.observer().start_operation(&span, Some("PBKDF2"));
        let outcome = self.try_derive(password, options);
        match outcome {
            Ok(result) => {
                self.runtime
                    .observer()
                    .end_operation(&span, "pbkdf2", true, None, None, Some("PBKDF2"));
                result
            }
            Err(error) => {
                self.runtime
                    .observer()
                    .end_operation(&span, "pbkdf2", false, None, Some(error.kind()), Some("PBKDF2"));
                DerivedKey::failure(&error, options.iterations, (options.key_length * 8) as u32)
            }
        }
    }

    fn try_derive(&self, password: &str, options: &Pbkdf2Options) -> Result<DerivedKey, CryptoError> {
        options.op.check("pbkdf2")?;
        self.runtime.rate_limiter().check()?;

        if password.is_empty() {
            return Err(CryptoError::invalid_input("password must not be empty"));
        }
        if options.iterations < MIN_ITERATIONS {
            return Err(CryptoError::invalid_input(format!(
                "iteration count must be at least {}",
                MIN_ITERATIONS
            )));
        }
        if options.key_length == 0 || options.key_length > 512 {
            return Err(CryptoError::invalid_input("derived key length must lie in 1..=512 bytes"));
        }

        let salt = match options.salt.as_deref() {
            Some(salt_hex) => encoding::decode(salt_hex, EncodingKind::Hex)
                .map_err(|_| CryptoError::invalid_input("salt must be hex"))?,
            None => self.runtime.primitive().random_bytes(16)?,
        };

        let fingerprint = Fingerprint::builder("pbkdf2")
            .field("password", password.as_bytes())
            .field("salt", &salt)
            .number("iterations", options.iterations as u64)
            .number("key_length", options.key_length as u64)
            .text("prf", options.prf.name())
            .finish();

        let key = match self.runtime.cache().get_sync(&fingerprint.to_hex()) {
            Some(cached) => cached,
            None => {
                let key = self.runtime.primitive().derive_pbkdf2(
                    password.as_bytes(),
                    &salt,
                    options.iterations,
                    options.key_length,
                    options.prf,
                )?;
                self.runtime.cache().set_sync(&fingerprint.to_hex(), key.clone());
                key
            }
        };
        options.op.check("pbkdf2")?;

        Ok(DerivedKey {
            success: true,
            algorithm: "PBKDF2".to_string(),
            key: Some(hex::encode(&key)),
            salt: Some(hex::encode(&salt)),
            iterations: options.iterations,
            key_size: (options.key_length * 8) as u32,
            error: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::runtime::CoreRuntime;

    /// Tests determinism with a pinned salt and the salt echo.
    #[test]
    fn test_derive_deterministic_with_pinned_salt() {
        let runtime = CoreRuntime::new();
        let facade = Pbkdf2Facade::new(&runtime);
        let options = Pbkdf2Options {
            salt: Some("00112233445566778899aabbccddeeff".to_string()),
            iterations: 1000,
            ..Pbkdf2Options::default()
        };

        let first = facade.derive("password", &options);
        let second = facade.derive("password", &options);
        assert!(first.success);
        assert_eq!(first.key, second.key, "memoized derivation matches");
        assert_eq!(first.salt.as_deref(), Some("00112233445566778899aabbccddeeff"));
        assert_eq!(first.key_bytes().unwrap().len(), 32);
        assert_eq!(first.key_size, 256);
    }

    #[test]
    fn test_salt_generated_when_absent() {
        let runtime = CoreRuntime::new();
        let facade = Pbkdf2Facade::new(&runtime);
        let options = Pbkdf2Options {
            iterations: 1000,
            ..Pbkdf2Options::default()
        };
        let a = facade.derive("password", &options);
        let b = facade.derive("password", &options);
        assert!(a.success);
        assert_ne!(a.salt, b.salt, "fresh salt per call");
        assert_ne!(a.key, b.key);
    }

    /// Tests the iteration floor and other input validation.
    #[test]
    fn test_input_validation() {
        let runtime = CoreRuntime::new();
        let facade = Pbkdf2Facade::new(&runtime);

        let low = facade.derive(
            "password",
            &Pbkdf2Options {
                iterations: 999,
                ..Pbkdf2Options::default()
            },
        );
        assert!(!low.success);
        assert_eq!(low.error.unwrap().kind, "InvalidInput");

        let empty = facade.derive("", &Pbkdf2Options::default());
        assert!(!empty.success);

        let bad_salt = facade.derive(
            "password",
            &Pbkdf2Options {
                salt: Some("zz".to_string()),
                ..Pbkdf2Options::default()
            },
        );
        assert!(!bad_salt.success);
    }

    #[test]
    fn test_prf_changes_output() {
        let runtime = CoreRuntime::new();
        let facade = Pbkdf2Facade::new(&runtime);
        let salt = Some("aabbccdd".to_string());
        let sha256 = facade.derive(
            "pw",
            &Pbkdf2Options {
                salt: salt.clone(),
                iterations: 1000,
                prf: Pbkdf2Prf::Sha256,
                ..Pbkdf2Options::default()
            },
        );
        let sha512 = facade.derive(
            "pw",
            &Pbkdf2Options {
                salt,
                iterations: 1000,
                prf: Pbkdf2Prf::Sha512,
                ..Pbkdf2Options::default()
            },
        );
        assert_ne!(sha256.key, sha512.key);
    }
}
