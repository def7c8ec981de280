// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Key Validator
//!
//! Pure domain service that inspects key material before it is used:
//! detects how the key is spelled (password, hex, Base64, raw bytes),
//! estimates its entropy, bands it into a strength class, and answers
//! which algorithms the material is suitable for.
//!
//! ## Entropy model
//!
//! - **Hex**: 4 bits per character (the spelling carries the material
//!   verbatim).
//! - **Base64**: 6 bits per character, padding excluded.
//! - **Raw bytes**: 8 bits per byte.
//! - **Password**: `log2(charset) * length`, where the charset size sums
//!   the classes present (lowercase 26, uppercase 26, digits 10, symbols
//!   32, non-ASCII 100), minus penalties for identical runs, common words,
//!   keyboard walks, and date fragments.
//!
//! Strength is banded on the effective strength
//! `max(entropy, length_bits / 2)`, so a long but low-variety key is not
//! written off entirely.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::value_objects::SymmetricAlgorithm;

static HEX_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9a-fA-F]+$").expect("static pattern"));
static BASE64_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9+/]+={0,2}$").expect("static pattern"));
static DATE_FRAGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(19|20)\d{2}|\d{2}[/.-]\d{2}[/.-]\d{2,4}").expect("static pattern"));

const COMMON_WORDS: &[&str] = &["password", "admin", "user", "login", "123456", "qwerty"];
const KEYBOARD_WALKS: &[&str] = &["qwerty", "asdf", "1234", "zxcv"];

/// How the key material is spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    Password,
    Hex,
    Base64,
    Raw,
}

/// Strength band on the effective strength scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStrength {
    Weak,
    Fair,
    Good,
    Strong,
    Excellent,
}

impl KeyStrength {
    fn band(effective_bits: f64) -> Self {
        if effective_bits < 40.0 {
            KeyStrength::Weak
        } else if effective_bits < 60.0 {
            KeyStrength::Fair
        } else if effective_bits < 80.0 {
            KeyStrength::Good
        } else if effective_bits < 128.0 {
            KeyStrength::Strong
        } else {
            KeyStrength::Excellent
        }
    }
}

/// Per-algorithm suitability verdicts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuitabilityMap {
    pub aes128: bool,
    pub aes192: bool,
    pub aes256: bool,
    pub des: bool,
    pub tripledes: bool,
    pub rsa: bool,
}

/// Full validation verdict for one key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValidation {
    pub valid: bool,
    #[serde(rename = "type")]
    pub key_type: KeyType,
    #[serde(rename = "lengthBytes")]
    pub length_bytes: usize,
    #[serde(rename = "lengthBits")]
    pub length_bits: usize,
    #[serde(rename = "entropyBits")]
    pub entropy_bits: f64,
    pub strength: KeyStrength,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
    #[serde(rename = "suitableFor")]
    pub suitable_for: SuitabilityMap,
}

/// Optional context narrowing the validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationOptions {
    /// Algorithm the key is intended for; adds targeted warnings.
    pub algorithm: Option<SymmetricAlgorithm>,
    /// Intended key size in bits, for targeted suggestions.
    pub target_bits: Option<u32>,
}

/// Stateless key inspection service.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyValidator;

impl KeyValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validates a textual key.
    pub fn validate(&self, key: &str, options: ValidationOptions) -> KeyValidation {
        if key.is_empty() {
            return KeyValidation {
                valid: false,
                key_type: KeyType::Password,
                length_bytes: 0,
                length_bits: 0,
                entropy_bits: 0.0,
                strength: KeyStrength::Weak,
                warnings: vec!["key is empty".to_string()],
                suggestions: vec!["provide key material".to_string()],
                suitable_for: SuitabilityMap::default(),
            };
        }

        let (key_type, length_bytes, entropy_bits) = if HEX_KEY.is_match(key) && key.len() % 2 == 0 {
            (KeyType::Hex, key.len() / 2, 4.0 * key.len() as f64)
        } else if BASE64_KEY.is_match(key) && key.len() % 4 == 0 {
            let payload = key.trim_end_matches('=').len();
            (KeyType::Base64, payload * 6 / 8, 6.0 * payload as f64)
        } else {
            (KeyType::Password, key.len(), password_entropy(key))
        };

        self.finish(key, key_type, length_bytes, entropy_bits, options)
    }

    /// Validates raw key bytes (material that never had a textual form).
    pub fn validate_bytes(&self, key: &[u8], options: ValidationOptions) -> KeyValidation {
        let entropy = 8.0 * key.len() as f64;
        self.finish("", KeyType::Raw, key.len(), entropy, options)
    }

    fn finish(
        &self,
        key: &str,
        key_type: KeyType,
        length_bytes: usize,
        entropy_bits: f64,
        options: ValidationOptions,
    ) -> KeyValidation {
        let length_bits = length_bytes * 8;
        let effective = entropy_bits.max(length_bits as f64 / 2.0);
        let strength = KeyStrength::band(effective);

        let mut warnings = Vec::new();
        let mut suggestions = Vec::new();

        if key_type == KeyType::Password {
            let lower = key.to_lowercase();
            for word in COMMON_WORDS {
                if lower.contains(word) {
                    warnings.push(format!("contains common word '{}'", word));
                }
            }
            for walk in KEYBOARD_WALKS {
                if lower.contains(walk) {
                    warnings.push(format!("contains keyboard pattern '{}'", walk));
                }
            }
            if DATE_FRAGMENT.is_match(key) {
                warnings.push("contains a date pattern".to_string());
            }
        }

        if strength <= KeyStrength::Fair {
            suggestions.push("use longer or higher-variety key material".to_string());
        }

        let suitable_for = suitability(key_type, length_bytes, effective);

        if let Some(algorithm) = options.algorithm {
            let fits = match algorithm {
                SymmetricAlgorithm::Aes => suitable_for.aes128 || suitable_for.aes192 || suitable_for.aes256,
                SymmetricAlgorithm::Des => suitable_for.des,
                SymmetricAlgorithm::TripleDes => suitable_for.tripledes,
                SymmetricAlgorithm::Blowfish => length_bytes >= 4 || effective >= 40.0,
            };
            if !fits {
                warnings.push(format!("key is not suitable for {}", algorithm));
            }
            if algorithm.is_weak() {
                warnings.push(format!("{} is cryptographically weak", algorithm));
            }
        }
        if let Some(bits) = options.target_bits {
            if (length_bits as u32) < bits && key_type != KeyType::Password {
                suggestions.push(format!("provide at least {} bits of material", bits));
            }
        }

        KeyValidation {
            valid: entropy_bits > 0.0 && strength > KeyStrength::Weak,
            key_type,
            length_bytes,
            length_bits,
            entropy_bits,
            strength,
            warnings,
            suggestions,
            suitable_for,
        }
    }
}

/// Suitability rules: material-bearing spellings qualify by decoded
/// length; passwords qualify by effective strength, since they are
/// stretched through normalization before use.
fn suitability(key_type: KeyType, length_bytes: usize, effective_bits: f64) -> SuitabilityMap {
    match key_type {
        KeyType::Password => SuitabilityMap {
            aes128: effective_bits >= 60.0,
            aes192: effective_bits >= 70.0,
            aes256: effective_bits >= 80.0,
            des: effective_bits >= 40.0,
            tripledes: effective_bits >= 60.0,
            rsa: effective_bits >= 80.0,
        },
        KeyType::Hex | KeyType::Base64 | KeyType::Raw => SuitabilityMap {
            aes128: length_bytes >= 16,
            aes192: length_bytes >= 24,
            aes256: length_bytes >= 32,
            des: length_bytes >= 8,
            tripledes: length_bytes >= 24,
            rsa: effective_bits >= 80.0,
        },
    }
}

fn password_entropy(key: &str) -> f64 {
    let mut charset = 0usize;
    if key.chars().any(|c| c.is_ascii_lowercase()) {
        charset += 26;
    }
    if key.chars().any(|c| c.is_ascii_uppercase()) {
        charset += 26;
    }
    if key.chars().any(|c| c.is_ascii_digit()) {
        charset += 10;
    }
    if key.chars().any(|c| c.is_ascii() && !c.is_ascii_alphanumeric()) {
        charset += 32;
    }
    if key.chars().any(|c| !c.is_ascii()) {
        charset += 100;
    }

    let mut entropy = (charset.max(1) as f64).log2() * key.chars().count() as f64;

    // Penalty table: runs, common words, keyboard walks, date fragments.
    if has_identical_run(key, 3) {
        entropy -= 10.0;
    }
    let lower = key.to_lowercase();
    for word in COMMON_WORDS {
        if lower.contains(word) {
            entropy -= 20.0;
        }
    }
    for walk in KEYBOARD_WALKS {
        if lower.contains(walk) {
            entropy -= 15.0;
        }
    }
    if DATE_FRAGMENT.is_match(key) {
        entropy -= 10.0;
    }

    entropy.max(0.0)
}

fn has_identical_run(key: &str, min_run: usize) -> bool {
    let chars: Vec<char> = key.chars().collect();
    let mut run = 1;
    for pair in chars.windows(2) {
        if pair[0] == pair[1] {
            run += 1;
            if run >= min_run {
                return true;
            }
        } else {
            run = 1;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests spelling detection for the three textual key types.
    ///
    /// Validates that:
    /// - Even-length hex strings detect as hex with 4 bits/char
    /// - Base64 strings detect as base64 with 6 bits/payload-char
    /// - Everything else is treated as a password
    #[test]
    fn test_key_type_detection() {
        let v = KeyValidator::new();
        let hex = v.validate("00112233445566778899aabbccddeeff", ValidationOptions::default());
        assert_eq!(hex.key_type, KeyType::Hex);
        assert_eq!(hex.length_bytes, 16);
        assert!((hex.entropy_bits - 128.0).abs() < f64::EPSILON);

        let b64 = v.validate("AAECAwQFBgcICQoLDA0ODw==", ValidationOptions::default());
        assert_eq!(b64.key_type, KeyType::Base64);

        let pw = v.validate("correct horse battery staple", ValidationOptions::default());
        assert_eq!(pw.key_type, KeyType::Password);
    }

    /// Tests the penalty table against known-bad passwords.
    #[test]
    fn test_password_penalties() {
        let v = KeyValidator::new();
        let weak = v.validate("password1234", ValidationOptions::default());
        // Length keeps it off the floor, but the penalties cap it at Fair.
        assert!(weak.strength <= KeyStrength::Fair);
        assert!(weak.entropy_bits < 40.0);
        assert!(weak.warnings.iter().any(|w| w.contains("common word")));
        assert!(weak.warnings.iter().any(|w| w.contains("keyboard pattern")));

        let run = password_entropy("aaabcdefgh");
        let no_run = password_entropy("azybcdefgh");
        assert!(run < no_run);
    }

    #[test]
    fn test_strength_banding() {
        assert_eq!(KeyStrength::band(10.0), KeyStrength::Weak);
        assert_eq!(KeyStrength::band(45.0), KeyStrength::Fair);
        assert_eq!(KeyStrength::band(65.0), KeyStrength::Good);
        assert_eq!(KeyStrength::band(100.0), KeyStrength::Strong);
        assert_eq!(KeyStrength::band(128.0), KeyStrength::Excellent);
    }

    /// Tests suitability by decoded length for material-bearing keys.
    #[test]
    fn test_suitability_by_material_length() {
        let v = KeyValidator::new();
        let k32 = v.validate(&"ab".repeat(32), ValidationOptions::default());
        assert!(k32.suitable_for.aes256);
        assert!(k32.suitable_for.tripledes);

        let k8 = v.validate("0011223344556677", ValidationOptions::default());
        assert!(k8.suitable_for.des);
        assert!(!k8.suitable_for.aes128);
    }

    #[test]
    fn test_weak_algorithm_warning() {
        let v = KeyValidator::new();
        let result = v.validate(
            "0011223344556677",
            ValidationOptions {
                algorithm: Some(SymmetricAlgorithm::Des),
                target_bits: None,
            },
        );
        assert!(result.warnings.iter().any(|w| w.contains("weak")));
    }

    #[test]
    fn test_empty_key_invalid() {
        let v = KeyValidator::new();
        let result = v.validate("", ValidationOptions::default());
        assert!(!result.valid);
        assert_eq!(result.length_bytes, 0);
    }
}
