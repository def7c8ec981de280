// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Algorithm Value Objects
//!
//! Type-safe algorithm selection for the crypto toolkit. Algorithms are
//! closed sum types: the toolkit never dispatches on strings, and an
//! unsupported combination is rejected at validation time rather than at
//! primitive dispatch.
//!
//! ## Key Features
//!
//! - **Closed enums**: `SymmetricAlgorithm`, `CipherMode`, `PaddingScheme`,
//!   `HashAlgorithm`, and the RSA parameter types enumerate everything the
//!   toolkit supports
//! - **Display names**: each value renders its canonical wire name
//!   (`"AES"`, `"3DES"`, `"SHA256"`, ...), the same spelling used by the
//!   result serializer
//! - **Mode arithmetic**: block sizes, IV lengths, and per-algorithm mode
//!   support are answered here so the facade contains no size tables
//!
//! ## Weak algorithm advisories
//!
//! DES and 3DES remain available for interoperability but are flagged via
//! [`SymmetricAlgorithm::is_weak`]; the facade surfaces the advisory as a
//! result warning, never as a failure.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CryptoError;

/// Symmetric cipher families supported by the toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymmetricAlgorithm {
    Aes,
    Des,
    TripleDes,
    Blowfish,
}

impl SymmetricAlgorithm {
    /// Canonical wire name for this algorithm.
    pub fn name(&self) -> &'static str {
        match self {
            SymmetricAlgorithm::Aes => "AES",
            SymmetricAlgorithm::Des => "DES",
            SymmetricAlgorithm::TripleDes => "3DES",
            SymmetricAlgorithm::Blowfish => "Blowfish",
        }
    }

    /// Cipher block size in bytes.
    pub fn block_size(&self) -> usize {
        match self {
            SymmetricAlgorithm::Aes => 16,
            SymmetricAlgorithm::Des | SymmetricAlgorithm::TripleDes | SymmetricAlgorithm::Blowfish => 8,
        }
    }

    /// Fixed key length in bytes, where the algorithm mandates one.
    ///
    /// AES key length is carried separately by [`AesKeySize`]; Blowfish
    /// accepts a range and returns `None`.
    pub fn fixed_key_len(&self) -> Option<usize> {
        match self {
            SymmetricAlgorithm::Des => Some(8),
            SymmetricAlgorithm::TripleDes => Some(24),
            SymmetricAlgorithm::Aes | SymmetricAlgorithm::Blowfish => None,
        }
    }

    /// Whether the algorithm is considered cryptographically weak.
    ///
    /// Weak algorithms stay usable; the facade attaches an advisory warning
    /// to their results.
    pub fn is_weak(&self) -> bool {
        matches!(self, SymmetricAlgorithm::Des | SymmetricAlgorithm::TripleDes)
    }

    /// Whether this algorithm supports the given mode.
    ///
    /// GCM and CTR require a 128-bit block; the 64-bit block ciphers are
    /// limited to CBC/ECB/CFB/OFB.
    pub fn supports_mode(&self, mode: CipherMode) -> bool {
        match mode {
            CipherMode::Gcm | CipherMode::Ctr => matches!(self, SymmetricAlgorithm::Aes),
            CipherMode::Cbc | CipherMode::Ecb | CipherMode::Cfb | CipherMode::Ofb => true,
        }
    }
}

impl fmt::Display for SymmetricAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SymmetricAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AES" => Ok(SymmetricAlgorithm::Aes),
            "DES" => Ok(SymmetricAlgorithm::Des),
            "3DES" | "TRIPLEDES" | "DES3" => Ok(SymmetricAlgorithm::TripleDes),
            "BLOWFISH" => Ok(SymmetricAlgorithm::Blowfish),
            other => Err(CryptoError::unsupported(format!("symmetric algorithm '{}'", other))),
        }
    }
}

/// Block cipher operating modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CipherMode {
    Cbc,
    Ecb,
    Cfb,
    Ofb,
    Ctr,
    Gcm,
}

impl CipherMode {
    pub fn name(&self) -> &'static str {
        match self {
            CipherMode::Cbc => "CBC",
            CipherMode::Ecb => "ECB",
            CipherMode::Cfb => "CFB",
            CipherMode::Ofb => "OFB",
            CipherMode::Ctr => "CTR",
            CipherMode::Gcm => "GCM",
        }
    }

    /// Whether the mode produces a keystream (no padding, 1:1 length).
    pub fn is_stream(&self) -> bool {
        matches!(self, CipherMode::Cfb | CipherMode::Ofb | CipherMode::Ctr | CipherMode::Gcm)
    }

    /// Whether the mode consumes an IV or nonce. ECB is the only mode that
    /// rejects one.
    pub fn requires_iv(&self) -> bool {
        !matches!(self, CipherMode::Ecb)
    }

    /// Required IV length in bytes for a cipher with the given block size.
    ///
    /// GCM always takes a 96-bit nonce; every other IV-bearing mode takes a
    /// full block.
    pub fn iv_len(&self, block_size: usize) -> usize {
        match self {
            CipherMode::Ecb => 0,
            CipherMode::Gcm => 12,
            _ => block_size,
        }
    }
}

impl fmt::Display for CipherMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CipherMode {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CBC" => Ok(CipherMode::Cbc),
            "ECB" => Ok(CipherMode::Ecb),
            "CFB" => Ok(CipherMode::Cfb),
            "OFB" => Ok(CipherMode::Ofb),
            "CTR" => Ok(CipherMode::Ctr),
            "GCM" => Ok(CipherMode::Gcm),
            other => Err(CryptoError::unsupported(format!("cipher mode '{}'", other))),
        }
    }
}

/// Padding schemes for block modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaddingScheme {
    Pkcs7,
    NoPadding,
    ZeroPadding,
}

impl PaddingScheme {
    pub fn name(&self) -> &'static str {
        match self {
            PaddingScheme::Pkcs7 => "PKCS7",
            PaddingScheme::NoPadding => "NoPadding",
            PaddingScheme::ZeroPadding => "ZeroPadding",
        }
    }
}

impl fmt::Display for PaddingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// AES key sizes in bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AesKeySize {
    Bits128,
    Bits192,
    Bits256,
}

impl AesKeySize {
    pub fn bits(&self) -> u32 {
        match self {
            AesKeySize::Bits128 => 128,
            AesKeySize::Bits192 => 192,
            AesKeySize::Bits256 => 256,
        }
    }

    pub fn bytes(&self) -> usize {
        (self.bits() / 8) as usize
    }

    pub fn from_bits(bits: u32) -> Result<Self, CryptoError> {
        match bits {
            128 => Ok(AesKeySize::Bits128),
            192 => Ok(AesKeySize::Bits192),
            256 => Ok(AesKeySize::Bits256),
            other => Err(CryptoError::invalid_key(format!(
                "AES key size must be 128, 192 or 256 bits, got {}",
                other
            ))),
        }
    }
}

impl Default for AesKeySize {
    fn default() -> Self {
        AesKeySize::Bits256
    }
}

/// RSA encryption padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RsaPadding {
    OaepSha256,
    Pkcs1v15,
}

impl RsaPadding {
    pub fn name(&self) -> &'static str {
        match self {
            RsaPadding::OaepSha256 => "OAEP-SHA256",
            RsaPadding::Pkcs1v15 => "PKCS1v15",
        }
    }

    /// Padding overhead in bytes; the largest encryptable payload is
    /// `modulus_len - overhead`.
    pub fn overhead(&self) -> usize {
        match self {
            // 2 * hash_len + 2 for OAEP with SHA-256
            RsaPadding::OaepSha256 => 66,
            RsaPadding::Pkcs1v15 => 11,
        }
    }
}

impl Default for RsaPadding {
    fn default() -> Self {
        RsaPadding::OaepSha256
    }
}

/// RSA modulus sizes accepted by the key generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RsaKeySize {
    Bits1024,
    Bits2048,
    Bits3072,
    Bits4096,
}

impl RsaKeySize {
    pub fn bits(&self) -> usize {
        match self {
            RsaKeySize::Bits1024 => 1024,
            RsaKeySize::Bits2048 => 2048,
            RsaKeySize::Bits3072 => 3072,
            RsaKeySize::Bits4096 => 4096,
        }
    }

    /// 1024-bit keys are accepted for interoperability but flagged.
    pub fn is_legacy(&self) -> bool {
        matches!(self, RsaKeySize::Bits1024)
    }

    pub fn from_bits(bits: usize) -> Result<Self, CryptoError> {
        match bits {
            1024 => Ok(RsaKeySize::Bits1024),
            2048 => Ok(RsaKeySize::Bits2048),
            3072 => Ok(RsaKeySize::Bits3072),
            4096 => Ok(RsaKeySize::Bits4096),
            other => Err(CryptoError::invalid_key(format!(
                "RSA key size must be 1024, 2048, 3072 or 4096 bits, got {}",
                other
            ))),
        }
    }
}

impl Default for RsaKeySize {
    fn default() -> Self {
        RsaKeySize::Bits2048
    }
}

/// Digest algorithms supported by the hash and HMAC facades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "MD5",
            HashAlgorithm::Sha1 => "SHA1",
            HashAlgorithm::Sha224 => "SHA224",
            HashAlgorithm::Sha256 => "SHA256",
            HashAlgorithm::Sha384 => "SHA384",
            HashAlgorithm::Sha512 => "SHA512",
        }
    }

    /// Digest output length in bytes.
    pub fn digest_len(&self) -> usize {
        match self {
            HashAlgorithm::Md5 => 16,
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha224 => 28,
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    /// Whether the digest is broken for collision resistance.
    pub fn is_weak(&self) -> bool {
        matches!(self, HashAlgorithm::Md5 | HashAlgorithm::Sha1)
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "").as_str() {
            "MD5" => Ok(HashAlgorithm::Md5),
            "SHA1" => Ok(HashAlgorithm::Sha1),
            "SHA224" => Ok(HashAlgorithm::Sha224),
            "SHA256" => Ok(HashAlgorithm::Sha256),
            "SHA384" => Ok(HashAlgorithm::Sha384),
            "SHA512" => Ok(HashAlgorithm::Sha512),
            other => Err(CryptoError::unsupported(format!("hash algorithm '{}'", other))),
        }
    }
}

/// Pseudo-random functions accepted by the PBKDF2 facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pbkdf2Prf {
    Sha1,
    Sha256,
    Sha512,
}

impl Pbkdf2Prf {
    pub fn name(&self) -> &'static str {
        match self {
            Pbkdf2Prf::Sha1 => "SHA1",
            Pbkdf2Prf::Sha256 => "SHA256",
            Pbkdf2Prf::Sha512 => "SHA512",
        }
    }
}

impl Default for Pbkdf2Prf {
    fn default() -> Self {
        Pbkdf2Prf::Sha256
    }
}

/// Text encodings for digest and MAC output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputEncoding {
    Hex,
    Base64,
}

impl Default for OutputEncoding {
    fn default() -> Self {
        OutputEncoding::Hex
    }
}
