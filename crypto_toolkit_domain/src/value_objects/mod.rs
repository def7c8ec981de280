// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Immutable value objects: algorithm selectors, sizes, fingerprints, and
//! the result records every public operation returns.

pub mod algorithm;
pub mod chunk_size;
pub mod crypto_results;
pub mod fingerprint;
pub mod key_version;

pub use algorithm::{
    AesKeySize, CipherMode, HashAlgorithm, OutputEncoding, PaddingScheme, Pbkdf2Prf, RsaKeySize, RsaPadding,
    SymmetricAlgorithm,
};
pub use chunk_size::ChunkSize;
pub use crypto_results::{DecryptResult, DerivedKey, EncryptResult, HashResult, SignatureResult};
pub use fingerprint::{Fingerprint, FingerprintBuilder};
pub use key_version::KeyVersion;
