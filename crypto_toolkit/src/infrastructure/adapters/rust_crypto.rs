// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # RustCrypto Primitive Adapter
//!
//! This module is part of the Infrastructure layer, providing the concrete
//! implementation of the [`CryptoPrimitive`] port over the RustCrypto
//! algorithm crates and `ring`.
//!
//! ## Overview
//!
//! The adapter is a thin byte-in/byte-out wrapper:
//!
//! - **Symmetric ciphers**: AES-128/192/256, DES, 3DES, and Blowfish in
//!   CBC/ECB/CFB/OFB, plus CTR and GCM for AES. Block modes apply
//!   PKCS7/zero/no padding; stream modes are length-preserving.
//! - **Digests**: MD5, SHA-1, and the SHA-2 family.
//! - **MACs**: HMAC over every supported digest.
//! - **RSA**: OAEP-SHA256 and PKCS#1 v1.5 encryption, PKCS#1 v1.5
//!   signatures, and PKCS#8 PEM keypair generation.
//! - **Key derivation**: PBKDF2 via `ring` with SHA-1/SHA-256/SHA-512 PRFs.
//! - **Randomness**: `ring`'s `SystemRandom` CSPRNG.
//!
//! ## Contract
//!
//! Inputs are raw bytes with exact key and IV lengths; normalization and
//! IV placement happen in the facade. Failures carry no partial output.
//! Decryption failures are uniform: wrong key, corrupted ciphertext, and
//! bad padding are indistinguishable at this boundary.

use aes::{Aes128, Aes192, Aes256};
use aes_gcm::aead::consts::U12;
use aes_gcm::aead::Aead;
use aes_gcm::{AesGcm, Nonce};
use blowfish::Blowfish;
use cipher::block_padding::{NoPadding, Pkcs7, ZeroPadding};
use cipher::{
    typenum::{IsLess, Le, NonZero, U256},
    AsyncStreamCipher, BlockCipher, BlockDecryptMut, BlockEncryptMut, BlockSizeUser, KeyInit, KeyIvInit, StreamCipher,
};
use des::{Des, TdesEde3};
use md5::Md5;
use ring::rand::{SecureRandom, SystemRandom};
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{Oaep, Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use tracing::debug;

use crypto_toolkit_domain::services::{CryptoPrimitive, RsaKeyPair, SymmetricRequest};
use crypto_toolkit_domain::value_objects::{
    CipherMode, HashAlgorithm, PaddingScheme, Pbkdf2Prf, RsaKeySize, RsaPadding, SymmetricAlgorithm,
};
use crypto_toolkit_domain::CryptoError;

type Aes128Gcm = AesGcm<Aes128, U12>;
type Aes192Gcm = AesGcm<Aes192, U12>;
type Aes256Gcm = AesGcm<Aes256, U12>;

/// Concrete primitive provider over the RustCrypto crates.
pub struct RustCryptoPrimitive {
    rng: SystemRandom,
}

impl Default for RustCryptoPrimitive {
    fn default() -> Self {
        Self::new()
    }
}

impl RustCryptoPrimitive {
    pub fn new() -> Self {
        Self {
            rng: SystemRandom::new(),
        }
    }

    fn check_symmetric_shapes(request: &SymmetricRequest<'_>) -> Result<(), CryptoError> {
        let algorithm = request.algorithm;
        let mode = request.mode;

        if !algorithm.supports_mode(mode) {
            return Err(CryptoError::unsupported(format!(
                "{} does not support {} mode",
                algorithm, mode
            )));
        }

        let expected_key = match algorithm {
            SymmetricAlgorithm::Aes => match request.key.len() {
                16 | 24 | 32 => request.key.len(),
                other => {
                    return Err(CryptoError::invalid_key(format!(
                        "AES key must be 16, 24 or 32 bytes, got {}",
                        other
                    )))
                }
            },
            SymmetricAlgorithm::Des => 8,
            SymmetricAlgorithm::TripleDes => 24,
            SymmetricAlgorithm::Blowfish => 56,
        };
        if request.key.len() != expected_key {
            return Err(CryptoError::invalid_key(format!(
                "{} key must be {} bytes, got {}",
                algorithm,
                expected_key,
                request.key.len()
            )));
        }

        let expected_iv = mode.iv_len(algorithm.block_size());
        match (request.iv, expected_iv) {
            (Some(iv), 0) if !iv.is_empty() => {
                return Err(CryptoError::InvalidIv(format!("{} mode takes no IV", mode)));
            }
            (Some(iv), n) if n > 0 && iv.len() != n => {
                return Err(CryptoError::InvalidIv(format!(
                    "{} {} requires a {}-byte IV, got {}",
                    algorithm,
                    mode,
                    n,
                    iv.len()
                )));
            }
            (None, n) if n > 0 => {
                return Err(CryptoError::InvalidIv(format!("{} {} requires an IV", algorithm, mode)));
            }
            _ => {}
        }
        Ok(())
    }

    fn aes_dispatch(request: &SymmetricRequest<'_>, encrypt: bool) -> Result<Vec<u8>, CryptoError> {
        match request.key.len() {
            16 => Self::aes_sized::<Aes128, Aes128Gcm>(request, encrypt),
            24 => Self::aes_sized::<Aes192, Aes192Gcm>(request, encrypt),
            32 => Self::aes_sized::<Aes256, Aes256Gcm>(request, encrypt),
            _ => unreachable!("key length validated"),
        }
    }

    fn aes_sized<C, G>(request: &SymmetricRequest<'_>, encrypt: bool) -> Result<Vec<u8>, CryptoError>
    where
        C: BlockCipher
            + BlockEncryptMut
            + BlockDecryptMut
            + KeyInit
            + BlockSizeUser<BlockSize = cipher::consts::U16>,
        G: aes_gcm::KeyInit + Aead + aes_gcm::AeadCore<NonceSize = U12>,
        ctr::Ctr128BE<C>: KeyIvInit + StreamCipher,
    {
        match request.mode {
            CipherMode::Ctr => {
                let mut cipher = ctr::Ctr128BE::<C>::new_from_slices(request.key, request.iv.unwrap_or(&[]))
                    .map_err(|_| CryptoError::invalid_key("CTR cipher initialization failed".to_string()))?;
                let mut buffer = request.input.to_vec();
                cipher.apply_keystream(&mut buffer);
                Ok(buffer)
            }
            CipherMode::Gcm => {
                let cipher = <G as aes_gcm::KeyInit>::new_from_slice(request.key)
                    .map_err(|_| CryptoError::invalid_key("GCM cipher initialization failed".to_string()))?;
                let nonce = Nonce::<U12>::from_slice(request.iv.unwrap_or(&[]));
                if encrypt {
                    cipher
                        .encrypt(nonce, request.input)
                        .map_err(|_| CryptoError::encryption_failed("AEAD sealing failed".to_string()))
                } else {
                    // Tag mismatch and truncation both collapse into the
                    // uniform decryption failure.
                    cipher.decrypt(nonce, request.input).map_err(|_| CryptoError::DecryptionFailed)
                }
            }
            _ => Self::block_mode::<C>(request, encrypt),
        }
    }

    /// CBC/ECB/CFB/OFB over any fixed-key block cipher.
    fn block_mode<C>(request: &SymmetricRequest<'_>, encrypt: bool) -> Result<Vec<u8>, CryptoError>
    where
        C: BlockCipher + BlockEncryptMut + BlockDecryptMut + KeyInit + BlockSizeUser,
        C::BlockSize: IsLess<U256>,
        Le<C::BlockSize, U256>: NonZero,
    {
        let key = request.key;
        let iv = request.iv.unwrap_or(&[]);
        let data = request.input;
        let block = C::block_size();
        let init_err = || CryptoError::invalid_key("cipher initialization failed".to_string());

        match request.mode {
            CipherMode::Cbc => {
                if encrypt {
                    let enc = cbc::Encryptor::<C>::new_from_slices(key, iv).map_err(|_| init_err())?;
                    Self::encrypt_padded(enc, request.padding, data, block)
                } else {
                    let dec = cbc::Decryptor::<C>::new_from_slices(key, iv).map_err(|_| init_err())?;
                    Self::decrypt_padded(dec, request.padding, data, block)
                }
            }
            CipherMode::Ecb => {
                if encrypt {
                    let enc = ecb::Encryptor::<C>::new_from_slice(key).map_err(|_| init_err())?;
                    Self::encrypt_padded(enc, request.padding, data, block)
                } else {
                    let dec = ecb::Decryptor::<C>::new_from_slice(key).map_err(|_| init_err())?;
                    Self::decrypt_padded(dec, request.padding, data, block)
                }
            }
            CipherMode::Cfb => {
                let mut buffer = data.to_vec();
                if encrypt {
                    let enc = cfb_mode::Encryptor::<C>::new_from_slices(key, iv).map_err(|_| init_err())?;
                    enc.encrypt(&mut buffer);
                } else {
                    let dec = cfb_mode::Decryptor::<C>::new_from_slices(key, iv).map_err(|_| init_err())?;
                    dec.decrypt(&mut buffer);
                }
                Ok(buffer)
            }
            CipherMode::Ofb => {
                // OFB is symmetric: the keystream is XORed either way.
                let mut cipher = ofb::Ofb::<C>::new_from_slices(key, iv).map_err(|_| init_err())?;
                let mut buffer = data.to_vec();
                cipher.apply_keystream(&mut buffer);
                Ok(buffer)
            }
            CipherMode::Ctr | CipherMode::Gcm => Err(CryptoError::unsupported(format!(
                "{} mode requires a 128-bit block cipher",
                request.mode
            ))),
        }
    }

    fn encrypt_padded<M>(enc: M, padding: PaddingScheme, data: &[u8], block: usize) -> Result<Vec<u8>, CryptoError>
    where
        M: BlockEncryptMut,
    {
        match padding {
            PaddingScheme::Pkcs7 => Ok(enc.encrypt_padded_vec_mut::<Pkcs7>(data)),
            PaddingScheme::ZeroPadding => Ok(enc.encrypt_padded_vec_mut::<ZeroPadding>(data)),
            PaddingScheme::NoPadding => {
                if data.len() % block != 0 {
                    return Err(CryptoError::invalid_input(format!(
                        "input length must be a multiple of {} bytes without padding",
                        block
                    )));
                }
                Ok(enc.encrypt_padded_vec_mut::<NoPadding>(data))
            }
        }
    }

    fn decrypt_padded<M>(dec: M, padding: PaddingScheme, data: &[u8], block: usize) -> Result<Vec<u8>, CryptoError>
    where
        M: BlockDecryptMut,
    {
        if data.len() % block != 0 {
            return Err(CryptoError::DecryptionFailed);
        }
        match padding {
            PaddingScheme::Pkcs7 => dec
                .decrypt_padded_vec_mut::<Pkcs7>(data)
                .map_err(|_| CryptoError::DecryptionFailed),
            PaddingScheme::ZeroPadding => dec
                .decrypt_padded_vec_mut::<ZeroPadding>(data)
                .map_err(|_| CryptoError::DecryptionFailed),
            PaddingScheme::NoPadding => dec
                .decrypt_padded_vec_mut::<NoPadding>(data)
                .map_err(|_| CryptoError::DecryptionFailed),
        }
    }

    fn sym_dispatch(request: &SymmetricRequest<'_>, encrypt: bool) -> Result<Vec<u8>, CryptoError> {
        Self::check_symmetric_shapes(request)?;
        debug!(
            algorithm = %request.algorithm,
            mode = %request.mode,
            input_len = request.input.len(),
            encrypt,
            "dispatching symmetric primitive"
        );
        match request.algorithm {
            SymmetricAlgorithm::Aes => Self::aes_dispatch(request, encrypt),
            SymmetricAlgorithm::Des => Self::block_mode::<Des>(request, encrypt),
            SymmetricAlgorithm::TripleDes => Self::block_mode::<TdesEde3>(request, encrypt),
            SymmetricAlgorithm::Blowfish => Self::block_mode::<Blowfish>(request, encrypt),
        }
    }

    fn load_public_key(pem: &str) -> Result<RsaPublicKey, CryptoError> {
        RsaPublicKey::from_public_key_pem(pem)
            .map_err(|e| CryptoError::invalid_key(format!("cannot parse RSA public key: {}", e)))
    }

    fn load_private_key(pem: &str) -> Result<RsaPrivateKey, CryptoError> {
        RsaPrivateKey::from_pkcs8_pem(pem)
            .map_err(|e| CryptoError::invalid_key(format!("cannot parse RSA private key: {}", e)))
    }
}

impl CryptoPrimitive for RustCryptoPrimitive {
    fn encrypt_sym(&self, request: &SymmetricRequest<'_>) -> Result<Vec<u8>, CryptoError> {
        Self::sym_dispatch(request, true)
    }

    fn decrypt_sym(&self, request: &SymmetricRequest<'_>) -> Result<Vec<u8>, CryptoError> {
        Self::sym_dispatch(request, false)
    }

    fn hash(&self, algorithm: HashAlgorithm, input: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Ok(match algorithm {
            HashAlgorithm::Md5 => Md5::digest(input).to_vec(),
            HashAlgorithm::Sha1 => Sha1::digest(input).to_vec(),
            HashAlgorithm::Sha224 => Sha224::digest(input).to_vec(),
            HashAlgorithm::Sha256 => Sha256::digest(input).to_vec(),
            HashAlgorithm::Sha384 => Sha384::digest(input).to_vec(),
            HashAlgorithm::Sha512 => Sha512::digest(input).to_vec(),
        })
    }

    fn hmac(&self, algorithm: HashAlgorithm, key: &[u8], input: &[u8]) -> Result<Vec<u8>, CryptoError> {
        use hmac::{Hmac, Mac};

        macro_rules! mac_with {
            ($digest:ty) => {{
                let mut mac = <Hmac<$digest> as KeyInit>::new_from_slice(key)
                    .map_err(|_| CryptoError::invalid_key("HMAC key rejected".to_string()))?;
                mac.update(input);
                Ok(mac.finalize().into_bytes().to_vec())
            }};
        }

        match algorithm {
            HashAlgorithm::Md5 => mac_with!(Md5),
            HashAlgorithm::Sha1 => mac_with!(Sha1),
            HashAlgorithm::Sha224 => mac_with!(Sha224),
            HashAlgorithm::Sha256 => mac_with!(Sha256),
            HashAlgorithm::Sha384 => mac_with!(Sha384),
            HashAlgorithm::Sha512 => mac_with!(Sha512),
        }
    }

    fn rsa_encrypt(&self, public_key_pem: &str, padding: RsaPadding, input: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let key = Self::load_public_key(public_key_pem)?;
        let mut rng = rand::thread_rng();
        let result = match padding {
            RsaPadding::OaepSha256 => key.encrypt(&mut rng, Oaep::new::<Sha256>(), input),
            RsaPadding::Pkcs1v15 => key.encrypt(&mut rng, Pkcs1v15Encrypt, input),
        };
        result.map_err(|e| match e {
            rsa::Error::MessageTooLong => CryptoError::invalid_input("message exceeds RSA modulus capacity".to_string()),
            other => CryptoError::encryption_failed(format!("RSA encryption failed: {}", other)),
        })
    }

    fn rsa_decrypt(&self, private_key_pem: &str, padding: RsaPadding, input: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let key = Self::load_private_key(private_key_pem)?;
        let result = match padding {
            RsaPadding::OaepSha256 => key.decrypt(Oaep::new::<Sha256>(), input),
            RsaPadding::Pkcs1v15 => key.decrypt(Pkcs1v15Encrypt, input),
        };
        result.map_err(|_| CryptoError::DecryptionFailed)
    }

    fn sign(&self, private_key_pem: &str, hash: HashAlgorithm, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let key = Self::load_private_key(private_key_pem)?;
        let signature = match hash {
            HashAlgorithm::Sha1 => SigningKey::<Sha1>::new(key).try_sign(message),
            HashAlgorithm::Sha224 => SigningKey::<Sha224>::new(key).try_sign(message),
            HashAlgorithm::Sha256 => SigningKey::<Sha256>::new(key).try_sign(message),
            HashAlgorithm::Sha384 => SigningKey::<Sha384>::new(key).try_sign(message),
            HashAlgorithm::Sha512 => SigningKey::<Sha512>::new(key).try_sign(message),
            HashAlgorithm::Md5 => {
                return Err(CryptoError::unsupported("MD5 is not accepted for signatures".to_string()))
            }
        };
        signature
            .map(|s| s.to_vec())
            .map_err(|e| CryptoError::encryption_failed(format!("signing failed: {}", e)))
    }

    fn verify(
        &self,
        public_key_pem: &str,
        hash: HashAlgorithm,
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, CryptoError> {
        let key = Self::load_public_key(public_key_pem)?;
        let signature = match Signature::try_from(signature) {
            Ok(s) => s,
            Err(_) => return Ok(false),
        };
        let verified = match hash {
            HashAlgorithm::Sha1 => VerifyingKey::<Sha1>::new(key).verify(message, &signature).is_ok(),
            HashAlgorithm::Sha224 => VerifyingKey::<Sha224>::new(key).verify(message, &signature).is_ok(),
            HashAlgorithm::Sha256 => VerifyingKey::<Sha256>::new(key).verify(message, &signature).is_ok(),
            HashAlgorithm::Sha384 => VerifyingKey::<Sha384>::new(key).verify(message, &signature).is_ok(),
            HashAlgorithm::Sha512 => VerifyingKey::<Sha512>::new(key).verify(message, &signature).is_ok(),
            HashAlgorithm::Md5 => {
                return Err(CryptoError::unsupported("MD5 is not accepted for signatures".to_string()))
            }
        };
        Ok(verified)
    }

    fn derive_pbkdf2(
        &self,
        password: &[u8],
        salt: &[u8],
        iterations: u32,
        key_len: usize,
        prf: Pbkdf2Prf,
    ) -> Result<Vec<u8>, CryptoError> {
        let algorithm = match prf {
            Pbkdf2Prf::Sha1 => ring::pbkdf2::PBKDF2_HMAC_SHA1,
            Pbkdf2Prf::Sha256 => ring::pbkdf2::PBKDF2_HMAC_SHA256,
            Pbkdf2Prf::Sha512 => ring::pbkdf2::PBKDF2_HMAC_SHA512,
        };
        let iterations = std::num::NonZeroU32::new(iterations)
            .ok_or_else(|| CryptoError::KeyDerivationFailed("iteration count must be non-zero".to_string()))?;
        if key_len == 0 {
            return Err(CryptoError::KeyDerivationFailed("derived key length must be non-zero".to_string()));
        }
        let mut key = vec![0u8; key_len];
        ring::pbkdf2::derive(algorithm, iterations, salt, password, &mut key);
        Ok(key)
    }

    fn random_bytes(&self, len: usize) -> Result<Vec<u8>, CryptoError> {
        let mut bytes = vec![0u8; len];
        self.rng
            .fill(&mut bytes)
            .map_err(|e| CryptoError::encryption_failed(format!("CSPRNG failure: {:?}", e)))?;
        Ok(bytes)
    }

    fn generate_rsa_keypair(&self, bits: RsaKeySize) -> Result<RsaKeyPair, CryptoError> {
        let mut rng = rand::thread_rng();
        let private = RsaPrivateKey::new(&mut rng, bits.bits())
            .map_err(|e| CryptoError::encryption_failed(format!("RSA key generation failed: {}", e)))?;
        let public = RsaPublicKey::from(&private);

        let private_pem = private
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| CryptoError::encryption_failed(format!("PEM encoding failed: {}", e)))?
            .to_string();
        let public_pem = public
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| CryptoError::encryption_failed(format!("PEM encoding failed: {}", e)))?;

        Ok(RsaKeyPair {
            public_pem,
            private_pem,
        })
    }
}
