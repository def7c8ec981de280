// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! End-to-end facade scenarios over the public API: the reference round
//! trips, digest vectors, HMAC verification, and the serializer shapes.

use proptest::prelude::*;

use crypto_toolkit::{
    CoreRuntime, HashFacade, HashOptions, ResultSerializer, SerializationFormat, SerializerOptions, SymmetricFacade,
    SymmetricOptions,
};
use crypto_toolkit_domain::{EncryptResult, HashAlgorithm};

/// Scenario: AES-256/CBC round trip with the reference key.
#[test]
fn aes_256_cbc_reference_round_trip() {
    let runtime = CoreRuntime::new();
    let crypto = SymmetricFacade::new(&runtime);
    let key = "0123456789abcdef0123456789abcdef";

    let sealed = crypto.encrypt_aes(b"Hello World", key, &SymmetricOptions::default());
    assert!(sealed.success);
    assert_eq!(sealed.algorithm, "AES");
    assert_eq!(sealed.mode.as_deref(), Some("CBC"));
    assert_eq!(sealed.key_size, Some(256));
    assert!(sealed.iv.is_some());

    let opened = crypto.decrypt_aes(
        sealed.data.as_deref().unwrap(),
        key,
        &SymmetricOptions {
            iv: sealed.iv.clone(),
            ..SymmetricOptions::default()
        },
    );
    assert!(opened.success);
    assert_eq!(opened.text().unwrap(), "Hello World");
}

/// Scenario: decrypting with the wrong key is indistinguishable from
/// decrypting tampered ciphertext.
#[test]
fn wrong_key_matches_bit_flip_failure() {
    let runtime = CoreRuntime::new();
    let crypto = SymmetricFacade::new(&runtime);

    let sealed = crypto.encrypt_aes(b"secret", "k1", &SymmetricOptions::default());
    let options = SymmetricOptions {
        iv: sealed.iv.clone(),
        ..SymmetricOptions::default()
    };

    let wrong_key = crypto.decrypt_aes(sealed.data.as_deref().unwrap(), "k2", &options);

    let mut tampered = sealed.data_bytes().unwrap();
    tampered[0] ^= 0x01;
    use base64::Engine as _;
    let tampered = base64::engine::general_purpose::STANDARD.encode(&tampered);
    let bit_flip = crypto.decrypt_aes(&tampered, "k1", &options);

    assert!(!wrong_key.success);
    assert!(!bit_flip.success);
    let wrong_key = wrong_key.error.unwrap();
    let bit_flip = bit_flip.error.unwrap();
    assert_eq!(wrong_key.kind, "DecryptionFailed");
    assert_eq!(wrong_key.kind, bit_flip.kind);
    assert_eq!(wrong_key.message, bit_flip.message);
}

/// Scenario: SHA-256 determinism against the published vector.
#[test]
fn sha256_reference_vector() {
    let runtime = CoreRuntime::new();
    let hashing = HashFacade::new(&runtime);
    let digest = hashing.sha256(b"hello", &HashOptions::default()).digest().unwrap();
    assert_eq!(digest, "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824");
}

/// Scenario: HMAC produce-then-verify, with tamper rejection.
#[test]
fn hmac_verify_reference_flow() {
    let runtime = CoreRuntime::new();
    let hashing = HashFacade::new(&runtime);

    let mac = hashing
        .hmac(HashAlgorithm::Sha256, b"message", "key", &HashOptions::default())
        .digest()
        .unwrap();
    assert!(hashing.hmac_verify(HashAlgorithm::Sha256, b"message", "key", &mac));

    let mut tampered = mac.into_bytes();
    tampered[0] = if tampered[0] == b'a' { b'b' } else { b'a' };
    let tampered = String::from_utf8(tampered).unwrap();
    assert!(!hashing.hmac_verify(HashAlgorithm::Sha256, b"message", "key", &tampered));
}

/// Scenario: the compact envelope reference shape, both directions.
#[test]
fn compact_serializer_reference_shape() {
    let serializer = ResultSerializer::new();
    let options = SerializerOptions::default();
    let result = EncryptResult {
        success: true,
        algorithm: "AES".to_string(),
        mode: Some("CBC".to_string()),
        key_size: Some(256),
        data: Some("AAA".to_string()),
        iv: Some("0011".to_string()),
        salt: None,
        warnings: Vec::new(),
        error: None,
    };

    let compact = serializer
        .serialize(&result, SerializationFormat::Compact, &options)
        .unwrap();
    assert_eq!(compact, "AES.AAA.0011.CBC.256");

    let back = serializer.deserialize(&compact, None, &options).unwrap();
    assert!(back.success);
    assert_eq!(back, result);
}

/// A freshly produced envelope survives every serializer format.
#[test]
fn live_envelope_survives_every_format() {
    let runtime = CoreRuntime::new();
    let crypto = SymmetricFacade::new(&runtime);
    let serializer = ResultSerializer::new();
    let options = SerializerOptions::default();

    let mut sealed = crypto.encrypt_aes(b"round tripping", "key", &SymmetricOptions::default());
    // Compact carries only the five positional fields.
    sealed.warnings.clear();

    for format in [
        SerializationFormat::Json,
        SerializationFormat::Compact,
        SerializationFormat::Base64,
    ] {
        let encoded = serializer.serialize(&sealed, format, &options).unwrap();
        let decoded = serializer.deserialize(&encoded, Some(format), &options).unwrap();
        assert_eq!(decoded.data, sealed.data, "{:?}", format);
        assert_eq!(decoded.iv, sealed.iv, "{:?}", format);

        // The revived envelope still decrypts.
        let opened = crypto.decrypt_aes(
            decoded.data.as_deref().unwrap(),
            "key",
            &SymmetricOptions {
                iv: decoded.iv.clone(),
                ..SymmetricOptions::default()
            },
        );
        assert_eq!(opened.text().unwrap(), "round tripping", "{:?}", format);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Round-trip property: any plaintext under any passphrase restores
    /// exactly through AES-256-CBC.
    #[test]
    fn encrypt_decrypt_round_trip_property(
        plaintext in proptest::collection::vec(any::<u8>(), 0..2048),
        key in "[a-zA-Z0-9 ]{1,40}",
    ) {
        let runtime = CoreRuntime::new();
        let crypto = SymmetricFacade::new(&runtime);

        let sealed = crypto.encrypt_aes(&plaintext, &key, &SymmetricOptions::default());
        prop_assert!(sealed.success);
        let opened = crypto.decrypt_aes(
            sealed.data.as_deref().unwrap(),
            &key,
            &SymmetricOptions { iv: sealed.iv.clone(), ..SymmetricOptions::default() },
        );
        prop_assert!(opened.success);
        prop_assert_eq!(opened.data_bytes().unwrap(), plaintext);
    }

    /// Serializer property: compact-representable envelopes survive every
    /// format byte-for-byte.
    #[test]
    fn serializer_round_trip_property(
        data in "[A-Za-z0-9+/]{4,64}",
        iv in "[0-9a-f]{32}",
    ) {
        let serializer = ResultSerializer::new();
        let options = SerializerOptions::default();
        let result = EncryptResult {
            success: true,
            algorithm: "AES".to_string(),
            mode: Some("CBC".to_string()),
            key_size: Some(256),
            data: Some(data),
            iv: Some(iv),
            salt: None,
            warnings: Vec::new(),
            error: None,
        };
        for format in [SerializationFormat::Json, SerializationFormat::Compact, SerializationFormat::Base64] {
            let encoded = serializer.serialize(&result, format, &options).unwrap();
            prop_assert_eq!(&serializer.deserialize(&encoded, Some(format), &options).unwrap(), &result);
        }
    }
}
