// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Timing-Safe Equality
//!
//! Byte comparison whose running time does not depend on the position of
//! the first differing byte. Every MAC, signature, and digest comparison in
//! the toolkit routes through these functions; `==` on sensitive values is
//! forbidden by convention.
//!
//! The core compares equal-length slices by accumulating the XOR of every
//! byte pair into a single accumulator and checking the accumulator against
//! zero at the end. Length inequality short-circuits; length is public.
//!
//! The hex and Base64 variants decode both operands first. The Base64
//! variant applies the canonical padding rule: at most two trailing `=`
//! characters are accepted and padding is stripped before comparison, so
//! padded and unpadded spellings of the same bytes compare equal.

use base64::engine::general_purpose::GeneralPurpose;
use base64::engine::{DecodePaddingMode, GeneralPurposeConfig};
use base64::{alphabet, Engine as _};

use crate::error::CryptoError;

const STANDARD_INDIFFERENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Constant-time equality over raw byte slices.
///
/// Returns `false` immediately when the lengths differ.
pub fn timing_safe_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut acc: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        acc |= x ^ y;
    }
    acc == 0
}

/// Constant-time equality over hex-encoded operands.
///
/// Both operands are decoded first; a malformed operand is an
/// `EncodingFailed` error, not a silent mismatch.
pub fn timing_safe_eq_hex(a: &str, b: &str) -> Result<bool, CryptoError> {
    let a = hex::decode(a).map_err(|e| CryptoError::EncodingFailed(format!("left operand is not hex: {}", e)))?;
    let b = hex::decode(b).map_err(|e| CryptoError::EncodingFailed(format!("right operand is not hex: {}", e)))?;
    Ok(timing_safe_eq(&a, &b))
}

/// Constant-time equality over Base64-encoded operands.
///
/// Applies the canonical padding rule before decoding: trailing `=` is
/// stripped, and more than two padding characters is malformed input.
pub fn timing_safe_eq_base64(a: &str, b: &str) -> Result<bool, CryptoError> {
    let a = decode_canonical_base64(a)?;
    let b = decode_canonical_base64(b)?;
    Ok(timing_safe_eq(&a, &b))
}

fn decode_canonical_base64(s: &str) -> Result<Vec<u8>, CryptoError> {
    let stripped = s.trim_end_matches('=');
    if s.len() - stripped.len() > 2 {
        return Err(CryptoError::EncodingFailed(
            "Base64 operand carries more than two padding characters".to_string(),
        ));
    }
    STANDARD_INDIFFERENT
        .decode(stripped)
        .map_err(|e| CryptoError::EncodingFailed(format!("operand is not Base64: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests reflexivity and mismatch detection over raw bytes.
    ///
    /// Validates that:
    /// - Identical slices compare equal
    /// - A single differing byte at any position compares unequal
    /// - Length inequality returns false
    #[test]
    fn test_timing_safe_eq_basic_properties() {
        let a = [0u8, 1, 2, 3, 255];
        assert!(timing_safe_eq(&a, &a));
        assert!(timing_safe_eq(b"", b""));
        assert!(!timing_safe_eq(&a, &[0, 1, 2, 3]));

        for i in 0..a.len() {
            let mut b = a;
            b[i] ^= 0x01;
            assert!(!timing_safe_eq(&a, &b), "difference at byte {} undetected", i);
        }
    }

    #[test]
    fn test_hex_variant_decodes_before_comparing() {
        assert!(timing_safe_eq_hex("00ff10", "00FF10").unwrap());
        assert!(!timing_safe_eq_hex("00ff10", "00ff11").unwrap());
        assert!(timing_safe_eq_hex("zz", "00").is_err());
    }

    /// Tests the canonical Base64 padding rule.
    ///
    /// Validates that:
    /// - Padded and unpadded spellings of the same bytes compare equal
    /// - More than two trailing `=` is rejected as malformed
    #[test]
    fn test_base64_variant_padding_rule() {
        assert!(timing_safe_eq_base64("aGVsbG8=", "aGVsbG8").unwrap());
        assert!(timing_safe_eq_base64("aQ==", "aQ").unwrap());
        assert!(!timing_safe_eq_base64("aGVsbG8=", "aGVsbA==").unwrap());
        assert!(timing_safe_eq_base64("aQ===", "aQ").is_err());
    }

    /// Measures that equal-length compares take comparable time whether the
    /// difference is early or late in the buffer. Coarse by nature; the
    /// bound is deliberately loose to stay robust under CI scheduling
    /// noise.
    #[test]
    fn test_equal_length_compares_have_similar_cost() {
        use std::time::Instant;

        const LEN: usize = 4096;
        const ITERS: u32 = 10_000;

        let base = vec![0xA5u8; LEN];
        let mut early = base.clone();
        early[0] ^= 1;
        let mut late = base.clone();
        late[LEN - 1] ^= 1;

        let mut sink = false;
        let t_early = Instant::now();
        for _ in 0..ITERS {
            sink ^= timing_safe_eq(std::hint::black_box(&base), std::hint::black_box(&early));
        }
        let t_early = t_early.elapsed();

        let t_late = Instant::now();
        for _ in 0..ITERS {
            sink ^= timing_safe_eq(std::hint::black_box(&base), std::hint::black_box(&late));
        }
        let t_late = t_late.elapsed();
        std::hint::black_box(sink);

        let (fast, slow) = if t_early < t_late {
            (t_early, t_late)
        } else {
            (t_late, t_early)
        };
        // Early-exit comparison would differ by orders of magnitude.
        assert!(
            slow.as_nanos() < fast.as_nanos().saturating_mul(3).max(1),
            "early {:?} vs late {:?}",
            t_early,
            t_late
        );
    }
}
