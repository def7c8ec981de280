// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Encoding Layer
//!
//! Base64 (standard and URL-safe), hex, and UTF-8 conversions with shape
//! validation. Every decode in the toolkit funnels through this module so
//! malformed input is classified as `EncodingFailed` exactly once.
//!
//! ## Shape rules
//!
//! - **Base64**: only `[A-Za-z0-9+/=]`, length a multiple of 4, at most two
//!   trailing `=`.
//! - **Base64-URL**: `-` and `_` instead of `+` and `/`; padding optional.
//! - **Hex**: even length, `[0-9a-fA-F]` only.
//! - The empty string is valid in every encoding and decodes to empty
//!   bytes.

use base64::engine::general_purpose::{GeneralPurpose, STANDARD};
use base64::engine::{DecodePaddingMode, GeneralPurposeConfig};
use base64::{alphabet, Engine as _};

use crypto_toolkit_domain::CryptoError;

/// URL-safe engine that emits unpadded output and accepts either spelling
/// on decode.
const URL_SAFE_INDIFFERENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Text encodings understood by the layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingKind {
    Hex,
    Base64,
    Base64Url,
    Utf8,
}

/// Encodes bytes into the requested representation.
///
/// UTF-8 encoding fails when the bytes are not valid UTF-8; the other
/// representations are total.
pub fn encode(data: &[u8], kind: EncodingKind) -> Result<String, CryptoError> {
    match kind {
        EncodingKind::Hex => Ok(hex::encode(data)),
        EncodingKind::Base64 => Ok(STANDARD.encode(data)),
        EncodingKind::Base64Url => Ok(URL_SAFE_INDIFFERENT.encode(data)),
        EncodingKind::Utf8 => String::from_utf8(data.to_vec())
            .map_err(|_| CryptoError::EncodingFailed("bytes are not valid UTF-8".to_string())),
    }
}

/// Decodes a string in the requested representation.
pub fn decode(input: &str, kind: EncodingKind) -> Result<Vec<u8>, CryptoError> {
    if input.is_empty() {
        return Ok(Vec::new());
    }
    if !validate(input, kind) {
        return Err(CryptoError::EncodingFailed(format!(
            "input is not well-formed {}",
            kind_name(kind)
        )));
    }
    match kind {
        EncodingKind::Hex => {
            hex::decode(input).map_err(|e| CryptoError::EncodingFailed(format!("hex decode failed: {}", e)))
        }
        EncodingKind::Base64 => STANDARD
            .decode(input)
            .map_err(|e| CryptoError::EncodingFailed(format!("Base64 decode failed: {}", e))),
        EncodingKind::Base64Url => URL_SAFE_INDIFFERENT
            .decode(input)
            .map_err(|e| CryptoError::EncodingFailed(format!("Base64-URL decode failed: {}", e))),
        EncodingKind::Utf8 => Ok(input.as_bytes().to_vec()),
    }
}

/// Checks the shape of a string against an encoding without decoding it.
///
/// The empty string is valid in every encoding.
pub fn validate(input: &str, kind: EncodingKind) -> bool {
    if input.is_empty() {
        return true;
    }
    match kind {
        EncodingKind::Hex => input.len() % 2 == 0 && input.chars().all(|c| c.is_ascii_hexdigit()),
        EncodingKind::Base64 => {
            if input.len() % 4 != 0 {
                return false;
            }
            let trimmed = input.trim_end_matches('=');
            if input.len() - trimmed.len() > 2 {
                return false;
            }
            trimmed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/')
                && !trimmed.contains('=')
        }
        EncodingKind::Base64Url => {
            let trimmed = input.trim_end_matches('=');
            if input.len() - trimmed.len() > 2 {
                return false;
            }
            trimmed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        }
        EncodingKind::Utf8 => true,
    }
}

fn kind_name(kind: EncodingKind) -> &'static str {
    match kind {
        EncodingKind::Hex => "hex",
        EncodingKind::Base64 => "Base64",
        EncodingKind::Base64Url => "Base64-URL",
        EncodingKind::Utf8 => "UTF-8",
    }
}
