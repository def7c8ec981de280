// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Result Serializer
//!
//! Rewrites encryption results into the three envelope formats and back:
//!
//! - **JSON**: field-for-field serialization, optionally wrapped with a
//!   `_v`/`_t` metadata block
//! - **Compact**: `algorithm.data.iv.mode.keySize` with a configurable
//!   separator; missing fields are empty segments; the format carries only
//!   those five fields
//! - **Base64**: Base64 of the JSON form without metadata
//!
//! `deserialize` auto-detects the format when none is given: a leading
//! `{` means JSON; a string that is pure Base64 and decodes to JSON means
//! Base64; anything else is Compact. The envelope version is 1.

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crypto_toolkit_domain::value_objects::EncryptResult;
use crypto_toolkit_domain::CryptoError;

/// Envelope format version stamped into JSON metadata.
pub const ENVELOPE_VERSION: u8 = 1;

/// On-wire envelope shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerializationFormat {
    Json,
    Compact,
    Base64,
}

/// Serializer tuning.
#[derive(Debug, Clone)]
pub struct SerializerOptions {
    /// Attach the `_v`/`_t` metadata block to JSON output.
    pub include_metadata: bool,
    /// Segment separator for the compact format.
    pub separator: char,
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self {
            include_metadata: false,
            separator: '.',
        }
    }
}

/// Public metadata readable without touching the ciphertext.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeInfo {
    pub algorithm: Option<String>,
    pub mode: Option<String>,
    #[serde(rename = "keySize")]
    pub key_size: Option<u32>,
    #[serde(rename = "hasIv")]
    pub has_iv: bool,
    pub format: SerializationFormat,
}

/// Stateless envelope codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultSerializer;

impl ResultSerializer {
    pub fn new() -> Self {
        Self
    }

    pub fn serialize(
        &self,
        result: &EncryptResult,
        format: SerializationFormat,
        options: &SerializerOptions,
    ) -> Result<String, CryptoError> {
        match format {
            SerializationFormat::Json => {
                if options.include_metadata {
                    let mut value = serde_json::to_value(result)?;
                    let object = value
                        .as_object_mut()
                        .ok_or_else(|| CryptoError::EncodingFailed("result is not a JSON object".to_string()))?;
                    object.insert("_v".to_string(), Value::from(ENVELOPE_VERSION));
                    object.insert("_t".to_string(), Value::from(chrono::Utc::now().timestamp_millis()));
                    Ok(serde_json::to_string(&value)?)
                } else {
                    Ok(serde_json::to_string(result)?)
                }
            }
            SerializationFormat::Compact => self.serialize_compact(result, options.separator),
            SerializationFormat::Base64 => {
                let json = serde_json::to_string(result)?;
                Ok(base64::engine::general_purpose::STANDARD.encode(json))
            }
        }
    }

    fn serialize_compact(&self, result: &EncryptResult, separator: char) -> Result<String, CryptoError> {
        let key_size = result.key_size.map(|bits| bits.to_string());
        let segments = [
            Some(result.algorithm.as_str()),
            result.data.as_deref(),
            result.iv.as_deref(),
            result.mode.as_deref(),
            key_size.as_deref(),
        ];
        let mut rendered = Vec::with_capacity(segments.len());
        for segment in segments {
            let segment = segment.unwrap_or("");
            if segment.contains(separator) {
                return Err(CryptoError::EncodingFailed(format!(
                    "field contains the separator '{}'",
                    separator
                )));
            }
            rendered.push(segment);
        }
        Ok(rendered.join(&separator.to_string()))
    }

    /// Decodes an envelope, auto-detecting the format when none is given.
    pub fn deserialize(
        &self,
        input: &str,
        format: Option<SerializationFormat>,
        options: &SerializerOptions,
    ) -> Result<EncryptResult, CryptoError> {
        let format = format.unwrap_or_else(|| Self::detect_format(input));
        match format {
            SerializationFormat::Json => {
                let mut value: Value = serde_json::from_str(input)?;
                if let Some(object) = value.as_object_mut() {
                    object.remove("_v");
                    object.remove("_t");
                }
                Ok(serde_json::from_value(value)?)
            }
            SerializationFormat::Base64 => {
                let raw = base64::engine::general_purpose::STANDARD
                    .decode(input.trim())
                    .map_err(|e| CryptoError::EncodingFailed(format!("envelope is not Base64: {}", e)))?;
                let json = String::from_utf8(raw)
                    .map_err(|_| CryptoError::EncodingFailed("envelope payload is not UTF-8".to_string()))?;
                Ok(serde_json::from_str(&json)?)
            }
            SerializationFormat::Compact => self.deserialize_compact(input, options.separator),
        }
    }

    fn deserialize_compact(&self, input: &str, separator: char) -> Result<EncryptResult, CryptoError> {
        let segments: Vec<&str> = input.split(separator).collect();
        if segments.len() > 5 || segments.is_empty() || segments[0].is_empty() {
            return Err(CryptoError::EncodingFailed(
                "compact envelope must carry 1..=5 segments starting with the algorithm".to_string(),
            ));
        }
        let segment = |index: usize| -> Option<String> {
            segments
                .get(index)
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
        };
        let key_size = match segment(4) {
            Some(bits) => Some(
                bits.parse::<u32>()
                    .map_err(|_| CryptoError::EncodingFailed("compact keySize segment is not a number".to_string()))?,
            ),
            None => None,
        };
        Ok(EncryptResult {
            success: true,
            algorithm: segments[0].to_string(),
            mode: segment(3),
            key_size,
            data: segment(1),
            iv: segment(2),
            salt: None,
            warnings: Vec::new(),
            error: None,
        })
    }

    /// Reads the public metadata of an envelope without decoding its
    /// ciphertext payload.
    pub fn get_info(&self, input: &str, options: &SerializerOptions) -> Result<EnvelopeInfo, CryptoError> {
        let format = Self::detect_format(input);
        let (algorithm, mode, key_size, has_iv) = match format {
            SerializationFormat::Compact => {
                let result = self.deserialize_compact(input, options.separator)?;
                (Some(result.algorithm), result.mode, result.key_size, result.iv.is_some())
            }
            SerializationFormat::Json | SerializationFormat::Base64 => {
                let json = match format {
                    SerializationFormat::Json => input.to_string(),
                    _ => {
                        let raw = base64::engine::general_purpose::STANDARD
                            .decode(input.trim())
                            .map_err(|e| CryptoError::EncodingFailed(format!("envelope is not Base64: {}", e)))?;
                        String::from_utf8(raw)
                            .map_err(|_| CryptoError::EncodingFailed("envelope payload is not UTF-8".to_string()))?
                    }
                };
                let value: Value = serde_json::from_str(&json)?;
                (
                    value.get("algorithm").and_then(Value::as_str).map(String::from),
                    value.get("mode").and_then(Value::as_str).map(String::from),
                    value.get("keySize").and_then(Value::as_u64).map(|bits| bits as u32),
                    value.get("iv").is_some(),
                )
            }
        };
        Ok(EnvelopeInfo {
            algorithm,
            mode,
            key_size,
            has_iv,
            format,
        })
    }

    fn detect_format(input: &str) -> SerializationFormat {
        let trimmed = input.trim();
        if trimmed.starts_with('{') {
            return SerializationFormat::Json;
        }
        let base64_shaped = !trimmed.is_empty()
            && trimmed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '=');
        if base64_shaped {
            if let Ok(raw) = base64::engine::general_purpose::STANDARD.decode(trimmed) {
                if raw.first() == Some(&b'{') {
                    return SerializationFormat::Base64;
                }
            }
        }
        SerializationFormat::Compact
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EncryptResult {
        EncryptResult {
            success: true,
            algorithm: "AES".to_string(),
            mode: Some("CBC".to_string()),
            key_size: Some(256),
            data: Some("AAA".to_string()),
            iv: Some("0011".to_string()),
            salt: None,
            warnings: Vec::new(),
            error: None,
        }
    }

    /// Tests the compact reference vector.
    #[test]
    fn test_compact_reference_shape() {
        let serializer = ResultSerializer::new();
        let options = SerializerOptions::default();
        let compact = serializer
            .serialize(&sample(), SerializationFormat::Compact, &options)
            .unwrap();
        assert_eq!(compact, "AES.AAA.0011.CBC.256");

        let back = serializer
            .deserialize("AES.AAA.0011.CBC.256", Some(SerializationFormat::Compact), &options)
            .unwrap();
        assert!(back.success);
        assert_eq!(back, sample());
    }

    /// Tests round trips through every format.
    #[test]
    fn test_round_trip_every_format() {
        let serializer = ResultSerializer::new();
        let options = SerializerOptions::default();
        for format in [
            SerializationFormat::Json,
            SerializationFormat::Compact,
            SerializationFormat::Base64,
        ] {
            let encoded = serializer.serialize(&sample(), format, &options).unwrap();
            let decoded = serializer.deserialize(&encoded, Some(format), &options).unwrap();
            assert_eq!(decoded, sample(), "{:?}", format);
        }
    }

    /// Tests format auto-detection across the three shapes.
    #[test]
    fn test_format_auto_detection() {
        let serializer = ResultSerializer::new();
        let options = SerializerOptions::default();

        for format in [
            SerializationFormat::Json,
            SerializationFormat::Compact,
            SerializationFormat::Base64,
        ] {
            let encoded = serializer.serialize(&sample(), format, &options).unwrap();
            let decoded = serializer.deserialize(&encoded, None, &options).unwrap();
            assert_eq!(decoded, sample(), "auto-detect {:?}", format);
        }
    }

    /// Tests the JSON metadata block: stamped on request, stripped on
    /// decode.
    #[test]
    fn test_json_metadata_block() {
        let serializer = ResultSerializer::new();
        let options = SerializerOptions {
            include_metadata: true,
            ..SerializerOptions::default()
        };
        let json = serializer.serialize(&sample(), SerializationFormat::Json, &options).unwrap();
        assert!(json.contains("\"_v\":1"));
        assert!(json.contains("\"_t\""));

        let back = serializer.deserialize(&json, None, &options).unwrap();
        assert_eq!(back, sample());
    }

    /// Tests compact with missing fields and a custom separator.
    #[test]
    fn test_compact_missing_fields_and_separator() {
        let serializer = ResultSerializer::new();
        let mut bare = sample();
        bare.mode = None;
        bare.iv = None;
        bare.key_size = None;

        let options = SerializerOptions {
            separator: '|',
            ..SerializerOptions::default()
        };
        let compact = serializer.serialize(&bare, SerializationFormat::Compact, &options).unwrap();
        assert_eq!(compact, "AES|AAA|||");
        let back = serializer
            .deserialize(&compact, Some(SerializationFormat::Compact), &options)
            .unwrap();
        assert_eq!(back, bare);
    }

    #[test]
    fn test_get_info_reads_public_metadata_only() {
        let serializer = ResultSerializer::new();
        let options = SerializerOptions::default();

        let json = serializer.serialize(&sample(), SerializationFormat::Json, &options).unwrap();
        let info = serializer.get_info(&json, &options).unwrap();
        assert_eq!(info.algorithm.as_deref(), Some("AES"));
        assert_eq!(info.mode.as_deref(), Some("CBC"));
        assert_eq!(info.key_size, Some(256));
        assert!(info.has_iv);
        assert_eq!(info.format, SerializationFormat::Json);

        let compact_info = serializer.get_info("AES.AAA.0011.CBC.256", &options).unwrap();
        assert_eq!(compact_info.format, SerializationFormat::Compact);
        assert_eq!(compact_info.key_size, Some(256));
    }

    #[test]
    fn test_malformed_envelopes_rejected() {
        let serializer = ResultSerializer::new();
        let options = SerializerOptions::default();
        assert!(serializer
            .deserialize("a.b.c.d.e.f", Some(SerializationFormat::Compact), &options)
            .is_err());
        assert!(serializer
            .deserialize("{not json", Some(SerializationFormat::Json), &options)
            .is_err());
        assert!(serializer
            .deserialize("AES.AAA.0011.CBC.notanumber", Some(SerializationFormat::Compact), &options)
            .is_err());
    }
}
