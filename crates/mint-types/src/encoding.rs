//! Encoding utilities for hex and base64.
//!
//! Provides shared encoding/decoding functions used across workspace crates.

use anyhow::{anyhow, Result};

// =============================================================================
// Hex
// =============================================================================

/// Parse a hex string to raw bytes.
///
/// # Arguments
/// * `hex_str` - Hex string (with or without 0x prefix)
/// * `context` - Description for error messages
pub fn parse_hex_bytes(hex_str: &str, context: &str) -> Result<Vec<u8>> {
    let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    hex::decode(hex_str).map_err(|e| anyhow!("Invalid {} hex '{}': {}", context, hex_str, e))
}

/// Parse a hex string that must decode to exactly 32 bytes.
pub fn parse_hash32(hex_str: &str, context: &str) -> Result<[u8; 32]> {
    let bytes = parse_hex_bytes(hex_str, context)?;
    bytes
        .try_into()
        .map_err(|v: Vec<u8>| anyhow!("Invalid {}: expected 32 bytes, got {}", context, v.len()))
}

// =============================================================================
// Base64 Encoding/Decoding
// =============================================================================

/// Encode bytes to base64 string.
pub fn base64_encode(bytes: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Decode base64 string to bytes with context-aware error message.
///
/// # Arguments
/// * `b64` - Base64 encoded string
/// * `context` - Description for error messages (e.g., "account data")
pub fn base64_decode(b64: &str, context: &str) -> Result<Vec<u8>> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(b64)
        .map_err(|e| anyhow!("Failed to decode {} from base64: {}", context, e))
}

/// Serde adapter for a 32-byte hash carried as hex text in JSON.
pub mod hex_hash32 {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(hash: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&hex::encode(hash))
        } else {
            serde::Serialize::serialize(hash, serializer)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        if deserializer.is_human_readable() {
            let text = String::deserialize(deserializer)?;
            super::parse_hash32(&text, "hash").map_err(D::Error::custom)
        } else {
            <[u8; 32]>::deserialize(deserializer)
        }
    }
}
