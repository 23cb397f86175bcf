//! Account addresses and transaction signatures.
//!
//! Both are fixed-width byte strings whose text form is base58. JSON (the cache
//! file, RPC payloads) carries the text form; `bcs` wire encoding carries the
//! raw bytes.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Length of an account address in bytes.
pub const ADDRESS_LENGTH: usize = 32;

/// Length of an ed25519 transaction signature in bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// A 32-byte ledger account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }

    /// Parse a base58 address, naming `context` in the error.
    pub fn parse(text: &str, context: &str) -> Result<Self> {
        let bytes = bs58::decode(text.trim())
            .into_vec()
            .map_err(|e| anyhow!("Invalid {} '{}': {}", context, text, e))?;
        let bytes: [u8; ADDRESS_LENGTH] = bytes.try_into().map_err(|v: Vec<u8>| {
            anyhow!(
                "Invalid {} '{}': expected {} bytes, got {}",
                context,
                text,
                ADDRESS_LENGTH,
                v.len()
            )
        })?;
        Ok(Self(bytes))
    }
}

impl FromStr for Address {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s, "address")
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_base58())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_base58())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let text = String::deserialize(deserializer)?;
            Address::parse(&text, "address").map_err(D::Error::custom)
        } else {
            <[u8; ADDRESS_LENGTH]>::deserialize(deserializer).map(Address)
        }
    }
}

/// Signature that identifies a submitted transaction.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TxSignature(Vec<u8>);

impl TxSignature {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(anyhow!(
                "signature must be {} bytes, got {}",
                SIGNATURE_LENGTH,
                bytes.len()
            ));
        }
        Ok(Self(bytes.to_vec()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(&self.0).into_string()
    }
}

impl FromStr for TxSignature {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = bs58::decode(s.trim())
            .into_vec()
            .map_err(|e| anyhow!("Invalid signature '{}': {}", s, e))?;
        Self::from_bytes(&bytes)
    }
}

impl fmt::Display for TxSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for TxSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxSignature({})", self.to_base58())
    }
}

impl Serialize for TxSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_base58())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for TxSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let text = String::deserialize(deserializer)?;
            text.parse().map_err(D::Error::custom)
        } else {
            let bytes = Vec::<u8>::deserialize(deserializer)?;
            TxSignature::from_bytes(&bytes).map_err(D::Error::custom)
        }
    }
}
