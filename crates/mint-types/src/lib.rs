//! Shared types for the mint-registry workspace.
//!
//! This crate provides the value types every other crate exchanges:
//!
//! - [`address`]: base58 [`Address`] and [`TxSignature`]
//! - [`config`]: [`RegistryConfig`] and the tagged [`MintSetting`] variants
//! - [`manifest`]: [`ManifestItem`] records produced upstream
//! - [`transaction`]: signed wire [`Transaction`]s
//! - [`encoding`] / [`env_utils`]: small shared helpers

pub mod address;
pub mod config;
pub mod encoding;
pub mod env_utils;
pub mod manifest;
pub mod transaction;

pub use address::{Address, TxSignature};
pub use config::{
    CollectionSettings, Creator, EndSettingKind, MintSetting, RegistryConfig, WhitelistMode,
    MAX_CREATOR_LIMIT, MAX_NAME_LENGTH, MAX_SYMBOL_LENGTH, MAX_URI_LENGTH,
};
pub use manifest::{ManifestCreator, ManifestItem};
pub use transaction::{AccountMeta, Instruction, Message, ReferencePoint, Transaction};
