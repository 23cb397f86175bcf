//! Error taxonomy of the upload and verification pipeline.
//!
//! [`PipelineError`] stops a run (or, for the verifier's aggregate checks,
//! blocks declaring the registry launch-ready). [`TransactionFailure`] is
//! recorded per transaction and never stops a run: the affected items stay
//! pending in the cache and the next run retries them.

use mint_registry_types::{Address, TxSignature};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("manifest is empty")]
    EmptyManifest,

    #[error("registry initialization failed: {source}")]
    InitializationFailed {
        signature: Option<TxSignature>,
        #[source]
        source: anyhow::Error,
    },

    #[error("signing failed for batch {batch}: {source}")]
    SigningFailed {
        batch: usize,
        #[source]
        source: anyhow::Error,
    },

    #[error("network request failed: {0}")]
    Network(#[source] anyhow::Error),

    #[error("cache update failed: {0}")]
    Cache(#[source] anyhow::Error),

    #[error("cache has no registry address; run upload first")]
    RegistryNotInitialized,

    #[error("registry account {0} not found")]
    RegistryNotFound(Address),

    #[error("registry header unreadable: {0}")]
    Decode(#[from] DecodeError),

    #[error("registry stores {stored} items but {expected} are expected")]
    UnderReported { stored: u32, expected: u64 },

    #[error("{requested} items requested but the registry holds at most {capacity}")]
    OverCapacity { requested: u64, capacity: u64 },
}

impl PipelineError {
    pub fn invalid_config(err: impl std::fmt::Display) -> Self {
        PipelineError::InvalidConfig(err.to_string())
    }
}

/// Per-transaction failure inside a confirmation batch.
#[derive(Debug, Clone, Error)]
pub enum TransactionFailure {
    #[error("building transaction for items {first}..={last} failed: {reason}")]
    BuildFailed { first: u32, last: u32, reason: String },

    #[error("submitting transaction for items {first}..={last} failed: {reason}")]
    SubmissionFailed {
        first: u32,
        last: u32,
        signature: Option<TxSignature>,
        reason: String,
    },

    #[error("transaction {signature} for items {first}..={last} was not confirmed in time")]
    ConfirmationTimeout {
        first: u32,
        last: u32,
        signature: TxSignature,
    },
}

impl TransactionFailure {
    /// First and last item index covered by the failed transaction.
    pub fn item_range(&self) -> (u32, u32) {
        match self {
            TransactionFailure::BuildFailed { first, last, .. }
            | TransactionFailure::SubmissionFailed { first, last, .. }
            | TransactionFailure::ConfirmationTimeout { first, last, .. } => (*first, *last),
        }
    }
}

/// Failure to read a value out of the registry's packed layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("buffer too short: need {needed} bytes, have {actual}")]
    Truncated { needed: usize, actual: usize },

    #[error("item {index}: {field} length {length} exceeds {max} bytes")]
    FieldTooLong {
        index: u32,
        field: &'static str,
        length: usize,
        max: usize,
    },

    #[error("item {index}: {field} is not valid UTF-8")]
    InvalidUtf8 { index: u32, field: &'static str },
}
