//! Upload-and-reconcile pipeline for an on-chain collection registry.
//!
//! The pipeline runs in stages:
//!
//! 1. [`initializer`]: create the registry account once and record it in the cache
//! 2. [`planner`]: split items into confirmation batches of transaction groups
//! 3. [`orchestrator`]: sign, submit and confirm each batch, merging confirmed items
//! 4. [`verifier`]: decode the registry [`layout`] and compare it against the cache
//!
//! [`pipeline::upload`] and [`pipeline::verify`] tie the stages together and are
//! safe to re-run against the same cache.

pub mod error;
pub mod initializer;
pub mod instructions;
pub mod layout;
pub mod orchestrator;
pub mod pipeline;
pub mod planner;
mod submission;
pub mod verifier;

pub use error::{DecodeError, PipelineError, TransactionFailure};
pub use initializer::{InitializedRegistry, RegistryInitializer};
pub use orchestrator::{UploadOrchestrator, UploadReport};
pub use pipeline::{upload, verify, UploadOutcome, UploadRequest, VerifyOutcome};
pub use planner::{BatchPlan, BatchPlanner, ConfirmationBatch, TransactionGroup};
pub use verifier::{VerificationMismatch, VerificationReport, Verifier, VerifyOptions};
