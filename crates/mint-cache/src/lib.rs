//! Durable upload cache for registry item records.
//!
//! This crate provides:
//! - `CacheState`: the persisted schema (registry identity + per-item status)
//! - `CacheReconciler`: resume-safe merging of upload and verification progress
//! - `paths`: cache file locations and atomic writes

pub mod paths;
pub mod reconciler;
pub mod state;

pub use reconciler::{CacheReconciler, ItemUpdate, MergeSummary};
pub use state::{CacheState, ItemRecord, ProgramInfo};
