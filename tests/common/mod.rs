#![allow(dead_code)]
#![allow(unused_imports)]
//! Shared test utilities for integration tests.
//!
//! # Modules
//!
//! - `fixtures`: manifest, collection and upload request builders
//! - `mocks`: in-memory ledger and counting wallet

pub mod fixtures;
pub mod mocks;

pub use fixtures::{collection, manifest, manifest_with_shares, request, request_with_planner, PROGRAM_ID};
pub use mocks::{Fault, FaultKey, MockLedger, MockWallet};
