//! mint-registry: provision an on-chain collection registry, upload item
//! records into it in resumable batches, and verify what the ledger stored.
//!
//! The workspace is split by concern:
//!
//! - [`types`]: addresses, registry config, manifest items, wire transactions
//! - [`transport`]: the network and wallet seams plus their JSON-RPC / keypair implementations
//! - [`cache`]: the durable upload cache and its reconciler
//! - [`pipeline`]: initializer, planner, orchestrator, verifier
//!
//! [`config`] loads the operator's input files for the CLI.

pub mod config;

pub use mint_cache as cache;
pub use mint_core as pipeline;
pub use mint_registry_types as types;
pub use mint_transport as transport;
