//! Registry Transport Layer
//!
//! The two collaborators the upload pipeline drives:
//!
//! - [`NetworkClient`]: submit transactions, await confirmation, read accounts
//! - [`Wallet`]: sign a set of transactions as one atomic request
//!
//! Concrete implementations:
//! - [`rpc::RpcClient`]: JSON-RPC over HTTP
//! - [`wallet::KeypairWallet`]: ed25519 keypair loaded from a local file
//!
//! # Example
//!
//! ```ignore
//! use mint_transport::{network::resolve_rpc_endpoint, rpc::RpcClient, NetworkClient};
//!
//! let client = RpcClient::new(&resolve_rpc_endpoint("devnet", None));
//! let reference = client.reference_point().await?;
//! ```

pub mod network;
pub mod rpc;
pub mod wallet;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use mint_registry_types::{Address, ReferencePoint, Transaction, TxSignature};

pub use rpc::RpcClient;
pub use wallet::KeypairWallet;

/// Final status of a transaction found by signature lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureStatus {
    /// Landed and executed successfully.
    Confirmed,
    /// Landed but execution failed.
    Failed(String),
}

/// Ledger network primitives used by the pipeline.
#[async_trait]
pub trait NetworkClient: Send + Sync {
    /// Fresh reference point for new transactions.
    async fn reference_point(&self) -> Result<ReferencePoint>;

    /// Submit a fully signed transaction, returning its id.
    async fn submit(&self, transaction: &Transaction) -> Result<TxSignature>;

    /// Wait up to `timeout` for confirmation. `Ok(false)` means the outcome is unknown.
    async fn confirm(&self, signature: &TxSignature, timeout: Duration) -> Result<bool>;

    /// Raw account data; `None` when the account does not exist.
    async fn account_bytes(&self, address: &Address) -> Result<Option<Vec<u8>>>;

    /// Look a transaction up by id. `None` when the ledger has no record of it.
    async fn lookup_by_signature(&self, signature: &TxSignature) -> Result<Option<SignatureStatus>>;

    /// Minimum balance that keeps an account of `space` bytes alive.
    async fn rent_exempt_balance(&self, space: usize) -> Result<u64>;
}

/// Transaction signer. `sign_all` signs every transaction or fails as a whole.
#[async_trait]
pub trait Wallet: Send + Sync {
    fn address(&self) -> Address;

    async fn sign_all(&self, transactions: Vec<Transaction>) -> Result<Vec<Transaction>>;
}
