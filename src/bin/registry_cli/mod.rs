//! CLI subcommand implementations for mint-registry

pub mod output;
pub mod show;
pub mod upload;
pub mod verify;

use std::path::PathBuf;

use anyhow::Result;
use mint_registry::cache::paths::cache_file_path;
use mint_registry::cache::CacheReconciler;
use mint_registry::config::resolve_keypair_path;
use mint_registry::transport::network::resolve_rpc_endpoint;
use mint_registry::transport::{KeypairWallet, RpcClient};
use tracing::debug;

/// Global options shared by every subcommand.
pub struct CliContext {
    pub cache_root: PathBuf,
    pub cache_name: String,
    pub cluster: String,
    pub rpc_url: Option<String>,
    pub keypair: Option<PathBuf>,
    pub json: bool,
}

impl CliContext {
    pub fn cache_path(&self) -> PathBuf {
        cache_file_path(&self.cache_root, &self.cluster, &self.cache_name)
    }

    pub fn open_cache(&self) -> Result<CacheReconciler> {
        CacheReconciler::open(self.cache_path())
    }

    pub fn rpc_client(&self) -> RpcClient {
        let endpoint = resolve_rpc_endpoint(&self.cluster, self.rpc_url.as_deref());
        debug!(endpoint = %endpoint, "using rpc endpoint");
        RpcClient::new(&endpoint)
    }

    pub fn wallet(&self) -> Result<KeypairWallet> {
        let path = resolve_keypair_path(self.keypair.as_deref())?;
        KeypairWallet::from_file(&path)
    }
}
