//! Input files and environment for a CLI run.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use mint_core::pipeline::DEFAULT_CONFIRM_TIMEOUT;
use mint_core::planner::{DEFAULT_CONFIRMATION_BATCH_SIZE, DEFAULT_TRANSACTION_SIZE};
use mint_core::BatchPlanner;
use mint_registry_types::env_utils::{env_duration_secs_or, env_string, CONFIRM_TIMEOUT_ENV, KEYPAIR_ENV};
use mint_registry_types::{CollectionSettings, ManifestItem};
use mint_transport::wallet::default_keypair_path;
use serde::Deserialize;

/// Collection config file: operator settings plus optional batch sizing.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionConfigFile {
    #[serde(flatten)]
    pub collection: CollectionSettings,
    #[serde(default)]
    pub confirmation_batch_size: Option<usize>,
    #[serde(default)]
    pub transaction_size: Option<usize>,
}

impl CollectionConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read collection config {}", path.display()))?;
        serde_json::from_str(&json)
            .map_err(|e| anyhow!("Failed to parse collection config {}: {}", path.display(), e))
    }

    pub fn planner(&self) -> Result<BatchPlanner> {
        BatchPlanner::new(
            self.confirmation_batch_size
                .unwrap_or(DEFAULT_CONFIRMATION_BATCH_SIZE),
            self.transaction_size.unwrap_or(DEFAULT_TRANSACTION_SIZE),
        )
        .map_err(|e| anyhow!("{}", e))
    }
}

/// Load the manifest: a JSON array of items, sorted by index.
pub fn load_manifest(path: &Path) -> Result<Vec<ManifestItem>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    let mut items: Vec<ManifestItem> = serde_json::from_str(&json)
        .map_err(|e| anyhow!("Failed to parse manifest {}: {}", path.display(), e))?;
    items.sort_by_key(|item| item.index);
    Ok(items)
}

/// Keypair path: explicit flag, then `MINT_KEYPAIR`, then the default location.
pub fn resolve_keypair_path(explicit: Option<&Path>) -> Result<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| env_string(KEYPAIR_ENV).map(PathBuf::from))
        .or_else(default_keypair_path)
        .ok_or_else(|| anyhow!("no keypair given and no home directory to look in"))
}

pub fn confirm_timeout() -> Duration {
    env_duration_secs_or(CONFIRM_TIMEOUT_ENV, DEFAULT_CONFIRM_TIMEOUT.as_secs())
}
