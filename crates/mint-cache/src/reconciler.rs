//! Cache Reconciler: the only writer of item upload status.
//!
//! Every status change (`onChain`, `verifyRun`) and every new item record goes
//! through [`CacheReconciler::merge`]. Merges are validated as a whole before
//! anything is applied, are idempotent, and are persisted immediately when the
//! reconciler was opened on a file.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Result};
use mint_registry_types::{Address, ManifestItem};
use tracing::{debug, info};

use crate::paths::atomic_write_json;
use crate::state::{CacheState, ItemRecord};

/// Partial update of one item record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemUpdate {
    pub index: u32,
    /// New name/link pair. A changed pair resets the status flags unless the
    /// update sets them explicitly.
    pub record: Option<(String, String)>,
    pub on_chain: Option<bool>,
    pub verify_run: Option<bool>,
}

impl ItemUpdate {
    /// Name and link taken from the manifest.
    pub fn record(index: u32, name: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            index,
            record: Some((name.into(), link.into())),
            on_chain: None,
            verify_run: None,
        }
    }

    /// Confirmed on chain; any earlier verification no longer applies.
    pub fn uploaded(index: u32) -> Self {
        Self {
            index,
            record: None,
            on_chain: Some(true),
            verify_run: Some(false),
        }
    }

    pub fn verified(index: u32) -> Self {
        Self {
            index,
            record: None,
            on_chain: None,
            verify_run: Some(true),
        }
    }

    /// Send the item back through upload on the next run.
    pub fn requeue(index: u32) -> Self {
        Self {
            index,
            record: None,
            on_chain: Some(false),
            verify_run: Some(false),
        }
    }
}

/// Outcome of a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub inserted: usize,
    pub changed: usize,
    pub unchanged: usize,
}

pub struct CacheReconciler {
    state: CacheState,
    path: Option<PathBuf>,
}

impl CacheReconciler {
    /// Reconciler over an in-memory state; nothing is written to disk.
    pub fn in_memory(state: CacheState) -> Self {
        Self { state, path: None }
    }

    /// Open a cache file, starting empty when it does not exist yet.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let json = std::fs::read_to_string(&path)
                .map_err(|e| anyhow!("Failed to read cache {}: {}", path.display(), e))?;
            serde_json::from_str(&json)
                .map_err(|e| anyhow!("Failed to parse cache {}: {}", path.display(), e))?
        } else {
            CacheState::default()
        };
        debug!(path = %path.display(), items = state.len(), "opened cache");
        Ok(Self {
            state,
            path: Some(path),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn state(&self) -> &CacheState {
        &self.state
    }

    /// Snapshot of the current state.
    pub fn load(&self) -> CacheState {
        self.state.clone()
    }

    pub fn into_state(self) -> CacheState {
        self.state
    }

    /// `true` once the item is confirmed on chain.
    pub fn is_complete(&self, index: u32) -> bool {
        self.state
            .items
            .get(&index)
            .map(|item| item.on_chain)
            .unwrap_or(false)
    }

    /// Record the registry identity. Setting it again to the same value is a no-op.
    pub fn set_program(&mut self, registry: Address, uuid: &str) -> Result<()> {
        let program = &mut self.state.program;
        match (program.registry, program.uuid.clone()) {
            (None, _) => {
                program.registry = Some(registry);
                program.uuid = Some(uuid.to_string());
            }
            (Some(existing), Some(existing_uuid)) if existing == registry && existing_uuid == uuid => {
                return Ok(());
            }
            (Some(existing), _) if existing == registry => {
                program.uuid = Some(uuid.to_string());
            }
            (Some(existing), _) => {
                bail!(
                    "cache already bound to registry {}; refusing to replace it with {}",
                    existing,
                    registry
                );
            }
        }
        info!(registry = %registry, uuid = uuid, "registry recorded in cache");
        self.flush()
    }

    /// Create or refresh item records from the manifest.
    pub fn register_manifest(&mut self, items: &[ManifestItem]) -> Result<MergeSummary> {
        self.merge(
            items
                .iter()
                .map(|item| ItemUpdate::record(item.index, item.name.clone(), item.uri.clone())),
        )
    }

    /// Apply updates. Either all updates are applied or none are.
    pub fn merge<I>(&mut self, updates: I) -> Result<MergeSummary>
    where
        I: IntoIterator<Item = ItemUpdate>,
    {
        let updates: Vec<ItemUpdate> = updates.into_iter().collect();
        for update in &updates {
            if update.record.is_none() && !self.state.items.contains_key(&update.index) {
                bail!("cannot update unknown item {}", update.index);
            }
        }

        let mut summary = MergeSummary::default();
        for update in updates {
            let existing = self.state.items.get(&update.index);
            let mut next = existing.cloned().unwrap_or_default();

            if let Some((name, link)) = update.record {
                if next.name != name || next.link != link {
                    if existing.is_some() {
                        debug!(index = update.index, "item metadata changed, resetting status");
                    }
                    next = ItemRecord::new(name, link);
                }
            }
            if let Some(on_chain) = update.on_chain {
                next.on_chain = on_chain;
            }
            if let Some(verify_run) = update.verify_run {
                next.verify_run = verify_run;
            }

            match existing {
                None => summary.inserted += 1,
                Some(prev) if *prev != next => summary.changed += 1,
                Some(_) => summary.unchanged += 1,
            }
            self.state.items.insert(update.index, next);
        }

        if summary.inserted + summary.changed > 0 {
            self.flush()?;
        }
        Ok(summary)
    }

    /// Persist the state when backed by a file.
    pub fn flush(&self) -> Result<()> {
        if let Some(path) = &self.path {
            atomic_write_json(path, &self.state)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manifest(n: u32) -> Vec<ManifestItem> {
        (0..n)
            .map(|index| ManifestItem {
                index,
                name: format!("Item #{}", index),
                uri: format!("https://arweave.net/{}", index),
                symbol: String::new(),
                seller_fee_basis_points: 0,
                creators: Vec::new(),
            })
            .collect()
    }

    #[test]
    fn test_merge_is_idempotent() -> Result<()> {
        let mut cache = CacheReconciler::in_memory(CacheState::default());
        cache.register_manifest(&manifest(3))?;

        let first = cache.merge(vec![ItemUpdate::uploaded(1)])?;
        assert_eq!(first.changed, 1);
        let again = cache.merge(vec![ItemUpdate::uploaded(1)])?;
        assert_eq!(again.changed, 0);
        assert_eq!(again.unchanged, 1);
        assert!(cache.is_complete(1));
        assert!(!cache.is_complete(0));
        Ok(())
    }

    #[test]
    fn test_merge_rejects_unknown_index_atomically() -> Result<()> {
        let mut cache = CacheReconciler::in_memory(CacheState::default());
        cache.register_manifest(&manifest(2))?;

        let err = cache
            .merge(vec![ItemUpdate::uploaded(0), ItemUpdate::uploaded(9)])
            .unwrap_err();
        assert!(err.to_string().contains("unknown item 9"));
        assert!(!cache.is_complete(0));
        Ok(())
    }

    #[test]
    fn test_upload_clears_previous_verification() -> Result<()> {
        let mut cache = CacheReconciler::in_memory(CacheState::default());
        cache.register_manifest(&manifest(1))?;
        cache.merge(vec![ItemUpdate::uploaded(0), ItemUpdate::verified(0)])?;
        assert!(cache.state().item(0).unwrap().verify_run);

        cache.merge(vec![ItemUpdate::uploaded(0)])?;
        let item = cache.state().item(0).unwrap();
        assert!(item.on_chain);
        assert!(!item.verify_run);
        Ok(())
    }

    #[test]
    fn test_reregister_keeps_status_unless_metadata_changed() -> Result<()> {
        let mut cache = CacheReconciler::in_memory(CacheState::default());
        let mut items = manifest(2);
        cache.register_manifest(&items)?;
        cache.merge(vec![ItemUpdate::uploaded(0), ItemUpdate::uploaded(1)])?;

        items[1].uri = "https://arweave.net/replaced".to_string();
        let summary = cache.register_manifest(&items)?;
        assert_eq!(summary.unchanged, 1);
        assert_eq!(summary.changed, 1);
        assert!(cache.is_complete(0));
        assert!(!cache.is_complete(1));
        Ok(())
    }

    #[test]
    fn test_program_is_set_once() -> Result<()> {
        let mut cache = CacheReconciler::in_memory(CacheState::default());
        let registry = Address::new([3u8; 32]);
        cache.set_program(registry, "abc123")?;
        cache.set_program(registry, "abc123")?;
        assert!(cache
            .set_program(Address::new([4u8; 32]), "zzz999")
            .is_err());
        assert_eq!(cache.state().registry(), Some(registry));
        Ok(())
    }

    #[test]
    fn test_persists_and_reloads() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("devnet-temp.json");
        {
            let mut cache = CacheReconciler::open(&path)?;
            cache.register_manifest(&manifest(4))?;
            cache.merge(vec![ItemUpdate::uploaded(2)])?;
        }

        let reopened = CacheReconciler::open(&path)?;
        assert_eq!(reopened.state().len(), 4);
        assert!(reopened.is_complete(2));
        assert_eq!(reopened.state().pending_indices(), vec![0, 1, 3]);
        Ok(())
    }
}
