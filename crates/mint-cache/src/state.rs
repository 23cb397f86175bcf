//! Persisted cache schema.
//!
//! ```json
//! { "program": { "uuid": "Ab12Cd", "candyMachine": "<base58>" },
//!   "items": { "0": { "link": "...", "name": "...", "onChain": true, "verifyRun": false } } }
//! ```

use std::collections::BTreeMap;

use mint_registry_types::Address;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramInfo {
    /// Short collection id derived from the registry address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Registry account address; set once.
    #[serde(
        rename = "candyMachine",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub registry: Option<Address>,
}

/// One item's metadata pointer and upload status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub link: String,
    pub name: String,
    #[serde(default)]
    pub on_chain: bool,
    #[serde(default)]
    pub verify_run: bool,
}

impl ItemRecord {
    pub fn new(name: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            name: name.into(),
            on_chain: false,
            verify_run: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheState {
    #[serde(default)]
    pub program: ProgramInfo,
    #[serde(default)]
    pub items: BTreeMap<u32, ItemRecord>,
}

impl CacheState {
    pub fn registry(&self) -> Option<Address> {
        self.program.registry
    }

    pub fn item(&self, index: u32) -> Option<&ItemRecord> {
        self.items.get(&index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn on_chain_count(&self) -> usize {
        self.items.values().filter(|item| item.on_chain).count()
    }

    pub fn verified_count(&self) -> usize {
        self.items.values().filter(|item| item.verify_run).count()
    }

    /// Indices still waiting to be written, in order.
    pub fn pending_indices(&self) -> Vec<u32> {
        self.items
            .iter()
            .filter(|(_, item)| !item.on_chain)
            .map(|(index, _)| *index)
            .collect()
    }
}
