//! Collection-level registry configuration.
//!
//! [`RegistryConfig`] is fixed when the registry is initialized and never
//! changes afterwards. Optional mint behaviours are modelled as a list of
//! [`MintSetting`] variants, each carrying only its own fields.

use std::collections::HashSet;

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Deserializer, Serialize};

use crate::address::Address;
use crate::encoding::hex_hash32;
use crate::manifest::ManifestItem;

/// Maximum byte length of an item name stored on chain.
pub const MAX_NAME_LENGTH: usize = 32;
/// Maximum byte length of an item URI stored on chain.
pub const MAX_URI_LENGTH: usize = 200;
/// Maximum byte length of the collection symbol.
pub const MAX_SYMBOL_LENGTH: usize = 10;
/// Maximum number of creators per collection.
pub const MAX_CREATOR_LIMIT: usize = 5;
/// Seller fee is expressed in basis points of the sale price.
pub const MAX_SELLER_FEE_BASIS_POINTS: u16 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    pub address: Address,
    pub share: u8,
    #[serde(default = "default_verified")]
    pub verified: bool,
}

fn default_verified() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndSettingKind {
    /// Minting stops at a unix timestamp.
    Date,
    /// Minting stops after a number of items.
    Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WhitelistMode {
    BurnEveryTime,
    NeverBurn,
}

/// Optional mint behaviour. Each kind may appear at most once per registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MintSetting {
    GoLive {
        #[serde(deserialize_with = "unix_or_rfc3339")]
        date: i64,
    },
    EndSettings {
        kind: EndSettingKind,
        value: u64,
    },
    Gatekeeper {
        network: Address,
        #[serde(default)]
        expire_on_use: bool,
    },
    Whitelist {
        #[serde(rename = "burn_mode")]
        mode: WhitelistMode,
        mint: Address,
        #[serde(default)]
        presale: bool,
        #[serde(default)]
        discount_price: Option<u64>,
    },
    /// Every mint shares one placeholder; no per-item lines are stored.
    Hidden {
        name: String,
        uri: String,
        #[serde(with = "hex_hash32")]
        hash: [u8; 32],
    },
}

impl MintSetting {
    pub fn kind(&self) -> &'static str {
        match self {
            MintSetting::GoLive { .. } => "go_live",
            MintSetting::EndSettings { .. } => "end_settings",
            MintSetting::Gatekeeper { .. } => "gatekeeper",
            MintSetting::Whitelist { .. } => "whitelist",
            MintSetting::Hidden { .. } => "hidden",
        }
    }
}

/// Accepts either unix seconds or an RFC 3339 timestamp.
fn unix_or_rfc3339<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    use serde::de::Error as _;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Unix(i64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Unix(secs) => Ok(secs),
        Raw::Text(text) => chrono::DateTime::parse_from_rfc3339(text.trim())
            .map(|dt| dt.timestamp())
            .map_err(|e| D::Error::custom(format!("invalid go-live date '{}': {}", text, e))),
    }
}

/// Settings supplied by the operator rather than the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionSettings {
    pub price: u64,
    pub treasury: Address,
    #[serde(default)]
    pub token_mint: Option<Address>,
    #[serde(default = "default_true")]
    pub is_mutable: bool,
    #[serde(default = "default_true")]
    pub retain_authority: bool,
    #[serde(default)]
    pub max_supply: u64,
    /// Capacity of the registry; defaults to the manifest length.
    #[serde(default)]
    pub items_available: Option<u64>,
    #[serde(default)]
    pub settings: Vec<MintSetting>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub items_available: u64,
    pub symbol: String,
    pub seller_fee_basis_points: u16,
    pub is_mutable: bool,
    pub retain_authority: bool,
    pub max_supply: u64,
    pub price: u64,
    pub treasury: Address,
    pub token_mint: Option<Address>,
    pub creators: Vec<Creator>,
    pub settings: Vec<MintSetting>,
}

impl RegistryConfig {
    /// Build the registry config from the manifest's first item plus operator settings.
    pub fn from_manifest(manifest: &[ManifestItem], collection: &CollectionSettings) -> Result<Self> {
        let first = manifest
            .first()
            .ok_or_else(|| anyhow!("manifest is empty"))?;
        let creators = first
            .creators
            .iter()
            .map(|creator| {
                let address = creator
                    .address
                    .as_deref()
                    .ok_or_else(|| anyhow!("creator address is missing"))?;
                Ok(Creator {
                    address: Address::parse(address, "creator address")?,
                    share: creator.share,
                    verified: true,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            items_available: collection
                .items_available
                .unwrap_or(manifest.len() as u64),
            symbol: first.symbol.clone(),
            seller_fee_basis_points: first.seller_fee_basis_points,
            is_mutable: collection.is_mutable,
            retain_authority: collection.retain_authority,
            max_supply: collection.max_supply,
            price: collection.price,
            treasury: collection.treasury,
            token_mint: collection.token_mint,
            creators,
            settings: collection.settings.clone(),
        })
    }

    pub fn hidden_settings(&self) -> Option<&MintSetting> {
        self.settings
            .iter()
            .find(|setting| matches!(setting, MintSetting::Hidden { .. }))
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden_settings().is_some()
    }

    /// Check every collection-level invariant except the item count.
    pub fn validate(&self) -> Result<()> {
        if self.creators.is_empty() {
            bail!("there must be at least one creator");
        }
        if self.creators.len() > MAX_CREATOR_LIMIT {
            bail!(
                "at most {} creators are allowed, got {}",
                MAX_CREATOR_LIMIT,
                self.creators.len()
            );
        }
        let total_share: u32 = self.creators.iter().map(|c| u32::from(c.share)).sum();
        if total_share != 100 {
            bail!("creators shares must add up to 100, got {}", total_share);
        }
        if self.symbol.len() > MAX_SYMBOL_LENGTH {
            bail!(
                "symbol '{}' exceeds {} bytes",
                self.symbol,
                MAX_SYMBOL_LENGTH
            );
        }
        if self.seller_fee_basis_points > MAX_SELLER_FEE_BASIS_POINTS {
            bail!(
                "seller fee {} exceeds {} basis points",
                self.seller_fee_basis_points,
                MAX_SELLER_FEE_BASIS_POINTS
            );
        }

        let mut seen = HashSet::new();
        for setting in &self.settings {
            if !seen.insert(setting.kind()) {
                bail!("mint setting '{}' given more than once", setting.kind());
            }
            if let MintSetting::Hidden { name, uri, .. } = setting {
                if name.len() > MAX_NAME_LENGTH {
                    bail!("hidden name exceeds {} bytes", MAX_NAME_LENGTH);
                }
                if uri.len() > MAX_URI_LENGTH {
                    bail!("hidden uri exceeds {} bytes", MAX_URI_LENGTH);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ManifestCreator;

    fn creator(share: u8, byte: u8) -> Creator {
        Creator {
            address: Address::new([byte; 32]),
            share,
            verified: true,
        }
    }

    fn config(creators: Vec<Creator>) -> RegistryConfig {
        RegistryConfig {
            items_available: 10,
            symbol: "ART".to_string(),
            seller_fee_basis_points: 500,
            is_mutable: true,
            retain_authority: true,
            max_supply: 0,
            price: 1_000_000_000,
            treasury: Address::new([1u8; 32]),
            token_mint: None,
            creators,
            settings: Vec::new(),
        }
    }

    #[test]
    fn test_shares_must_sum_to_100() {
        let err = config(vec![creator(60, 2), creator(30, 3)])
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("add up to 100"));
        assert!(config(vec![creator(60, 2), creator(40, 3)]).validate().is_ok());
    }

    #[test]
    fn test_empty_creator_list_rejected() {
        assert!(config(vec![]).validate().is_err());
    }

    #[test]
    fn test_duplicate_setting_kind_rejected() {
        let mut cfg = config(vec![creator(100, 2)]);
        cfg.settings = vec![
            MintSetting::GoLive { date: 1 },
            MintSetting::GoLive { date: 2 },
        ];
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("go_live"));
    }

    #[test]
    fn test_settings_parse_from_tagged_json() {
        let json = format!(
            r#"[
                {{"mode": "go_live", "date": "2022-01-01T00:00:00Z"}},
                {{"mode": "hidden", "name": "Mystery", "uri": "https://x/1.json", "hash": "{}"}}
            ]"#,
            "00".repeat(32)
        );
        let settings: Vec<MintSetting> = serde_json::from_str(&json).unwrap();
        assert_eq!(settings[0], MintSetting::GoLive { date: 1_640_995_200 });
        assert!(matches!(settings[1], MintSetting::Hidden { .. }));
    }

    #[test]
    fn test_whitelist_setting_round_trips_through_json() {
        let mint = Address::new([5u8; 32]);
        let json = format!(
            r#"{{"mode": "whitelist", "burn_mode": "never_burn", "mint": "{}", "presale": true, "discount_price": 5}}"#,
            mint
        );
        let setting: MintSetting = serde_json::from_str(&json).unwrap();
        assert_eq!(
            setting,
            MintSetting::Whitelist {
                mode: WhitelistMode::NeverBurn,
                mint,
                presale: true,
                discount_price: Some(5),
            }
        );

        let value = serde_json::to_value(&setting).unwrap();
        assert_eq!(value["mode"], "whitelist");
        assert_eq!(value["burn_mode"], "never_burn");
        let back: MintSetting = serde_json::from_value(value).unwrap();
        assert_eq!(back, setting);
    }

    #[test]
    fn test_from_manifest_uses_first_item() {
        let addr = Address::new([4u8; 32]);
        let manifest = vec![ManifestItem {
            index: 0,
            name: "One".to_string(),
            uri: "https://x/0.json".to_string(),
            symbol: "ONE".to_string(),
            seller_fee_basis_points: 250,
            creators: vec![ManifestCreator {
                address: Some(addr.to_string()),
                share: 100,
            }],
        }];
        let collection = CollectionSettings {
            price: 5,
            treasury: Address::new([1u8; 32]),
            token_mint: None,
            is_mutable: true,
            retain_authority: true,
            max_supply: 0,
            items_available: None,
            settings: Vec::new(),
        };
        let cfg = RegistryConfig::from_manifest(&manifest, &collection).unwrap();
        assert_eq!(cfg.items_available, 1);
        assert_eq!(cfg.symbol, "ONE");
        assert_eq!(cfg.creators[0].address, addr);
    }

    #[test]
    fn test_from_manifest_requires_creator_address() {
        let manifest = vec![ManifestItem {
            index: 0,
            name: "One".to_string(),
            uri: "https://x/0.json".to_string(),
            symbol: "ONE".to_string(),
            seller_fee_basis_points: 250,
            creators: vec![ManifestCreator {
                address: None,
                share: 100,
            }],
        }];
        let collection: CollectionSettings = serde_json::from_str(&format!(
            r#"{{"price": 1, "treasury": "{}"}}"#,
            Address::new([1u8; 32])
        ))
        .unwrap();
        let err = RegistryConfig::from_manifest(&manifest, &collection).unwrap_err();
        assert!(err.to_string().contains("creator address is missing"));
    }
}
