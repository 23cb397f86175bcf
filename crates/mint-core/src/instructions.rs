//! Instruction builders for the registry program.
//!
//! Instruction data is the `bcs` encoding of [`RegistryInstruction`] (or
//! [`SystemInstruction`] for account creation). The optional mint settings,
//! modelled client-side as [`MintSetting`] variants, travel as the program's
//! fixed set of optional fields.

use anyhow::{anyhow, bail, Result};
use mint_registry_types::{
    AccountMeta, Address, Creator, EndSettingKind, Instruction, MintSetting, RegistryConfig,
    WhitelistMode, MAX_NAME_LENGTH, MAX_URI_LENGTH,
};
use serde::{Deserialize, Serialize};

/// Registry program deployed on the public clusters.
pub const DEFAULT_PROGRAM_ID: &str = "cndy3Z4yapfJBmL3ShUp5exZKqR3z33thTzeNMm2gRZ";

/// The system program owns account creation.
pub const SYSTEM_PROGRAM_ID: Address = Address::new([0u8; 32]);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigLine {
    pub name: String,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndSettingsArgs {
    pub kind: EndSettingKind,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatekeeperArgs {
    pub network: Address,
    pub expire_on_use: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistArgs {
    pub mode: WhitelistMode,
    pub mint: Address,
    pub presale: bool,
    pub discount_price: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiddenArgs {
    pub name: String,
    pub uri: String,
    pub hash: [u8; 32],
}

/// Payload of the `Initialize` instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeArgs {
    pub uuid: String,
    pub price: u64,
    pub items_available: u64,
    pub symbol: String,
    pub seller_fee_basis_points: u16,
    pub max_supply: u64,
    pub is_mutable: bool,
    pub retain_authority: bool,
    pub creators: Vec<Creator>,
    pub go_live_date: Option<i64>,
    pub end_settings: Option<EndSettingsArgs>,
    pub gatekeeper: Option<GatekeeperArgs>,
    pub whitelist: Option<WhitelistArgs>,
    pub hidden_settings: Option<HiddenArgs>,
}

impl InitializeArgs {
    pub fn from_config(config: &RegistryConfig, uuid: &str) -> Self {
        let mut args = Self {
            uuid: uuid.to_string(),
            price: config.price,
            items_available: config.items_available,
            symbol: config.symbol.clone(),
            seller_fee_basis_points: config.seller_fee_basis_points,
            max_supply: config.max_supply,
            is_mutable: config.is_mutable,
            retain_authority: config.retain_authority,
            creators: config.creators.clone(),
            go_live_date: None,
            end_settings: None,
            gatekeeper: None,
            whitelist: None,
            hidden_settings: None,
        };
        for setting in &config.settings {
            match setting.clone() {
                MintSetting::GoLive { date } => args.go_live_date = Some(date),
                MintSetting::EndSettings { kind, value } => {
                    args.end_settings = Some(EndSettingsArgs { kind, value })
                }
                MintSetting::Gatekeeper {
                    network,
                    expire_on_use,
                } => {
                    args.gatekeeper = Some(GatekeeperArgs {
                        network,
                        expire_on_use,
                    })
                }
                MintSetting::Whitelist {
                    mode,
                    mint,
                    presale,
                    discount_price,
                } => {
                    args.whitelist = Some(WhitelistArgs {
                        mode,
                        mint,
                        presale,
                        discount_price,
                    })
                }
                MintSetting::Hidden { name, uri, hash } => {
                    args.hidden_settings = Some(HiddenArgs { name, uri, hash })
                }
            }
        }
        args
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryInstruction {
    Initialize(InitializeArgs),
    AddConfigLines { start_index: u32, lines: Vec<ConfigLine> },
}

impl RegistryInstruction {
    pub fn decode(data: &[u8]) -> Result<Self> {
        bcs::from_bytes(data).map_err(|e| anyhow!("Failed to decode registry instruction: {}", e))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemInstruction {
    CreateAccount {
        lamports: u64,
        space: u64,
        owner: Address,
    },
}

impl SystemInstruction {
    pub fn decode(data: &[u8]) -> Result<Self> {
        bcs::from_bytes(data).map_err(|e| anyhow!("Failed to decode system instruction: {}", e))
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    bcs::to_bytes(value).map_err(|e| anyhow!("Failed to encode instruction: {}", e))
}

pub fn create_account(
    payer: Address,
    new_account: Address,
    lamports: u64,
    space: usize,
    owner: Address,
) -> Result<Instruction> {
    Ok(Instruction {
        program_id: SYSTEM_PROGRAM_ID,
        accounts: vec![
            AccountMeta::writable(payer, true),
            AccountMeta::writable(new_account, true),
        ],
        data: encode(&SystemInstruction::CreateAccount {
            lamports,
            space: space as u64,
            owner,
        })?,
    })
}

pub fn initialize_registry(
    program_id: Address,
    registry: Address,
    authority: Address,
    config: &RegistryConfig,
    uuid: &str,
) -> Result<Instruction> {
    let mut accounts = vec![
        AccountMeta::writable(registry, false),
        AccountMeta::readonly(config.treasury, false),
        AccountMeta::readonly(authority, false),
        AccountMeta::writable(authority, true),
        AccountMeta::readonly(SYSTEM_PROGRAM_ID, false),
    ];
    if let Some(mint) = config.token_mint {
        accounts.push(AccountMeta::readonly(mint, false));
    }
    Ok(Instruction {
        program_id,
        accounts,
        data: encode(&RegistryInstruction::Initialize(InitializeArgs::from_config(
            config, uuid,
        )))?,
    })
}

/// Write `lines` into consecutive records starting at `start_index`.
pub fn add_config_lines(
    program_id: Address,
    registry: Address,
    authority: Address,
    start_index: u32,
    lines: Vec<ConfigLine>,
) -> Result<Instruction> {
    if lines.is_empty() {
        bail!("no config lines to add");
    }
    for (offset, line) in lines.iter().enumerate() {
        let index = start_index as usize + offset;
        if line.name.len() > MAX_NAME_LENGTH {
            bail!("item {} name exceeds {} bytes", index, MAX_NAME_LENGTH);
        }
        if line.uri.len() > MAX_URI_LENGTH {
            bail!("item {} uri exceeds {} bytes", index, MAX_URI_LENGTH);
        }
    }
    Ok(Instruction {
        program_id,
        accounts: vec![
            AccountMeta::writable(registry, false),
            AccountMeta::readonly(authority, true),
        ],
        data: encode(&RegistryInstruction::AddConfigLines { start_index, lines })?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RegistryConfig {
        RegistryConfig {
            items_available: 3,
            symbol: "ART".to_string(),
            seller_fee_basis_points: 500,
            is_mutable: true,
            retain_authority: true,
            max_supply: 0,
            price: 10,
            treasury: Address::new([1u8; 32]),
            token_mint: Some(Address::new([8u8; 32])),
            creators: vec![Creator {
                address: Address::new([2u8; 32]),
                share: 100,
                verified: true,
            }],
            settings: vec![
                MintSetting::GoLive { date: 42 },
                MintSetting::Hidden {
                    name: "Mystery".to_string(),
                    uri: "https://x/h.json".to_string(),
                    hash: [7u8; 32],
                },
            ],
        }
    }

    #[test]
    fn test_initialize_carries_settings_as_optional_fields() {
        let ix = initialize_registry(
            Address::new([9u8; 32]),
            Address::new([3u8; 32]),
            Address::new([4u8; 32]),
            &config(),
            "AbCdEf",
        )
        .unwrap();
        assert_eq!(ix.accounts.len(), 6);

        let RegistryInstruction::Initialize(args) = RegistryInstruction::decode(&ix.data).unwrap()
        else {
            panic!("expected initialize");
        };
        assert_eq!(args.uuid, "AbCdEf");
        assert_eq!(args.go_live_date, Some(42));
        assert!(args.hidden_settings.is_some());
        assert!(args.gatekeeper.is_none());
    }

    #[test]
    fn test_add_config_lines_rejects_overlong_name() {
        let lines = vec![ConfigLine {
            name: "n".repeat(MAX_NAME_LENGTH + 1),
            uri: "u".to_string(),
        }];
        let err = add_config_lines(
            Address::new([9u8; 32]),
            Address::new([3u8; 32]),
            Address::new([4u8; 32]),
            10,
            lines,
        )
        .unwrap_err();
        assert!(err.to_string().contains("item 10 name"));
    }

    #[test]
    fn test_create_account_decodes() {
        let ix = create_account(
            Address::new([4u8; 32]),
            Address::new([3u8; 32]),
            500,
            1024,
            Address::new([9u8; 32]),
        )
        .unwrap();
        assert_eq!(ix.program_id, SYSTEM_PROGRAM_ID);
        assert_eq!(
            SystemInstruction::decode(&ix.data).unwrap(),
            SystemInstruction::CreateAccount {
                lamports: 500,
                space: 1024,
                owner: Address::new([9u8; 32]),
            }
        );
    }
}
