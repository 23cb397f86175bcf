//! Registry initialization.
//!
//! Creates the registry account and writes its collection configuration in a
//! single transaction. The registry key is generated here and co-signs; the
//! wallet pays and signs as authority.

use std::time::Duration;

use anyhow::anyhow;
use ed25519_dalek::SigningKey;
use mint_registry_types::{Address, Message, RegistryConfig, Transaction, TxSignature};
use mint_transport::{NetworkClient, Wallet};
use rand::rngs::OsRng;
use tracing::{info, warn};

use crate::error::PipelineError;
use crate::instructions::{create_account, initialize_registry};
use crate::layout::registry_account_size;
use crate::submission::{submit_and_settle, Outcome};

/// Length of the collection id derived from the registry address.
pub const COLLECTION_ID_LENGTH: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitializedRegistry {
    pub address: Address,
    pub collection_id: String,
    pub signature: TxSignature,
}

/// First [`COLLECTION_ID_LENGTH`] characters of the base58 address.
pub fn collection_id(address: &Address) -> String {
    address
        .to_base58()
        .chars()
        .take(COLLECTION_ID_LENGTH)
        .collect()
}

/// Reject a config the registry program would refuse. Runs before any network call.
pub fn check_config(config: &RegistryConfig) -> Result<(), PipelineError> {
    config.validate().map_err(PipelineError::invalid_config)?;
    if config.items_available == 0 {
        return Err(PipelineError::EmptyManifest);
    }
    if registry_account_size(config.items_available).is_none() {
        return Err(PipelineError::InvalidConfig(format!(
            "items_available {} is too large for a registry account",
            config.items_available
        )));
    }
    Ok(())
}

pub struct RegistryInitializer {
    program_id: Address,
    confirm_timeout: Duration,
}

impl RegistryInitializer {
    pub fn new(program_id: Address, confirm_timeout: Duration) -> Self {
        Self {
            program_id,
            confirm_timeout,
        }
    }

    /// Create and configure a new registry owned by the wallet.
    ///
    /// Not idempotent: every call creates a new account. Callers check the
    /// cache for an existing registry first.
    pub async fn initialize(
        &self,
        config: &RegistryConfig,
        wallet: &dyn Wallet,
        network: &dyn NetworkClient,
    ) -> Result<InitializedRegistry, PipelineError> {
        check_config(config)?;

        let registry_key = SigningKey::generate(&mut OsRng);
        let address = Address::new(registry_key.verifying_key().to_bytes());
        let collection_id = collection_id(&address);
        let authority = wallet.address();

        let space = registry_account_size(config.items_available).ok_or_else(|| {
            PipelineError::InvalidConfig(format!(
                "items_available {} is too large for a registry account",
                config.items_available
            ))
        })?;
        let lamports = network
            .rent_exempt_balance(space)
            .await
            .map_err(PipelineError::Network)?;
        let reference = network
            .reference_point()
            .await
            .map_err(PipelineError::Network)?;

        let build = || -> anyhow::Result<Transaction> {
            let instructions = vec![
                create_account(authority, address, lamports, space, self.program_id)?,
                initialize_registry(self.program_id, address, authority, config, &collection_id)?,
            ];
            let mut transaction =
                Transaction::new_unsigned(Message::new(authority, &reference, instructions));
            transaction.partial_sign(&registry_key)?;
            Ok(transaction)
        };
        let unsigned = build().map_err(|source| PipelineError::InitializationFailed {
            signature: None,
            source,
        })?;

        let mut signed = wallet
            .sign_all(vec![unsigned])
            .await
            .map_err(|source| PipelineError::InitializationFailed {
                signature: None,
                source,
            })?;
        let transaction = signed
            .pop()
            .ok_or_else(|| PipelineError::InitializationFailed {
                signature: None,
                source: anyhow!("wallet returned no signed transaction"),
            })?;

        info!(
            registry = %address,
            collection_id = %collection_id,
            items_available = config.items_available,
            space,
            "initializing registry"
        );

        let settled = submit_and_settle(network, &transaction, self.confirm_timeout).await;
        match (settled.outcome, settled.signature) {
            (Outcome::Confirmed, Some(signature)) => {
                info!(registry = %address, signature = %signature, "registry initialized");
                Ok(InitializedRegistry {
                    address,
                    collection_id,
                    signature,
                })
            }
            (Outcome::Confirmed, None) => Err(PipelineError::InitializationFailed {
                signature: None,
                source: anyhow!("confirmed transaction has no signature"),
            }),
            (Outcome::Rejected(reason), signature) => {
                warn!(registry = %address, reason = %reason, "registry initialization rejected");
                Err(PipelineError::InitializationFailed {
                    signature,
                    source: anyhow!("Failed to initialize registry {}: {}", address, reason),
                })
            }
            (Outcome::TimedOut, signature) => {
                warn!(registry = %address, "registry initialization not confirmed in time");
                Err(PipelineError::InitializationFailed {
                    signature,
                    source: anyhow!(
                        "Failed to confirm registry {} within {:?}",
                        address,
                        self.confirm_timeout
                    ),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mint_registry_types::Creator;

    fn config(shares: &[u8]) -> RegistryConfig {
        RegistryConfig {
            items_available: 10,
            symbol: "ART".to_string(),
            seller_fee_basis_points: 250,
            is_mutable: true,
            retain_authority: true,
            max_supply: 0,
            price: 1,
            treasury: Address::new([1u8; 32]),
            token_mint: None,
            creators: shares
                .iter()
                .enumerate()
                .map(|(i, share)| Creator {
                    address: Address::new([i as u8 + 10; 32]),
                    share: *share,
                    verified: true,
                })
                .collect(),
            settings: Vec::new(),
        }
    }

    #[test]
    fn test_collection_id_is_address_prefix() {
        let address = Address::new([7u8; 32]);
        let id = collection_id(&address);
        assert_eq!(id.len(), COLLECTION_ID_LENGTH);
        assert!(address.to_base58().starts_with(&id));
    }

    #[test]
    fn test_check_config() {
        assert!(check_config(&config(&[60, 40])).is_ok());
        assert!(matches!(
            check_config(&config(&[60, 30])),
            Err(PipelineError::InvalidConfig(_))
        ));
        assert!(matches!(
            check_config(&config(&[])),
            Err(PipelineError::InvalidConfig(_))
        ));

        let mut empty = config(&[100]);
        empty.items_available = 0;
        assert!(matches!(
            check_config(&empty),
            Err(PipelineError::EmptyManifest)
        ));
    }

    #[test]
    fn test_oversized_registry_rejected() {
        let mut huge = config(&[100]);
        huge.items_available = u64::MAX / 2;
        match check_config(&huge) {
            Err(PipelineError::InvalidConfig(msg)) => assert!(msg.contains("too large")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
