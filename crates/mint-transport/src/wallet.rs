//! Local keypair wallet.
//!
//! Keypair files are JSON byte arrays: 64 bytes (secret followed by public
//! key) or a bare 32-byte secret.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use ed25519_dalek::SigningKey;
use mint_registry_types::{Address, Transaction};
use tracing::debug;

use crate::Wallet;

/// Default keypair location (`~/.config/solana/id.json`).
pub fn default_keypair_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("solana").join("id.json"))
}

pub struct KeypairWallet {
    key: SigningKey,
    address: Address,
}

impl KeypairWallet {
    pub fn from_signing_key(key: SigningKey) -> Self {
        let address = Address::new(key.verifying_key().to_bytes());
        Self { key, address }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read keypair {}: {}", path.display(), e))?;
        let bytes: Vec<u8> = serde_json::from_str(&json)
            .map_err(|e| anyhow!("Failed to parse keypair {}: {}", path.display(), e))?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let secret: [u8; 32] = match bytes.len() {
            32 | 64 => bytes[..32]
                .try_into()
                .map_err(|_| anyhow!("keypair secret must be 32 bytes"))?,
            n => bail!("keypair must be 32 or 64 bytes, got {}", n),
        };
        let wallet = Self::from_signing_key(SigningKey::from_bytes(&secret));
        if bytes.len() == 64 && bytes[32..] != wallet.address.as_bytes()[..] {
            bail!("keypair public key does not match its secret");
        }
        Ok(wallet)
    }
}

#[async_trait]
impl Wallet for KeypairWallet {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign_all(&self, transactions: Vec<Transaction>) -> Result<Vec<Transaction>> {
        // Validate the whole set first so a rejection never leaves a partial result.
        if let Some(foreign) = transactions
            .iter()
            .find(|tx| tx.message.fee_payer != self.address)
        {
            bail!(
                "refusing to sign: fee payer {} is not wallet {}",
                foreign.message.fee_payer,
                self.address
            );
        }
        let mut signed = Vec::with_capacity(transactions.len());
        for mut tx in transactions {
            tx.partial_sign(&self.key)?;
            signed.push(tx);
        }
        debug!(count = signed.len(), "signed transactions");
        Ok(signed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mint_registry_types::{Message, ReferencePoint};
    use rand::rngs::OsRng;
    use tempfile::TempDir;

    fn reference() -> ReferencePoint {
        ReferencePoint {
            blockhash: "11111111111111111111111111111111".to_string(),
            last_valid_height: 1,
        }
    }

    #[test]
    fn test_load_64_byte_keypair_file() {
        let key = SigningKey::generate(&mut OsRng);
        let mut bytes = key.to_bytes().to_vec();
        bytes.extend_from_slice(&key.verifying_key().to_bytes());

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("id.json");
        std::fs::write(&path, serde_json::to_string(&bytes).unwrap()).unwrap();

        let wallet = KeypairWallet::from_file(&path).unwrap();
        assert_eq!(wallet.address(), Address::new(key.verifying_key().to_bytes()));
    }

    #[test]
    fn test_mismatched_public_half_rejected() {
        let key = SigningKey::generate(&mut OsRng);
        let mut bytes = key.to_bytes().to_vec();
        bytes.extend_from_slice(&[0u8; 32]);
        assert!(KeypairWallet::from_bytes(&bytes).is_err());
        assert!(KeypairWallet::from_bytes(&[1u8; 10]).is_err());
    }

    #[tokio::test]
    async fn test_sign_all_is_atomic() {
        let wallet = KeypairWallet::from_signing_key(SigningKey::generate(&mut OsRng));
        let other = Address::new([5u8; 32]);
        let mine = Transaction::new_unsigned(Message::new(wallet.address(), &reference(), vec![]));
        let foreign = Transaction::new_unsigned(Message::new(other, &reference(), vec![]));

        assert!(wallet.sign_all(vec![mine.clone(), foreign]).await.is_err());

        let signed = wallet.sign_all(vec![mine]).await.unwrap();
        assert!(signed[0].is_fully_signed());
    }
}
