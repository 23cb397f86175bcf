//! Wire transaction types.
//!
//! A [`Transaction`] is a [`Message`] plus the ed25519 signatures over the
//! message's `bcs` encoding. The fee payer's signature doubles as the
//! transaction id once submitted.

use anyhow::{anyhow, Result};
use ed25519_dalek::{Signer, SigningKey};
use serde::{Deserialize, Serialize};

use crate::address::{Address, TxSignature};

/// Short-lived freshness token a transaction must carry to be accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferencePoint {
    /// Recent block hash (base58).
    pub blockhash: String,
    /// Last block height at which the hash is still accepted.
    pub last_valid_height: u64,
}

/// Account referenced by an instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMeta {
    pub address: Address,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    pub fn writable(address: Address, is_signer: bool) -> Self {
        Self {
            address,
            is_signer,
            is_writable: true,
        }
    }

    pub fn readonly(address: Address, is_signer: bool) -> Self {
        Self {
            address,
            is_signer,
            is_writable: false,
        }
    }
}

/// A single program invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub program_id: Address,
    pub accounts: Vec<AccountMeta>,
    /// Program-specific payload (bcs encoded).
    pub data: Vec<u8>,
}

/// The signed part of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub fee_payer: Address,
    pub reference_point: String,
    pub instructions: Vec<Instruction>,
}

impl Message {
    pub fn new(fee_payer: Address, reference: &ReferencePoint, instructions: Vec<Instruction>) -> Self {
        Self {
            fee_payer,
            reference_point: reference.blockhash.clone(),
            instructions,
        }
    }

    /// Bytes covered by every signature.
    pub fn signing_bytes(&self) -> Result<Vec<u8>> {
        bcs::to_bytes(self).map_err(|e| anyhow!("Failed to encode message: {}", e))
    }

    /// Addresses that must sign, fee payer first.
    pub fn required_signers(&self) -> Vec<Address> {
        let mut signers = vec![self.fee_payer];
        for meta in self.instructions.iter().flat_map(|ix| ix.accounts.iter()) {
            if meta.is_signer && !signers.contains(&meta.address) {
                signers.push(meta.address);
            }
        }
        signers
    }
}

/// Signature of one signer over the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureEntry {
    pub signer: Address,
    pub signature: TxSignature,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub message: Message,
    pub signatures: Vec<SignatureEntry>,
}

impl Transaction {
    pub fn new_unsigned(message: Message) -> Self {
        Self {
            message,
            signatures: Vec::new(),
        }
    }

    /// Add (or replace) the signature of `key`'s address.
    pub fn partial_sign(&mut self, key: &SigningKey) -> Result<()> {
        let signer = Address::new(key.verifying_key().to_bytes());
        if !self.message.required_signers().contains(&signer) {
            return Err(anyhow!("{} is not a required signer of this transaction", signer));
        }
        let bytes = self.message.signing_bytes()?;
        let signature = TxSignature::from_bytes(&key.sign(&bytes).to_bytes())?;
        self.signatures.retain(|entry| entry.signer != signer);
        self.signatures.push(SignatureEntry { signer, signature });
        Ok(())
    }

    pub fn is_signed_by(&self, signer: &Address) -> bool {
        self.signatures.iter().any(|entry| &entry.signer == signer)
    }

    pub fn is_fully_signed(&self) -> bool {
        self.message
            .required_signers()
            .iter()
            .all(|signer| self.is_signed_by(signer))
    }

    /// Transaction id: the fee payer's signature, if present.
    pub fn signature(&self) -> Option<&TxSignature> {
        self.signatures
            .iter()
            .find(|entry| entry.signer == self.message.fee_payer)
            .map(|entry| &entry.signature)
    }

    /// `bcs` encoding submitted to the network.
    pub fn to_wire_bytes(&self) -> Result<Vec<u8>> {
        bcs::to_bytes(self).map_err(|e| anyhow!("Failed to encode transaction: {}", e))
    }

    pub fn from_wire_bytes(bytes: &[u8]) -> Result<Self> {
        bcs::from_bytes(bytes).map_err(|e| anyhow!("Failed to decode transaction: {}", e))
    }
}
