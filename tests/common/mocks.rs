//! In-memory ledger and wallet used by the pipeline tests.
//!
//! `MockLedger` executes submitted transactions against real registry byte
//! buffers (via `layout::write_header` / `write_record`), so verification reads
//! exactly what the upload wrote. Faults are one-shot and keyed by the first
//! item index of an `AddConfigLines` transaction, or by initialization.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use mint_registry::pipeline::instructions::{RegistryInstruction, SystemInstruction, SYSTEM_PROGRAM_ID};
use mint_registry::pipeline::layout::{
    decode_header, decode_record, write_header, write_record, DecodedRecord, RegistryHeader,
};
use mint_registry::transport::{KeypairWallet, NetworkClient, SignatureStatus, Wallet};
use mint_registry::types::{Address, ReferencePoint, Transaction, TxSignature};
use parking_lot::Mutex;

/// Where a fault applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKey {
    Init,
    /// `AddConfigLines` starting at this item index.
    Lines(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Submission is refused; nothing lands.
    RejectSubmit,
    /// Submission is accepted but the transaction never lands.
    DropSilently,
    /// The transaction lands but confirmation reports nothing in time.
    LandUnconfirmed,
    /// The transaction lands and `confirm` never returns.
    HangConfirm,
}

#[derive(Default)]
struct LedgerState {
    accounts: HashMap<Address, Vec<u8>>,
    written: HashMap<Address, BTreeSet<u32>>,
    statuses: HashMap<TxSignature, SignatureStatus>,
    /// Transactions that landed and are not yet reported by `confirm`.
    hidden: HashSet<TxSignature>,
    /// Transactions whose `confirm` never completes.
    hanging: HashSet<TxSignature>,
    faults: HashMap<FaultKey, Fault>,
    submitted: Vec<Transaction>,
    line_submissions: Vec<(u32, usize)>,
    calls: usize,
    blockhash: u64,
    in_flight: usize,
    peak_in_flight: usize,
}

#[derive(Default)]
pub struct MockLedger {
    state: Mutex<LedgerState>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inject(&self, key: FaultKey, fault: Fault) {
        self.state.lock().faults.insert(key, fault);
    }

    /// Every `NetworkClient` call made so far.
    pub fn network_calls(&self) -> usize {
        self.state.lock().calls
    }

    /// Most `confirm` calls that were awaiting at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.state.lock().peak_in_flight
    }

    pub fn submitted_count(&self) -> usize {
        self.state.lock().submitted.len()
    }

    /// `(start_index, line_count)` of every submitted `AddConfigLines`, in order.
    pub fn line_submissions(&self) -> Vec<(u32, usize)> {
        self.state.lock().line_submissions.clone()
    }

    pub fn header(&self, registry: &Address) -> Option<RegistryHeader> {
        let state = self.state.lock();
        state
            .accounts
            .get(registry)
            .and_then(|buf| decode_header(buf).ok())
    }

    pub fn record(&self, registry: &Address, index: u32) -> Option<DecodedRecord> {
        let state = self.state.lock();
        state
            .accounts
            .get(registry)
            .and_then(|buf| decode_record(buf, index).ok())
    }

    /// Overwrite the stored line count, simulating a lagging or partial registry.
    pub fn set_line_count(&self, registry: &Address, line_count: u32) {
        let mut state = self.state.lock();
        let buf = state.accounts.get_mut(registry).expect("registry exists");
        let header = decode_header(buf).expect("header");
        write_header(
            buf,
            RegistryHeader {
                capacity: header.capacity,
                line_count,
            },
        )
        .expect("write header");
    }

    /// Replace a stored record, simulating a write the ledger did not keep.
    pub fn overwrite_record(&self, registry: &Address, index: u32, name: &str, uri: &str) {
        let mut state = self.state.lock();
        let buf = state.accounts.get_mut(registry).expect("registry exists");
        write_record(buf, index, name, uri).expect("write record");
    }

    pub fn remove_account(&self, registry: &Address) {
        self.state.lock().accounts.remove(registry);
    }

    fn fault_key(transaction: &Transaction) -> Option<FaultKey> {
        transaction.message.instructions.iter().find_map(|ix| {
            if ix.program_id == SYSTEM_PROGRAM_ID {
                return None;
            }
            match RegistryInstruction::decode(&ix.data).ok()? {
                RegistryInstruction::Initialize(_) => Some(FaultKey::Init),
                RegistryInstruction::AddConfigLines { start_index, .. } => {
                    Some(FaultKey::Lines(start_index))
                }
            }
        })
    }

    fn execute(state: &mut LedgerState, transaction: &Transaction) -> Result<()> {
        // Stage against copies so a failing transaction leaves no trace.
        let mut accounts = state.accounts.clone();
        let mut written = state.written.clone();

        for ix in &transaction.message.instructions {
            if ix.program_id == SYSTEM_PROGRAM_ID {
                let SystemInstruction::CreateAccount { space, .. } = SystemInstruction::decode(&ix.data)?;
                let target = ix
                    .accounts
                    .get(1)
                    .ok_or_else(|| anyhow!("create account without target"))?
                    .address;
                if accounts.contains_key(&target) {
                    bail!("account {} already exists", target);
                }
                accounts.insert(target, vec![0u8; space as usize]);
                continue;
            }

            let registry = ix
                .accounts
                .first()
                .ok_or_else(|| anyhow!("registry instruction without accounts"))?
                .address;
            let buf = accounts
                .get_mut(&registry)
                .ok_or_else(|| anyhow!("registry {} does not exist", registry))?;
            match RegistryInstruction::decode(&ix.data)? {
                RegistryInstruction::Initialize(args) => {
                    write_header(
                        buf,
                        RegistryHeader {
                            capacity: args.items_available,
                            line_count: 0,
                        },
                    )?;
                }
                RegistryInstruction::AddConfigLines { start_index, lines } => {
                    let header = decode_header(buf)?;
                    let end = u64::from(start_index) + lines.len() as u64;
                    if end > header.capacity {
                        bail!("index {} exceeds capacity {}", end, header.capacity);
                    }
                    let set = written.entry(registry).or_default();
                    for (offset, line) in lines.iter().enumerate() {
                        let index = start_index + offset as u32;
                        write_record(buf, index, &line.name, &line.uri)?;
                        set.insert(index);
                    }
                    write_header(
                        buf,
                        RegistryHeader {
                            capacity: header.capacity,
                            line_count: set.len() as u32,
                        },
                    )?;
                }
            }
        }

        state.accounts = accounts;
        state.written = written;
        Ok(())
    }
}

#[async_trait]
impl NetworkClient for MockLedger {
    async fn reference_point(&self) -> Result<ReferencePoint> {
        let mut state = self.state.lock();
        state.calls += 1;
        state.blockhash += 1;
        Ok(ReferencePoint {
            blockhash: format!("blockhash-{}", state.blockhash),
            last_valid_height: 1_000 + state.blockhash,
        })
    }

    async fn submit(&self, transaction: &Transaction) -> Result<TxSignature> {
        let mut state = self.state.lock();
        state.calls += 1;
        if !transaction.is_fully_signed() {
            bail!("transaction is missing signatures");
        }
        let signature = transaction
            .signature()
            .cloned()
            .ok_or_else(|| anyhow!("transaction has no fee payer signature"))?;

        let key = Self::fault_key(transaction);
        let fault = key.and_then(|key| state.faults.remove(&key));
        if fault == Some(Fault::RejectSubmit) {
            bail!("node is behind");
        }

        state.submitted.push(transaction.clone());
        for ix in transaction
            .message
            .instructions
            .iter()
            .filter(|ix| ix.program_id != SYSTEM_PROGRAM_ID)
        {
            if let Ok(RegistryInstruction::AddConfigLines { start_index, lines }) =
                RegistryInstruction::decode(&ix.data)
            {
                state.line_submissions.push((start_index, lines.len()));
            }
        }
        if fault == Some(Fault::DropSilently) {
            return Ok(signature);
        }

        let status = match Self::execute(&mut state, transaction) {
            Ok(()) => SignatureStatus::Confirmed,
            Err(e) => SignatureStatus::Failed(e.to_string()),
        };
        state.statuses.insert(signature.clone(), status);
        match fault {
            Some(Fault::LandUnconfirmed) => {
                state.hidden.insert(signature.clone());
            }
            Some(Fault::HangConfirm) => {
                state.hanging.insert(signature.clone());
            }
            _ => {}
        }
        Ok(signature)
    }

    async fn confirm(&self, signature: &TxSignature, _timeout: Duration) -> Result<bool> {
        let hang = {
            let mut state = self.state.lock();
            state.calls += 1;
            let hang = state.hanging.contains(signature);
            if !hang {
                state.in_flight += 1;
                state.peak_in_flight = state.peak_in_flight.max(state.in_flight);
            }
            hang
        };
        if hang {
            std::future::pending::<()>().await;
        }

        // Hold the call open long enough for sibling confirmations to overlap.
        tokio::time::sleep(Duration::from_millis(10)).await;

        let mut state = self.state.lock();
        state.in_flight -= 1;
        if state.hidden.contains(signature) {
            return Ok(false);
        }
        match state.statuses.get(signature) {
            Some(SignatureStatus::Confirmed) => Ok(true),
            Some(SignatureStatus::Failed(reason)) => bail!("transaction failed: {}", reason),
            None => Ok(false),
        }
    }

    async fn account_bytes(&self, address: &Address) -> Result<Option<Vec<u8>>> {
        let mut state = self.state.lock();
        state.calls += 1;
        Ok(state.accounts.get(address).cloned())
    }

    async fn lookup_by_signature(&self, signature: &TxSignature) -> Result<Option<SignatureStatus>> {
        let mut state = self.state.lock();
        state.calls += 1;
        Ok(state.statuses.get(signature).cloned())
    }

    async fn rent_exempt_balance(&self, space: usize) -> Result<u64> {
        let mut state = self.state.lock();
        state.calls += 1;
        Ok(space as u64 * 7)
    }
}

/// Keypair wallet that counts `sign_all` requests and can refuse one.
pub struct MockWallet {
    inner: KeypairWallet,
    calls: AtomicUsize,
    reject_call: Mutex<Option<usize>>,
}

impl MockWallet {
    pub fn new() -> Self {
        Self {
            inner: KeypairWallet::from_bytes(&[7u8; 32]).expect("seed"),
            calls: AtomicUsize::new(0),
            reject_call: Mutex::new(None),
        }
    }

    /// Refuse the `n`th `sign_all` request (counting from 1).
    pub fn reject_call(&self, n: usize) {
        *self.reject_call.lock() = Some(n);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Wallet for MockWallet {
    fn address(&self) -> Address {
        self.inner.address()
    }

    async fn sign_all(&self, transactions: Vec<Transaction>) -> Result<Vec<Transaction>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if *self.reject_call.lock() == Some(call) {
            bail!("user rejected the request");
        }
        self.inner.sign_all(transactions).await
    }
}
