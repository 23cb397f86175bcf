//! Batch planning for the item upload.
//!
//! Items are split into confirmation batches, and each batch into transaction
//! groups of consecutive indices. A batch is signed with one wallet request;
//! a group becomes one `AddConfigLines` transaction.

use mint_cache::CacheState;

use crate::error::PipelineError;

/// Items per confirmation batch.
pub const DEFAULT_CONFIRMATION_BATCH_SIZE: usize = 500;
/// Items per transaction.
pub const DEFAULT_TRANSACTION_SIZE: usize = 5;

/// Consecutive item indices written by one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionGroup {
    pub indices: Vec<u32>,
}

impl TransactionGroup {
    pub fn first(&self) -> u32 {
        self.indices.first().copied().unwrap_or_default()
    }

    pub fn last(&self) -> u32 {
        self.indices.last().copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationBatch {
    /// Position of the batch in the plan, from zero.
    pub ordinal: usize,
    pub groups: Vec<TransactionGroup>,
}

impl ConfirmationBatch {
    pub fn indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.groups.iter().flat_map(|group| group.indices.iter().copied())
    }

    pub fn item_count(&self) -> usize {
        self.groups.iter().map(TransactionGroup::len).sum()
    }

    /// `true` when every item of the batch is already on chain.
    pub fn is_complete(&self, cache: &CacheState) -> bool {
        self.indices()
            .all(|index| cache.item(index).map(|item| item.on_chain).unwrap_or(false))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchPlan {
    pub batches: Vec<ConfirmationBatch>,
}

impl BatchPlan {
    pub fn item_count(&self) -> usize {
        self.batches.iter().map(ConfirmationBatch::item_count).sum()
    }

    /// Batches that still contain at least one item not confirmed on chain.
    pub fn pending<'a>(&'a self, cache: &'a CacheState) -> impl Iterator<Item = &'a ConfirmationBatch> {
        self.batches.iter().filter(move |batch| !batch.is_complete(cache))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPlanner {
    confirmation_batch_size: usize,
    transaction_size: usize,
}

impl Default for BatchPlanner {
    fn default() -> Self {
        Self {
            confirmation_batch_size: DEFAULT_CONFIRMATION_BATCH_SIZE,
            transaction_size: DEFAULT_TRANSACTION_SIZE,
        }
    }
}

impl BatchPlanner {
    pub fn new(confirmation_batch_size: usize, transaction_size: usize) -> Result<Self, PipelineError> {
        if confirmation_batch_size == 0 {
            return Err(PipelineError::invalid_config(
                "confirmation batch size must be positive",
            ));
        }
        if transaction_size == 0 {
            return Err(PipelineError::invalid_config(
                "transaction size must be positive",
            ));
        }
        Ok(Self {
            confirmation_batch_size,
            transaction_size,
        })
    }

    pub fn confirmation_batch_size(&self) -> usize {
        self.confirmation_batch_size
    }

    pub fn transaction_size(&self) -> usize {
        self.transaction_size
    }

    /// Partition indices `0..total` in order. Every index lands in exactly one group.
    pub fn plan(&self, total: u32) -> BatchPlan {
        let indices: Vec<u32> = (0..total).collect();
        let batches = indices
            .chunks(self.confirmation_batch_size)
            .enumerate()
            .map(|(ordinal, batch)| ConfirmationBatch {
                ordinal,
                groups: batch
                    .chunks(self.transaction_size)
                    .map(|group| TransactionGroup {
                        indices: group.to_vec(),
                    })
                    .collect(),
            })
            .collect();
        BatchPlan { batches }
    }
}
