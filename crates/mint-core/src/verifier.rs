//! Registry Verifier: compares what the ledger stored against the cache.
//!
//! The registry account is read once. Each item not yet verified is decoded
//! from its fixed-width record and compared by name and URI. Mismatches are
//! not fatal: writes may not be visible yet, so verification is re-runnable.
//! The count checks that follow are fatal.

use mint_cache::{CacheReconciler, ItemUpdate};
use mint_registry_types::Address;
use mint_transport::NetworkClient;
use tracing::{debug, info, warn};

use crate::error::{DecodeError, PipelineError};
use crate::layout::{decode_header, decode_record, DecodedRecord, RegistryHeader};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifyOptions {
    /// Send mismatched items back to upload (`onChain = false`).
    pub requeue_mismatches: bool,
}

/// What was found for an item that did not match the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MismatchKind {
    Differs { stored: DecodedRecord },
    Undecodable(DecodeError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationMismatch {
    pub index: u32,
    pub expected_name: String,
    pub expected_uri: String,
    pub kind: MismatchKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    pub all_matched: bool,
    pub mismatches: Vec<VerificationMismatch>,
    /// Items newly verified in this pass.
    pub verified: usize,
    /// Items skipped because an earlier pass verified them.
    pub already_verified: usize,
    pub requeued: usize,
    pub header: RegistryHeader,
}

impl VerificationReport {
    pub fn mismatched_indices(&self) -> Vec<u32> {
        self.mismatches.iter().map(|m| m.index).collect()
    }
}

/// Compare the stored line count and capacity against the declared size.
pub fn check_counts(header: &RegistryHeader, declared_items_available: u64) -> Result<(), PipelineError> {
    if declared_items_available > header.capacity {
        return Err(PipelineError::OverCapacity {
            requested: declared_items_available,
            capacity: header.capacity,
        });
    }
    if u64::from(header.line_count) < declared_items_available {
        return Err(PipelineError::UnderReported {
            stored: header.line_count,
            expected: declared_items_available,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Verifier {
    options: VerifyOptions,
}

impl Verifier {
    pub fn new(options: VerifyOptions) -> Self {
        Self { options }
    }

    /// Verify every item, then run the count checks.
    pub async fn verify(
        &self,
        registry: Address,
        declared_items_available: u64,
        reconciler: &mut CacheReconciler,
        network: &dyn NetworkClient,
    ) -> Result<VerificationReport, PipelineError> {
        let report = self.verify_items(registry, reconciler, network).await?;
        check_counts(&report.header, declared_items_available)?;
        Ok(report)
    }

    /// Per-item comparison only. Staged results are merged before returning.
    pub async fn verify_items(
        &self,
        registry: Address,
        reconciler: &mut CacheReconciler,
        network: &dyn NetworkClient,
    ) -> Result<VerificationReport, PipelineError> {
        let buf = network
            .account_bytes(&registry)
            .await
            .map_err(PipelineError::Network)?
            .ok_or(PipelineError::RegistryNotFound(registry))?;
        let header = decode_header(&buf)?;
        debug!(
            registry = %registry,
            bytes = buf.len(),
            capacity = header.capacity,
            line_count = header.line_count,
            "read registry account"
        );

        let mut updates = Vec::new();
        let mut mismatches = Vec::new();
        let mut already_verified = 0;
        for (index, item) in &reconciler.state().items {
            if item.verify_run {
                already_verified += 1;
                continue;
            }
            let kind = match decode_record(&buf, *index) {
                Ok(stored) if stored.name == item.name && stored.uri == item.link => {
                    updates.push(ItemUpdate::verified(*index));
                    continue;
                }
                Ok(stored) => MismatchKind::Differs { stored },
                Err(e) => MismatchKind::Undecodable(e),
            };
            debug!(index = *index, kind = ?kind, "item does not match registry");
            mismatches.push(VerificationMismatch {
                index: *index,
                expected_name: item.name.clone(),
                expected_uri: item.link.clone(),
                kind,
            });
        }

        let verified = updates.len();
        let mut requeued = 0;
        if self.options.requeue_mismatches {
            requeued = mismatches.len();
            updates.extend(mismatches.iter().map(|m| ItemUpdate::requeue(m.index)));
        }
        reconciler.merge(updates).map_err(PipelineError::Cache)?;

        if mismatches.is_empty() {
            info!(registry = %registry, verified, already_verified, "all items match the registry");
        } else {
            warn!(
                registry = %registry,
                verified,
                mismatches = mismatches.len(),
                requeued,
                "registry does not match the cache"
            );
        }

        Ok(VerificationReport {
            all_matched: mismatches.is_empty(),
            mismatches,
            verified,
            already_verified,
            requeued,
            header,
        })
    }
}
