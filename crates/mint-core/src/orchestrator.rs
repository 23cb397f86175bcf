//! Upload Orchestrator: writes item records into an initialized registry.
//!
//! Batches run strictly in sequence. Within a batch every transaction is
//! signed in one wallet request, then submitted and confirmed concurrently.
//! Only confirmed groups are merged into the cache, once the whole batch has
//! resolved, so an interrupted run always leaves a resumable cache.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use mint_cache::{CacheReconciler, ItemUpdate};
use mint_registry_types::{Address, Message, ReferencePoint, Transaction};
use mint_transport::{NetworkClient, Wallet};
use tracing::{debug, info, warn};

use crate::error::{PipelineError, TransactionFailure};
use crate::instructions::{add_config_lines, ConfigLine};
use crate::planner::{BatchPlan, ConfirmationBatch, TransactionGroup};
use crate::submission::{submit_and_settle, Outcome};

#[derive(Debug, Clone, Default)]
pub struct UploadReport {
    /// `true` when no transaction failed during the run.
    pub successful: bool,
    pub batches_processed: usize,
    pub batches_skipped: usize,
    pub transactions_submitted: usize,
    pub transactions_confirmed: usize,
    pub failures: Vec<TransactionFailure>,
}

/// A group whose transaction was built and awaits signing.
struct StagedGroup<'a> {
    group: &'a TransactionGroup,
    transaction: Transaction,
}

pub struct UploadOrchestrator {
    program_id: Address,
    registry: Address,
    confirm_timeout: Duration,
}

impl UploadOrchestrator {
    pub fn new(program_id: Address, registry: Address, confirm_timeout: Duration) -> Self {
        Self {
            program_id,
            registry,
            confirm_timeout,
        }
    }

    pub async fn upload(
        &self,
        plan: &BatchPlan,
        reconciler: &mut CacheReconciler,
        wallet: &dyn Wallet,
        network: &dyn NetworkClient,
    ) -> Result<UploadReport, PipelineError> {
        let mut report = UploadReport::default();

        for batch in &plan.batches {
            if batch.is_complete(reconciler.state()) {
                debug!(batch = batch.ordinal, "batch already on chain, skipping");
                report.batches_skipped += 1;
                continue;
            }
            self.upload_batch(batch, reconciler, wallet, network, &mut report)
                .await?;
            report.batches_processed += 1;
        }

        report.successful = report.failures.is_empty();
        info!(
            processed = report.batches_processed,
            skipped = report.batches_skipped,
            submitted = report.transactions_submitted,
            confirmed = report.transactions_confirmed,
            failures = report.failures.len(),
            "upload finished"
        );
        Ok(report)
    }

    async fn upload_batch(
        &self,
        batch: &ConfirmationBatch,
        reconciler: &mut CacheReconciler,
        wallet: &dyn Wallet,
        network: &dyn NetworkClient,
        report: &mut UploadReport,
    ) -> Result<(), PipelineError> {
        let reference = network
            .reference_point()
            .await
            .map_err(PipelineError::Network)?;
        let authority = wallet.address();

        let mut staged = Vec::new();
        for group in &batch.groups {
            let pending = group
                .indices
                .iter()
                .any(|index| !reconciler.is_complete(*index));
            if !pending {
                continue;
            }
            match self.build_group(group, reconciler, authority, &reference) {
                Ok(transaction) => staged.push(StagedGroup { group, transaction }),
                Err(e) => {
                    warn!(batch = batch.ordinal, first = group.first(), error = %e, "failed to build transaction");
                    report.failures.push(TransactionFailure::BuildFailed {
                        first: group.first(),
                        last: group.last(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        if staged.is_empty() {
            return Ok(());
        }

        info!(
            batch = batch.ordinal,
            transactions = staged.len(),
            "signing batch"
        );
        let unsigned: Vec<Transaction> = staged.iter().map(|s| s.transaction.clone()).collect();
        let signed = wallet
            .sign_all(unsigned)
            .await
            .map_err(|source| PipelineError::SigningFailed {
                batch: batch.ordinal,
                source,
            })?;
        if signed.len() != staged.len() {
            return Err(PipelineError::SigningFailed {
                batch: batch.ordinal,
                source: anyhow::anyhow!(
                    "wallet returned {} transactions for {} requested",
                    signed.len(),
                    staged.len()
                ),
            });
        }

        let concurrency = signed.len();
        report.transactions_submitted += concurrency;
        let confirm_timeout = self.confirm_timeout;
        let settled: Vec<_> = stream::iter(staged.iter().zip(signed.iter()))
            .map(|(stage, transaction)| async move {
                let settled = submit_and_settle(network, transaction, confirm_timeout).await;
                (stage.group, settled)
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        let mut updates = Vec::new();
        for (group, settled) in settled {
            match settled.outcome {
                Outcome::Confirmed => {
                    report.transactions_confirmed += 1;
                    updates.extend(group.indices.iter().copied().map(ItemUpdate::uploaded));
                }
                Outcome::Rejected(reason) => {
                    warn!(first = group.first(), last = group.last(), reason = %reason, "transaction failed");
                    report.failures.push(TransactionFailure::SubmissionFailed {
                        first: group.first(),
                        last: group.last(),
                        signature: settled.signature,
                        reason,
                    });
                }
                Outcome::TimedOut => match settled.signature {
                    Some(signature) => {
                        warn!(first = group.first(), signature = %signature, "transaction not confirmed in time");
                        report.failures.push(TransactionFailure::ConfirmationTimeout {
                            first: group.first(),
                            last: group.last(),
                            signature,
                        });
                    }
                    None => report.failures.push(TransactionFailure::SubmissionFailed {
                        first: group.first(),
                        last: group.last(),
                        signature: None,
                        reason: "no signature to confirm".to_string(),
                    }),
                },
            }
        }

        let merged = updates.len();
        reconciler.merge(updates).map_err(PipelineError::Cache)?;
        info!(
            batch = batch.ordinal,
            items_confirmed = merged,
            "batch resolved"
        );
        Ok(())
    }

    fn build_group(
        &self,
        group: &TransactionGroup,
        reconciler: &CacheReconciler,
        authority: Address,
        reference: &ReferencePoint,
    ) -> anyhow::Result<Transaction> {
        let lines = group
            .indices
            .iter()
            .map(|index| {
                let record = reconciler
                    .state()
                    .item(*index)
                    .ok_or_else(|| anyhow::anyhow!("item {} has no cache record", index))?;
                Ok(ConfigLine {
                    name: record.name.clone(),
                    uri: record.link.clone(),
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        let instruction =
            add_config_lines(self.program_id, self.registry, authority, group.first(), lines)?;
        Ok(Transaction::new_unsigned(Message::new(
            authority,
            reference,
            vec![instruction],
        )))
    }
}
