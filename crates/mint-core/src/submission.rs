//! Submit one signed transaction and settle its outcome.
//!
//! A transaction is settled when confirmation succeeds, or when a lookup by
//! its signature after a submission error or confirmation timeout tells us
//! what happened on the ledger.

use std::time::Duration;

use mint_registry_types::{Transaction, TxSignature};
use mint_transport::{NetworkClient, SignatureStatus};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Outcome {
    Confirmed,
    /// Submission was refused or the transaction failed on the ledger.
    Rejected(String),
    /// Neither confirmation nor lookup produced an answer in time.
    TimedOut,
}

#[derive(Debug, Clone)]
pub(crate) struct Settled {
    pub signature: Option<TxSignature>,
    pub outcome: Outcome,
}

pub(crate) async fn submit_and_settle(
    network: &dyn NetworkClient,
    transaction: &Transaction,
    confirm_timeout: Duration,
) -> Settled {
    let Some(signature) = transaction.signature().cloned() else {
        return Settled {
            signature: None,
            outcome: Outcome::Rejected("transaction is missing the fee payer signature".into()),
        };
    };

    let inconclusive = match network.submit(transaction).await {
        Ok(submitted) => {
            if submitted != signature {
                debug!(expected = %signature, returned = %submitted, "network returned a different id");
            }
            match tokio::time::timeout(confirm_timeout, network.confirm(&signature, confirm_timeout))
                .await
            {
                Ok(Ok(true)) => {
                    return Settled {
                        signature: Some(signature),
                        outcome: Outcome::Confirmed,
                    }
                }
                Ok(Ok(false)) | Err(_) => None,
                Ok(Err(e)) => Some(e.to_string()),
            }
        }
        Err(e) => Some(e.to_string()),
    };

    let outcome = reconcile(network, &signature, inconclusive).await;
    Settled {
        signature: Some(signature),
        outcome,
    }
}

/// Decide an inconclusive transaction by looking it up.
async fn reconcile(
    network: &dyn NetworkClient,
    signature: &TxSignature,
    error: Option<String>,
) -> Outcome {
    debug!(signature = %signature, error = ?error, "reconciling by signature lookup");
    match network.lookup_by_signature(signature).await {
        Ok(Some(SignatureStatus::Confirmed)) => Outcome::Confirmed,
        Ok(Some(SignatureStatus::Failed(reason))) => Outcome::Rejected(reason),
        Ok(None) => error.map(Outcome::Rejected).unwrap_or(Outcome::TimedOut),
        Err(e) => {
            warn!(signature = %signature, error = %e, "signature lookup failed");
            error.map(Outcome::Rejected).unwrap_or(Outcome::TimedOut)
        }
    }
}
