//! Output formatting for mint-registry CLI
//!
//! Human-readable text on stdout, or one pretty-printed JSON document with `--json`.

use mint_registry::cache::CacheState;
use mint_registry::pipeline::verifier::MismatchKind;
use mint_registry::pipeline::{TransactionFailure, UploadOutcome, VerifyOutcome};
use serde_json::{json, Value};

pub fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("failed to render JSON output: {}", e),
    }
}

fn failure_json(failure: &TransactionFailure) -> Value {
    let (first, last) = failure.item_range();
    let signature = match failure {
        TransactionFailure::SubmissionFailed { signature, .. } => {
            signature.as_ref().map(|s| s.to_string())
        }
        TransactionFailure::ConfirmationTimeout { signature, .. } => Some(signature.to_string()),
        TransactionFailure::BuildFailed { .. } => None,
    };
    json!({
        "first": first,
        "last": last,
        "signature": signature,
        "error": failure.to_string(),
    })
}

pub fn cache_summary_json(cache: &CacheState) -> Value {
    json!({
        "registry": cache.registry().map(|r| r.to_string()),
        "collection_id": cache.program.uuid,
        "items": cache.len(),
        "on_chain": cache.on_chain_count(),
        "verified": cache.verified_count(),
        "pending": cache.pending_indices(),
    })
}

pub fn upload_json(outcome: &UploadOutcome) -> Value {
    json!({
        "success": outcome.successful,
        "initialized": outcome.initialized.as_ref().map(|i| json!({
            "registry": i.address.to_string(),
            "collection_id": i.collection_id,
            "signature": i.signature.to_string(),
        })),
        "report": outcome.report.as_ref().map(|r| json!({
            "batches_processed": r.batches_processed,
            "batches_skipped": r.batches_skipped,
            "transactions_submitted": r.transactions_submitted,
            "transactions_confirmed": r.transactions_confirmed,
            "failures": r.failures.iter().map(failure_json).collect::<Vec<_>>(),
        })),
        "error": outcome.error.as_ref().map(|e| e.to_string()),
        "cache": cache_summary_json(&outcome.cache),
    })
}

pub fn format_upload(outcome: &UploadOutcome) -> String {
    let mut out = String::new();
    if let Some(init) = &outcome.initialized {
        out.push_str(&format!(
            "Registry created: \x1b[36m{}\x1b[0m (collection {})\n",
            init.address, init.collection_id
        ));
    }
    if let Some(report) = &outcome.report {
        out.push_str(&format!(
            "Batches: {} processed, {} skipped\nTransactions: {} submitted, {} confirmed\n",
            report.batches_processed,
            report.batches_skipped,
            report.transactions_submitted,
            report.transactions_confirmed
        ));
        for failure in &report.failures {
            out.push_str(&format!("  \x1b[33m{}\x1b[0m\n", failure));
        }
    }
    out.push_str(&format!(
        "Items on chain: {}/{}\n",
        outcome.cache.on_chain_count(),
        outcome.cache.len()
    ));
    match (&outcome.error, outcome.successful) {
        (Some(e), _) => out.push_str(&format!("\x1b[31m✗ Upload stopped: {}\x1b[0m\n", e)),
        (None, true) => out.push_str("\x1b[32m✓ Upload complete\x1b[0m\n"),
        (None, false) => {
            out.push_str("\x1b[33m! Upload incomplete; re-run to retry failed items\x1b[0m\n")
        }
    }
    out
}

pub fn verify_json(outcome: &VerifyOutcome) -> Value {
    json!({
        "success": outcome.ok(),
        "report": outcome.report.as_ref().map(|r| json!({
            "all_matched": r.all_matched,
            "verified": r.verified,
            "already_verified": r.already_verified,
            "requeued": r.requeued,
            "mismatches": r.mismatched_indices(),
            "capacity": r.header.capacity,
            "line_count": r.header.line_count,
        })),
        "error": outcome.error.as_ref().map(|e| e.to_string()),
        "cache": cache_summary_json(&outcome.cache),
    })
}

pub fn format_verify(outcome: &VerifyOutcome) -> String {
    let mut out = String::new();
    if let Some(report) = &outcome.report {
        out.push_str(&format!(
            "Registry stores {} lines (capacity {})\nVerified: {} new, {} earlier\n",
            report.header.line_count,
            report.header.capacity,
            report.verified,
            report.already_verified
        ));
        for mismatch in &report.mismatches {
            let found = match &mismatch.kind {
                MismatchKind::Differs { stored } => format!("'{}' {}", stored.name, stored.uri),
                MismatchKind::Undecodable(e) => e.to_string(),
            };
            out.push_str(&format!(
                "  \x1b[33mitem {}: expected '{}' {}, found {}\x1b[0m\n",
                mismatch.index, mismatch.expected_name, mismatch.expected_uri, found
            ));
        }
    }
    match &outcome.error {
        Some(e) => out.push_str(&format!("\x1b[31m✗ Verification failed: {}\x1b[0m\n", e)),
        None if outcome.ok() => out.push_str("\x1b[32m✓ Registry matches the cache\x1b[0m\n"),
        None => out.push_str("\x1b[33m! Some items do not match yet; re-run verify later\x1b[0m\n"),
    }
    out
}

pub fn format_cache(cache: &CacheState) -> String {
    let mut out = String::new();
    match cache.registry() {
        Some(registry) => out.push_str(&format!(
            "Registry: \x1b[36m{}\x1b[0m ({})\n",
            registry,
            cache.program.uuid.as_deref().unwrap_or("-")
        )),
        None => out.push_str("Registry: not initialized\n"),
    }
    out.push_str(&format!(
        "Items: {} total, {} on chain, {} verified\n",
        cache.len(),
        cache.on_chain_count(),
        cache.verified_count()
    ));
    let pending = cache.pending_indices();
    if !pending.is_empty() {
        let shown: Vec<String> = pending.iter().take(20).map(u32::to_string).collect();
        let more = if pending.len() > shown.len() { ", ..." } else { "" };
        out.push_str(&format!("Pending: {}{}\n", shown.join(", "), more));
    }
    out
}
