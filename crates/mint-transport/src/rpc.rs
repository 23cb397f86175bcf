//! JSON-RPC client for the ledger network.
//!
//! Requests are blocking `ureq` calls; the async [`NetworkClient`] methods move
//! each one onto tokio's blocking pool.
//!
//! Timeouts are read from `MINT_RPC_TIMEOUT_SECS` (default 30) and
//! `MINT_RPC_CONNECT_TIMEOUT_SECS` (default 10).

use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use mint_registry_types::encoding::{base64_decode, base64_encode};
use mint_registry_types::env_utils::{
    env_bool, env_duration_secs_or, RPC_CONNECT_TIMEOUT_ENV, RPC_TIMEOUT_ENV, SKIP_PREFLIGHT_ENV,
};
use mint_registry_types::{Address, ReferencePoint, Transaction, TxSignature};
use serde_json::{json, Value};
use tracing::debug;

use crate::{NetworkClient, SignatureStatus};

/// Poll interval while waiting for a signature to confirm.
const CONFIRM_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Clone)]
pub struct RpcClient {
    endpoint: String,
    agent: ureq::Agent,
    commitment: String,
}

impl RpcClient {
    /// Default request timeout in seconds (can be overridden by env).
    const DEFAULT_TIMEOUT_SECS: u64 = 30;
    /// Default connect timeout in seconds (can be overridden by env).
    const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

    pub fn new(endpoint: &str) -> Self {
        let timeout = env_duration_secs_or(RPC_TIMEOUT_ENV, Self::DEFAULT_TIMEOUT_SECS);
        let connect = env_duration_secs_or(
            RPC_CONNECT_TIMEOUT_ENV,
            Self::DEFAULT_CONNECT_TIMEOUT_SECS,
        );
        Self::with_timeouts(endpoint, timeout, connect)
    }

    pub fn with_timeouts(endpoint: &str, timeout: Duration, connect_timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            agent: ureq::AgentBuilder::new()
                .timeout(timeout)
                .timeout_connect(connect_timeout)
                .build(),
            commitment: "confirmed".to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Execute one JSON-RPC call and return its `result`.
    fn call(&self, method: &str, params: Value) -> Result<Value> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response: Value = self
            .agent
            .post(&self.endpoint)
            .set("Content-Type", "application/json")
            .send_json(&body)
            .map_err(|e| anyhow!("RPC request {} failed: {}", method, e))?
            .into_json()
            .map_err(|e| anyhow!("Failed to parse {} response: {}", method, e))?;

        if let Some(error) = response.get("error").filter(|e| !e.is_null()) {
            let msg = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown error");
            return Err(anyhow!("RPC error from {}: {}", method, msg));
        }

        response
            .get("result")
            .cloned()
            .ok_or_else(|| anyhow!("No result in {} response", method))
    }

    async fn call_async(&self, method: &'static str, params: Value) -> Result<Value> {
        let client = self.clone();
        tokio::task::spawn_blocking(move || client.call(method, params))
            .await
            .map_err(|e| anyhow!("RPC task for {} panicked: {}", method, e))?
    }

    /// `Some(true)` once the signature reached our commitment, `Some(false)`
    /// if it landed with an error, `None` while still unknown.
    async fn signature_confirmed(&self, signature: &TxSignature) -> Result<Option<bool>> {
        let result = self
            .call_async(
                "getSignatureStatuses",
                json!([[signature.to_string()], {"searchTransactionHistory": false}]),
            )
            .await?;
        let status = result
            .get("value")
            .and_then(|v| v.get(0))
            .filter(|s| !s.is_null());
        let Some(status) = status else {
            return Ok(None);
        };
        if status.get("err").map(|e| !e.is_null()).unwrap_or(false) {
            return Ok(Some(false));
        }
        let level = status
            .get("confirmationStatus")
            .and_then(|c| c.as_str())
            .unwrap_or("processed");
        Ok(matches!(level, "confirmed" | "finalized").then_some(true))
    }
}

#[async_trait]
impl NetworkClient for RpcClient {
    async fn reference_point(&self) -> Result<ReferencePoint> {
        let result = self
            .call_async(
                "getLatestBlockhash",
                json!([{"commitment": self.commitment}]),
            )
            .await?;
        let value = result
            .get("value")
            .ok_or_else(|| anyhow!("getLatestBlockhash returned no value"))?;
        let blockhash = value
            .get("blockhash")
            .and_then(|b| b.as_str())
            .ok_or_else(|| anyhow!("getLatestBlockhash returned no blockhash"))?;
        Ok(ReferencePoint {
            blockhash: blockhash.to_string(),
            last_valid_height: value
                .get("lastValidBlockHeight")
                .and_then(|h| h.as_u64())
                .unwrap_or(0),
        })
    }

    async fn submit(&self, transaction: &Transaction) -> Result<TxSignature> {
        let expected = transaction
            .signature()
            .cloned()
            .ok_or_else(|| anyhow!("transaction is not signed by its fee payer"))?;
        let wire = base64_encode(&transaction.to_wire_bytes()?);
        let result = self
            .call_async(
                "sendTransaction",
                json!([wire, {
                    "encoding": "base64",
                    "skipPreflight": env_bool(SKIP_PREFLIGHT_ENV),
                    "preflightCommitment": self.commitment,
                }]),
            )
            .await?;
        let returned = result
            .as_str()
            .ok_or_else(|| anyhow!("sendTransaction returned no signature"))?
            .parse::<TxSignature>()?;
        if returned != expected {
            debug!(expected = %expected, returned = %returned, "node returned a different signature");
        }
        Ok(returned)
    }

    async fn confirm(&self, signature: &TxSignature, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.signature_confirmed(signature).await? {
                Some(true) => return Ok(true),
                Some(false) => return Err(anyhow!("transaction {} failed on chain", signature)),
                None => {}
            }
            if Instant::now() >= deadline {
                debug!(signature = %signature, "confirmation timed out");
                return Ok(false);
            }
            tokio::time::sleep(CONFIRM_POLL_INTERVAL).await;
        }
    }

    async fn account_bytes(&self, address: &Address) -> Result<Option<Vec<u8>>> {
        let result = self
            .call_async(
                "getAccountInfo",
                json!([address.to_string(), {"encoding": "base64", "commitment": self.commitment}]),
            )
            .await?;
        let value = match result.get("value") {
            Some(v) if !v.is_null() => v,
            _ => return Ok(None),
        };
        let data = value
            .get("data")
            .and_then(|d| d.get(0))
            .and_then(|d| d.as_str())
            .ok_or_else(|| anyhow!("account {} has no base64 data", address))?;
        base64_decode(data, "account data").map(Some)
    }

    async fn lookup_by_signature(&self, signature: &TxSignature) -> Result<Option<SignatureStatus>> {
        let result = self
            .call_async(
                "getTransaction",
                json!([signature.to_string(), {
                    "encoding": "json",
                    "commitment": self.commitment,
                    "maxSupportedTransactionVersion": 0,
                }]),
            )
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        let err = result.get("meta").and_then(|m| m.get("err"));
        Ok(Some(match err {
            Some(e) if !e.is_null() => SignatureStatus::Failed(e.to_string()),
            _ => SignatureStatus::Confirmed,
        }))
    }

    async fn rent_exempt_balance(&self, space: usize) -> Result<u64> {
        let result = self
            .call_async("getMinimumBalanceForRentExemption", json!([space]))
            .await?;
        result
            .as_u64()
            .ok_or_else(|| anyhow!("getMinimumBalanceForRentExemption returned {}", result))
    }
}
