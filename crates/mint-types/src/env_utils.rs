//! Environment variable helpers used for runtime configuration.
//!
//! Every tunable the CLI and the RPC client read from the environment goes
//! through these functions, so unset and unparsable values fall back to the
//! same defaults everywhere.
//!
//! ```
//! use mint_registry_types::env_utils::{env_duration_secs_or, CONFIRM_TIMEOUT_ENV};
//!
//! let timeout = env_duration_secs_or(CONFIRM_TIMEOUT_ENV, 60);
//! assert!(timeout.as_secs() > 0);
//! ```

use std::str::FromStr;
use std::time::Duration;

/// RPC endpoint override.
pub const RPC_URL_ENV: &str = "MINT_RPC_URL";
/// Keypair file used to sign transactions.
pub const KEYPAIR_ENV: &str = "MINT_KEYPAIR";
/// Seconds to wait for a transaction confirmation.
pub const CONFIRM_TIMEOUT_ENV: &str = "MINT_CONFIRM_TIMEOUT_SECS";
/// Seconds before a single RPC request gives up.
pub const RPC_TIMEOUT_ENV: &str = "MINT_RPC_TIMEOUT_SECS";
/// Seconds before an RPC connection attempt gives up.
pub const RPC_CONNECT_TIMEOUT_ENV: &str = "MINT_RPC_CONNECT_TIMEOUT_SECS";
/// Submit without the node's preflight simulation.
pub const SKIP_PREFLIGHT_ENV: &str = "MINT_SKIP_PREFLIGHT";

/// Parse an environment variable; `None` when unset or unparsable.
pub fn env_var<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Parse an environment variable with a default value.
pub fn env_var_or<T: FromStr>(key: &str, default: T) -> T {
    env_var(key).unwrap_or(default)
}

/// Non-empty string value of an environment variable.
pub fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `true` for "1", "true", "yes" or "on" (case-insensitive).
pub fn env_bool(key: &str) -> bool {
    std::env::var(key)
        .ok()
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

/// A whole number of seconds read from the environment. Zero is treated as unset.
pub fn env_duration_secs_or(key: &str, default_secs: u64) -> Duration {
    let secs = env_var::<u64>(key)
        .filter(|secs| *secs > 0)
        .unwrap_or(default_secs);
    Duration::from_secs(secs)
}
