use mint_registry_types::env_utils::{env_string, RPC_URL_ENV};

const MAINNET_RPC: &str = "https://api.mainnet-beta.solana.com";
const DEVNET_RPC: &str = "https://api.devnet.solana.com";
const TESTNET_RPC: &str = "https://api.testnet.solana.com";

pub fn infer_cluster_from_url(url: &str) -> Option<&'static str> {
    let lower = url.to_lowercase();
    if lower.contains("devnet") {
        Some("devnet")
    } else if lower.contains("testnet") {
        Some("testnet")
    } else if lower.contains("mainnet") {
        Some("mainnet-beta")
    } else {
        None
    }
}

pub fn default_rpc_endpoint(cluster: &str) -> String {
    match cluster {
        "devnet" => DEVNET_RPC.to_string(),
        "testnet" => TESTNET_RPC.to_string(),
        _ => MAINNET_RPC.to_string(),
    }
}

/// Pick the RPC endpoint: explicit URL, then `MINT_RPC_URL`, then the cluster default.
pub fn resolve_rpc_endpoint(cluster: &str, custom_url: Option<&str>) -> String {
    if let Some(url) = custom_url.map(str::trim).filter(|url| !url.is_empty()) {
        return url.to_string();
    }
    if let Some(url) = env_string(RPC_URL_ENV) {
        return url;
    }
    default_rpc_endpoint(cluster)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_cluster() {
        assert_eq!(infer_cluster_from_url(DEVNET_RPC), Some("devnet"));
        assert_eq!(infer_cluster_from_url(MAINNET_RPC), Some("mainnet-beta"));
        assert_eq!(infer_cluster_from_url("http://127.0.0.1:8899"), None);
    }

    #[test]
    fn test_custom_url_wins() {
        assert_eq!(
            resolve_rpc_endpoint("devnet", Some("http://localhost:8899")),
            "http://localhost:8899"
        );
        assert_eq!(default_rpc_endpoint("testnet"), TESTNET_RPC);
        assert_eq!(default_rpc_endpoint("anything-else"), MAINNET_RPC);
    }
}
