use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use dao_dashboard_cache::ViewConfig;
use dao_dashboard_sync::{ClientConfig, RpcClient};
use dao_dashboard_types::ChainId;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const API_URL_ENV: &str = "DASHBOARD_API_URL";
pub const IPFS_GATEWAY_ENV: &str = "DASHBOARD_IPFS_GATEWAY";

/// Dashboard settings: defaults, then the config file, then environment,
/// then command line flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub api_url: String,
    pub timeout_seconds: u64,
    pub max_retry_seconds: u64,
    pub ipfs_gateway: String,
    /// How often the log watcher polls each chain
    pub poll_interval_seconds: u64,
    /// JSON-RPC endpoint per chain id
    pub rpc_urls: BTreeMap<u64, String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let client = ClientConfig::default();
        let rpc_urls = [
            (ChainId::ETHEREUM, "https://cloudflare-eth.com"),
            (ChainId::OPTIMISM, "https://mainnet.optimism.io"),
            (ChainId::BASE, "https://mainnet.base.org"),
            (ChainId::ZORA, "https://rpc.zora.energy"),
        ]
        .into_iter()
        .map(|(chain, url)| (chain.0, url.to_string()))
        .collect();

        Self {
            api_url: client.api_url,
            timeout_seconds: client.timeout_seconds,
            max_retry_seconds: client.max_retry_seconds,
            ipfs_gateway: ViewConfig::default().ipfs_gateway,
            poll_interval_seconds: 12,
            rpc_urls,
        }
    }
}

impl DashboardConfig {
    /// Defaults, overlaid with `path` when given, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_url = url;
        }
        if let Some(gateway) = lookup(IPFS_GATEWAY_ENV).filter(|v| !v.trim().is_empty()) {
            self.ipfs_gateway = gateway;
        }
    }

    pub fn apply_overrides(&mut self, api_url: Option<String>, rpc: &[RpcOverride]) {
        if let Some(url) = api_url {
            self.api_url = url;
        }
        for o in rpc {
            self.rpc_urls.insert(o.chain_id.0, o.url.clone());
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            api_url: self.api_url.clone(),
            timeout_seconds: self.timeout_seconds,
            max_retry_seconds: self.max_retry_seconds,
        }
    }

    pub fn view_config(&self) -> ViewConfig {
        ViewConfig {
            ipfs_gateway: self.ipfs_gateway.clone(),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds.max(1))
    }

    /// One JSON-RPC client per configured chain
    pub fn rpc_clients(&self) -> Result<Vec<(ChainId, Arc<RpcClient>)>> {
        let timeout = Duration::from_secs(self.timeout_seconds);
        self.rpc_urls
            .iter()
            .map(|(chain, url)| {
                let client = RpcClient::with_timeout(url.clone(), timeout)
                    .with_context(|| format!("Failed to create RPC client for chain {}", chain))?;
                Ok((ChainId(*chain), Arc::new(client)))
            })
            .collect()
    }
}

/// `--rpc CHAIN=URL`; the chain is a numeric id or a known chain name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcOverride {
    pub chain_id: ChainId,
    pub url: String,
}

impl FromStr for RpcOverride {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (chain, url) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected CHAIN=URL, got '{}'", s))?;

        let chain_id = chain_by_name(chain)
            .or_else(|| chain.parse::<ChainId>().ok())
            .ok_or_else(|| anyhow!("Unknown chain '{}'", chain))?;

        let url = url.trim();
        if url.is_empty() {
            return Err(anyhow!("Missing RPC URL for chain {}", chain));
        }

        Ok(Self {
            chain_id,
            url: url.to_string(),
        })
    }
}

fn chain_by_name(name: &str) -> Option<ChainId> {
    let name = name.trim().to_lowercase().replace(['-', '_'], " ");
    [
        ChainId::ETHEREUM,
        ChainId::OPTIMISM,
        ChainId::BASE,
        ChainId::ZORA,
        ChainId::SEPOLIA,
        ChainId::OPTIMISM_SEPOLIA,
        ChainId::BASE_SEPOLIA,
        ChainId::ZORA_SEPOLIA,
    ]
    .into_iter()
    .find(|chain| chain.name().map(str::to_lowercase).as_deref() == Some(name.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("dao-dashboard-config-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{ "api_url": "https://api.example", "rpc_urls": { "8453": "https://base.example" } }"#,
        )
        .unwrap();

        let config = DashboardConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.api_url, "https://api.example");
        assert_eq!(config.timeout_seconds, 30);
        assert_eq!(config.rpc_urls.len(), 1);
        assert_eq!(config.rpc_urls[&8453], "https://base.example");
    }

    #[test]
    fn test_environment_then_flags() {
        let env: HashMap<&str, &str> = HashMap::from([
            (API_URL_ENV, "https://env.example"),
            (IPFS_GATEWAY_ENV, "https://gateway.example"),
        ]);

        let mut config = DashboardConfig::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.api_url, "https://env.example");
        assert_eq!(config.view_config().ipfs_gateway, "https://gateway.example");

        let rpc = vec!["base=http://localhost:8545".parse::<RpcOverride>().unwrap()];
        config.apply_overrides(Some("https://flag.example".to_string()), &rpc);
        assert_eq!(config.client_config().api_url, "https://flag.example");
        assert_eq!(config.rpc_urls[&ChainId::BASE.0], "http://localhost:8545");
    }

    #[test]
    fn test_rpc_override_parsing() {
        let named: RpcOverride = "Base-Sepolia=https://sepolia.base.org".parse().unwrap();
        assert_eq!(named.chain_id, ChainId::BASE_SEPOLIA);

        let numeric: RpcOverride = "7777777=https://rpc.zora.energy".parse().unwrap();
        assert_eq!(numeric.chain_id, ChainId::ZORA);

        assert!("base".parse::<RpcOverride>().is_err());
        assert!("mars=https://rpc".parse::<RpcOverride>().is_err());
        assert!("base=".parse::<RpcOverride>().is_err());
    }
}
