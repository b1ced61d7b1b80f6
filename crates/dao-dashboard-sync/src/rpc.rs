use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dao_dashboard_types::Address;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{map_reqwest_error, SyncError, SyncResult};

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// An entry returned by `eth_getLogs`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub address: String,
    pub topics: Vec<String>,
    #[serde(default)]
    pub data: String,
    pub block_number: Option<String>,
    pub transaction_hash: Option<String>,
    pub log_index: Option<String>,
}

impl Log {
    pub fn block(&self) -> Option<u64> {
        self.block_number.as_deref().and_then(|b| parse_quantity(b).ok())
    }
}

/// Minimal JSON-RPC client for an Ethereum-compatible node
pub struct RpcClient {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), url)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Network(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self::with_client(client, url))
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> SyncResult<T> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        debug!("JSON-RPC {} -> {}", method, self.url);

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SyncError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: RpcResponse<T> = response.json().await.map_err(map_reqwest_error)?;
        if let Some(error) = body.error {
            return Err(SyncError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        body.result
            .ok_or_else(|| SyncError::InvalidResponse(format!("{} returned no result", method)))
    }

    /// `eth_call` against the latest block, returning the raw hex result
    pub async fn eth_call(&self, to: &Address, data: &str) -> SyncResult<String> {
        self.call("eth_call", json!([{ "to": to, "data": data }, "latest"]))
            .await
    }

    pub async fn block_number(&self) -> SyncResult<u64> {
        let raw: String = self.call("eth_blockNumber", json!([])).await?;
        parse_quantity(&raw)
    }

    /// Logs emitted by `address` with `topic0` in the inclusive block range
    pub async fn get_logs(
        &self,
        address: &Address,
        topic0: &str,
        from_block: u64,
        to_block: u64,
    ) -> SyncResult<Vec<Log>> {
        let filter = json!({
            "address": address,
            "topics": [topic0],
            "fromBlock": format!("0x{:x}", from_block),
            "toBlock": format!("0x{:x}", to_block),
        });
        self.call("eth_getLogs", json!([filter])).await
    }
}

/// Parse a JSON-RPC hex quantity such as `0x1b4`
pub fn parse_quantity(raw: &str) -> SyncResult<u64> {
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| SyncError::InvalidResponse(format!("Not a hex quantity: {}", raw)))?;
    if digits.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(digits, 16)
        .map_err(|_| SyncError::InvalidResponse(format!("Not a hex quantity: {}", raw)))
}
