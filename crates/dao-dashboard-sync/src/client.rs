use std::time::Duration;

use async_trait::async_trait;
use backoff::future::retry_notify;
use backoff::ExponentialBackoff;
use dao_dashboard_types::{Address, Dao};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{map_reqwest_error, SyncError, SyncResult};

/// Source of the raw DAO listing for an address
#[async_trait]
pub trait DaoSource: Send + Sync {
    /// DAOs associated with `address`, in indexer order. An address with no
    /// DAOs yields an empty list, not an error.
    async fn fetch_daos(&self, address: &Address) -> SyncResult<Vec<Dao>>;
}

/// Connection settings for the dashboard listing API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_url: String,
    pub timeout_seconds: u64,
    /// Give up retrying transient failures after this long
    pub max_retry_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000".to_string(),
            timeout_seconds: 30,
            max_retry_seconds: 60,
        }
    }
}

/// HTTP client for `GET /api/dashboard/{address}`
#[derive(Clone)]
pub struct DashboardClient {
    client: Client,

    /// Base URL of the dashboard API
    pub(crate) base_url: String,

    /// Authentication token (if needed)
    pub(crate) auth_token: Option<String>,

    /// Retry schedule for transient failures
    backoff: ExponentialBackoff,
}

impl DashboardClient {
    pub fn new(config: &ClientConfig) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| SyncError::Network(format!("Failed to create HTTP client: {}", e)))?;

        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(config.max_retry_seconds)),
            ..ExponentialBackoff::default()
        };

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            auth_token: None,
            backoff,
        })
    }

    pub fn with_auth_token(mut self, token: String) -> Self {
        self.auth_token = Some(token);
        self
    }

    pub fn with_backoff(mut self, backoff: ExponentialBackoff) -> Self {
        self.backoff = backoff;
        self
    }

    fn dashboard_url(&self, address: &Address) -> String {
        format!("{}/api/dashboard/{}", self.base_url, address)
    }

    /// Single listing request, no retries
    pub async fn fetch_once(&self, address: &Address) -> SyncResult<Vec<Dao>> {
        let url = self.dashboard_url(address);
        debug!("Fetching dashboard listing from {}", url);

        let mut request = self.client.get(&url);
        if let Some(token) = &self.auth_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            debug!("No dashboard listing for {}", address);
            return Ok(Vec::new());
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SyncError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await.map_err(map_reqwest_error)?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        let daos: Option<Vec<Dao>> = serde_json::from_str(&body)?;
        Ok(daos.unwrap_or_default())
    }
}

#[async_trait]
impl DaoSource for DashboardClient {
    async fn fetch_daos(&self, address: &Address) -> SyncResult<Vec<Dao>> {
        let backoff = self.backoff.clone();

        let operation = || async {
            self.fetch_once(address).await.map_err(|e| {
                if e.is_transient() {
                    backoff::Error::transient(e)
                } else {
                    backoff::Error::permanent(e)
                }
            })
        };

        let daos = retry_notify(backoff, operation, |err: SyncError, dur: Duration| {
            warn!("Retrying dashboard listing after {:?} due to error: {}", dur, err);
        })
        .await?;

        Ok(daos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ADDRESS: &str = "0x000000000000000000000000000000000000abcd";

    fn fast_backoff() -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: Duration::from_millis(5),
            max_interval: Duration::from_millis(20),
            max_elapsed_time: Some(Duration::from_millis(150)),
            ..ExponentialBackoff::default()
        }
    }

    fn client_for(server: &mockito::Server) -> DashboardClient {
        let config = ClientConfig {
            api_url: server.url(),
            timeout_seconds: 5,
            max_retry_seconds: 1,
        };
        DashboardClient::new(&config).unwrap().with_backoff(fast_backoff())
    }

    fn listing() -> serde_json::Value {
        json!([{
            "name": "Builder DAO",
            "chainId": 1,
            "tokenAddress": "0x1111111111111111111111111111111111111111",
            "auctionAddress": "0x2222222222222222222222222222222222222222",
            "governorAddress": "0x3333333333333333333333333333333333333333",
            "auctionConfig": { "minimumBidIncrement": "10", "reservePrice": "0" },
            "proposals": [],
            "currentAuction": { "endTime": null, "highestBid": null, "token": { "name": "Builder #1" } }
        }])
    }

    #[tokio::test]
    async fn test_fetch_daos() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", format!("/api/dashboard/{}", ADDRESS).as_str())
            .match_header("authorization", "Bearer secret")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(listing().to_string())
            .create_async()
            .await;

        let client = client_for(&server).with_auth_token("secret".to_string());
        let daos = client.fetch_daos(&ADDRESS.parse().unwrap()).await.unwrap();

        assert_eq!(daos.len(), 1);
        assert_eq!(daos[0].name, "Builder DAO");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_absent_listing_is_empty() {
        let mut server = mockito::Server::new_async().await;
        let address: Address = ADDRESS.parse().unwrap();
        let path = format!("/api/dashboard/{}", ADDRESS);

        let not_found = server.mock("GET", path.as_str()).with_status(404).create_async().await;
        assert!(client_for(&server).fetch_daos(&address).await.unwrap().is_empty());
        not_found.assert_async().await;

        let mut server = mockito::Server::new_async().await;
        let null_body = server
            .mock("GET", path.as_str())
            .with_status(200)
            .with_body("null")
            .create_async()
            .await;
        assert!(client_for(&server).fetch_daos(&address).await.unwrap().is_empty());
        null_body.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_errors_are_retried_then_surfaced() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", format!("/api/dashboard/{}", ADDRESS).as_str())
            .with_status(503)
            .with_body("indexer down")
            .expect_at_least(2)
            .create_async()
            .await;

        let err = client_for(&server)
            .fetch_daos(&ADDRESS.parse().unwrap())
            .await
            .unwrap_err();

        assert!(err.is_network());
        assert!(matches!(err, SyncError::Api { status: 503, .. }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_malformed_listing_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", format!("/api/dashboard/{}", ADDRESS).as_str())
            .with_status(200)
            .with_body("{\"unexpected\": true}")
            .expect(1)
            .create_async()
            .await;

        let err = client_for(&server)
            .fetch_daos(&ADDRESS.parse().unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Serialization(_)));
        mock.assert_async().await;
    }
}
