use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use dao_dashboard_sync::RpcClient;
use dao_dashboard_types::ChainId;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::error::WatchError;
use crate::watcher::{spawn_task, ChainEvent, ChainEventWatcher, EventCallback, EventFilter, Subscription};

/// Watches auction events by polling `eth_getLogs` on each chain's node.
///
/// Each subscription remembers the next block it has not scanned. A failed
/// poll leaves that block where it was, so the range is scanned again on
/// the next tick.
pub struct RpcLogWatcher {
    clients: HashMap<ChainId, Arc<RpcClient>>,
    poll_interval: Duration,
    start_block: Option<u64>,
}

impl RpcLogWatcher {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            clients: HashMap::new(),
            poll_interval,
            start_block: None,
        }
    }

    pub fn with_chain(mut self, chain_id: ChainId, client: Arc<RpcClient>) -> Self {
        self.clients.insert(chain_id, client);
        self
    }

    /// Scan from this block instead of only new blocks
    pub fn from_block(mut self, block: u64) -> Self {
        self.start_block = Some(block);
        self
    }

    pub fn chains(&self) -> impl Iterator<Item = &ChainId> {
        self.clients.keys()
    }
}

impl ChainEventWatcher for RpcLogWatcher {
    fn subscribe(&self, filter: EventFilter, callback: EventCallback) -> Result<Subscription, WatchError> {
        let client = self
            .clients
            .get(&filter.chain_id)
            .cloned()
            .ok_or(WatchError::UnsupportedChain(filter.chain_id.0))?;

        let poll_interval = self.poll_interval;
        let mut next_block = self.start_block;
        let task_filter = filter.clone();

        let task = spawn_task(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let head = match client.block_number().await {
                    Ok(head) => head,
                    Err(e) => {
                        warn!("Polling {} failed: {}", task_filter, e);
                        continue;
                    }
                };

                let from = match next_block {
                    Some(block) => block,
                    None => {
                        // First poll without a start block: only watch what comes next
                        next_block = Some(head + 1);
                        continue;
                    }
                };

                if from > head {
                    continue;
                }

                match client
                    .get_logs(&task_filter.contract, task_filter.event.topic(), from, head)
                    .await
                {
                    Ok(logs) => {
                        debug!("{}: {} logs in blocks {}..={}", task_filter, logs.len(), from, head);
                        for log in logs {
                            callback(ChainEvent {
                                filter: task_filter.clone(),
                                block_number: log.block(),
                                transaction_hash: log.transaction_hash,
                            });
                        }
                        next_block = Some(head + 1);
                    }
                    Err(e) => warn!("Fetching logs for {} failed: {}", task_filter, e),
                }
            }
        })?;

        debug!("Polling {} every {:?}", filter, self.poll_interval);
        Ok(Subscription::new(filter, task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watcher::AuctionEvent;
    use mockito::Matcher;
    use serde_json::json;
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_polls_logs_for_subscribed_event() {
        let mut server = mockito::Server::new_async().await;
        let auction = "0x2222222222222222222222222222222222222222";

        let _head = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({ "method": "eth_blockNumber" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0x10"}"#)
            .create_async()
            .await;

        let logs = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "method": "eth_getLogs",
                "params": [{
                    "address": auction,
                    "topics": [AuctionEvent::AuctionBid.topic()],
                    "fromBlock": "0xf",
                    "toBlock": "0x10"
                }]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "jsonrpc": "2.0",
                    "id": 2,
                    "result": [{
                        "address": auction,
                        "topics": [AuctionEvent::AuctionBid.topic()],
                        "data": "0x",
                        "blockNumber": "0x10",
                        "transactionHash": "0xfeed",
                        "logIndex": "0x0"
                    }]
                })
                .to_string(),
            )
            .expect_at_least(1)
            .create_async()
            .await;

        let watcher = RpcLogWatcher::new(Duration::from_millis(10))
            .with_chain(ChainId::BASE, Arc::new(RpcClient::new(server.url())))
            .from_block(15);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let callback: EventCallback = Arc::new(move |event| sink.lock().unwrap().push(event));

        let filter = EventFilter {
            contract: auction.parse().unwrap(),
            event: AuctionEvent::AuctionBid,
            chain_id: ChainId::BASE,
        };
        let _subscription = watcher.subscribe(filter.clone(), callback).unwrap();

        for _ in 0..100 {
            if !seen.lock().unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let events = seen.lock().unwrap().clone();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].filter, filter);
        assert_eq!(events[0].block_number, Some(16));
        assert_eq!(events[0].transaction_hash.as_deref(), Some("0xfeed"));
        logs.assert_async().await;
    }

    #[tokio::test]
    async fn test_unknown_chain_is_rejected() {
        let watcher = RpcLogWatcher::new(Duration::from_secs(1));
        let callback: EventCallback = Arc::new(|_| {});
        let filter = EventFilter {
            contract: "0x2222222222222222222222222222222222222222".parse().unwrap(),
            event: AuctionEvent::AuctionCreated,
            chain_id: ChainId::OPTIMISM,
        };

        assert!(matches!(
            watcher.subscribe(filter, callback),
            Err(WatchError::UnsupportedChain(10))
        ));
    }
}
