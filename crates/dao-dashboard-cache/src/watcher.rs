use std::fmt;
use std::sync::Arc;

use dao_dashboard_types::{Address, ChainId};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::WatchError;

/// Auction house events that change what the dashboard shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuctionEvent {
    AuctionCreated,
    AuctionBid,
}

impl AuctionEvent {
    pub const ALL: [AuctionEvent; 2] = [AuctionEvent::AuctionCreated, AuctionEvent::AuctionBid];

    pub fn name(&self) -> &'static str {
        match self {
            AuctionEvent::AuctionCreated => "AuctionCreated",
            AuctionEvent::AuctionBid => "AuctionBid",
        }
    }

    /// keccak256 of the event signature, the log's first topic
    pub fn topic(&self) -> &'static str {
        match self {
            // AuctionCreated(uint256,uint256,uint256)
            AuctionEvent::AuctionCreated => {
                "0xd6eddd1118d71820909c1197aa966dbc15ed6f508554252169cc3d5ccac756ca"
            }
            // AuctionBid(uint256,address,uint256,bool,uint256)
            AuctionEvent::AuctionBid => {
                "0x1edd36b28569cf1cf930c008c5bcb196ea19525977951413bec3118946951561"
            }
        }
    }
}

impl fmt::Display for AuctionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a subscription listens to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventFilter {
    pub contract: Address,
    pub event: AuctionEvent,
    pub chain_id: ChainId,
}

impl fmt::Display for EventFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} on chain {}", self.event, self.contract, self.chain_id)
    }
}

/// One observed on-chain event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainEvent {
    pub filter: EventFilter,
    pub block_number: Option<u64>,
    pub transaction_hash: Option<String>,
}

impl ChainEvent {
    pub fn new(contract: Address, event: AuctionEvent, chain_id: ChainId) -> Self {
        Self {
            filter: EventFilter {
                contract,
                event,
                chain_id,
            },
            block_number: None,
            transaction_hash: None,
        }
    }
}

pub type EventCallback = Arc<dyn Fn(ChainEvent) + Send + Sync>;

/// A live subscription; dropping it stops delivery
pub struct Subscription {
    filter: EventFilter,
    task: JoinHandle<()>,
}

impl Subscription {
    pub fn new(filter: EventFilter, task: JoinHandle<()>) -> Self {
        Self { filter, task }
    }

    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        debug!("Unsubscribing {}", self.filter);
        self.task.abort();
    }
}

/// Source of on-chain events.
///
/// Delivery is at least once: a callback may see the same event twice, and
/// consumers must tolerate that. Connection handling and ordering are the
/// implementation's business.
pub trait ChainEventWatcher: Send + Sync {
    fn subscribe(&self, filter: EventFilter, callback: EventCallback) -> Result<Subscription, WatchError>;
}

pub(crate) fn spawn_task<F>(future: F) -> Result<JoinHandle<()>, WatchError>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let handle = tokio::runtime::Handle::try_current().map_err(|_| WatchError::NoRuntime)?;
    Ok(handle.spawn(future))
}

/// In-process event source fed through [`LocalEventBus::emit`].
///
/// Used by embedders that already receive events elsewhere (a websocket
/// feed, a wallet provider) and by tests.
#[derive(Clone)]
pub struct LocalEventBus {
    sender: broadcast::Sender<ChainEvent>,
}

impl LocalEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event; returns how many subscriptions were listening
    pub fn emit(&self, event: ChainEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for LocalEventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl ChainEventWatcher for LocalEventBus {
    fn subscribe(&self, filter: EventFilter, callback: EventCallback) -> Result<Subscription, WatchError> {
        let mut receiver = self.sender.subscribe();
        let task_filter = filter.clone();

        let task = spawn_task(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) if event.filter == task_filter => callback(event),
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Missed events may have matched; one redelivery covers them
                        warn!("{} lagged by {} events", task_filter, skipped);
                        callback(ChainEvent {
                            filter: task_filter.clone(),
                            block_number: None,
                            transaction_hash: None,
                        });
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })?;

        debug!("Subscribed to {}", filter);
        Ok(Subscription::new(filter, task))
    }
}
