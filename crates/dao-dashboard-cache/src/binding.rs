use std::collections::BTreeSet;
use std::sync::Arc;

use dao_dashboard_types::{Address, DashboardResult};
use tracing::{debug, info, warn};

use crate::cache::DashboardCache;
use crate::watcher::{AuctionEvent, ChainEvent, ChainEventWatcher, EventCallback, EventFilter, Subscription};

/// A filter no watcher could serve, e.g. a chain without a configured node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFilter {
    pub filter: EventFilter,
    pub reason: String,
}

/// Keeps one address's cache key fresh by invalidating it whenever an
/// auction of one of its DAOs is created or receives a bid.
///
/// A filter that cannot be subscribed is skipped and recorded; the other
/// DAOs stay bound.
pub struct AuctionEventBinding {
    address: Address,
    subscriptions: Vec<Subscription>,
    skipped: Vec<SkippedFilter>,
}

impl AuctionEventBinding {
    /// Subscribe both auction events for every DAO in `result`
    pub fn bind(
        cache: Arc<DashboardCache>,
        watcher: &dyn ChainEventWatcher,
        address: &Address,
        result: &DashboardResult,
    ) -> Self {
        let mut binding = Self {
            address: address.clone(),
            subscriptions: Vec::new(),
            skipped: Vec::new(),
        };
        binding.rebind(cache, watcher, result);
        binding
    }

    /// Follow a new dashboard result: subscribe auctions that appeared and
    /// drop the ones that are gone. Unchanged subscriptions are kept.
    pub fn rebind(
        &mut self,
        cache: Arc<DashboardCache>,
        watcher: &dyn ChainEventWatcher,
        result: &DashboardResult,
    ) {
        let wanted = filters_for(result);

        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| wanted.contains(s.filter()));
        let dropped = before - self.subscriptions.len();

        self.skipped.clear();
        let mut added = 0;
        for filter in wanted {
            if self.subscriptions.iter().any(|s| *s.filter() == filter) {
                continue;
            }
            let callback = invalidation_callback(cache.clone(), self.address.clone());
            match watcher.subscribe(filter.clone(), callback) {
                Ok(subscription) => {
                    self.subscriptions.push(subscription);
                    added += 1;
                }
                Err(e) => {
                    warn!("Not watching {}: {}", filter, e);
                    self.skipped.push(SkippedFilter {
                        filter,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Auction events for {}: {} subscriptions ({} added, {} dropped, {} skipped)",
            self.address,
            self.subscriptions.len(),
            added,
            dropped,
            self.skipped.len()
        );
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn filters(&self) -> Vec<EventFilter> {
        self.subscriptions.iter().map(|s| s.filter().clone()).collect()
    }

    /// Filters left unwatched by the last bind
    pub fn skipped(&self) -> &[SkippedFilter] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

/// Both auction events for each DAO's auction contract, deduplicated
pub fn filters_for(result: &DashboardResult) -> Vec<EventFilter> {
    let mut seen = BTreeSet::new();
    let mut filters = Vec::new();

    for dao in result.dao_partition() {
        for event in AuctionEvent::ALL {
            let filter = EventFilter {
                contract: dao.auction_address.clone(),
                event,
                chain_id: dao.chain_id,
            };
            if seen.insert((filter.chain_id, filter.contract.clone(), filter.event.name())) {
                filters.push(filter);
            }
        }
    }

    filters
}

fn invalidation_callback(cache: Arc<DashboardCache>, address: Address) -> EventCallback {
    Arc::new(move |event: ChainEvent| {
        debug!("{} invalidates {}", event.filter, address);

        let cache = cache.clone();
        let address = address.clone();
        tokio::spawn(async move {
            if let Err(e) = cache.invalidate(&address).await {
                warn!("Refreshing dashboard for {} failed: {}", address, e);
            }
        });
    })
}
