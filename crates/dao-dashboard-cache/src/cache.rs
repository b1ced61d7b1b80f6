use std::collections::HashMap;
use std::sync::Arc;

use dao_dashboard_sync::Aggregate;
use dao_dashboard_types::{Address, DashboardResult};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};

use crate::error::CacheError;
use crate::state::{CacheKey, CacheSnapshot, CacheState, DASHBOARD_NAMESPACE};

/// Cache behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Key namespace, the part of the key before the address
    pub namespace: String,

    /// Re-aggregate when the consumer regains focus. Off by default: each
    /// aggregation fans out one node call per listed proposal.
    pub revalidate_on_focus: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            namespace: DASHBOARD_NAMESPACE.to_string(),
            revalidate_on_focus: false,
        }
    }
}

/// One key's slot. Issuing a generation and committing a result both run
/// inside the watch channel's write closure, so they are serialized.
struct Entry {
    key: CacheKey,
    slot: watch::Sender<CacheSnapshot>,
}

impl Entry {
    fn new(key: CacheKey) -> Self {
        let (slot, _) = watch::channel(CacheSnapshot::default());
        Self { key, slot }
    }

    /// Issue the next generation and move to Pending
    fn begin(&self) -> u64 {
        let mut issued = 0;
        self.slot.send_modify(|snapshot| {
            snapshot.generation += 1;
            issued = snapshot.generation;
            let previous = snapshot.state.value().cloned();
            snapshot.state = CacheState::Pending { previous };
        });
        issued
    }

    /// Like [`Entry::begin`], but only for a key that was never fetched
    fn begin_if_empty(&self) -> Option<u64> {
        let mut issued = None;
        self.slot.send_if_modified(|snapshot| {
            if !matches!(snapshot.state, CacheState::Empty) {
                return false;
            }
            snapshot.generation += 1;
            issued = Some(snapshot.generation);
            snapshot.state = CacheState::Pending { previous: None };
            true
        });
        issued
    }

    /// Store `state` if `generation` is still the newest one issued.
    /// Returns false when a later invalidation superseded this result.
    fn commit(&self, generation: u64, state: CacheState) -> bool {
        self.slot.send_if_modified(|snapshot| {
            if snapshot.generation != generation {
                return false;
            }
            snapshot.state = state;
            true
        })
    }

    fn state(&self) -> CacheState {
        self.slot.borrow().state.clone()
    }

    /// Wait until the key leaves Pending and return what it settled on
    async fn settled(&self) -> Result<Arc<DashboardResult>, CacheError> {
        let mut receiver = self.slot.subscribe();
        let state = receiver
            .wait_for(|snapshot| !snapshot.state.is_pending())
            .await
            .map_err(|_| CacheError::Closed(self.key.to_string()))?
            .state
            .clone();

        match state {
            CacheState::Ready(result) => Ok(result),
            CacheState::Error(err) => Err(err),
            CacheState::Empty | CacheState::Pending { .. } => {
                Err(CacheError::Closed(self.key.to_string()))
            }
        }
    }
}

/// Keyed, revalidating store of per-address dashboards.
///
/// Each key moves `Empty → Pending → Ready | Error`, and back to `Pending`
/// on [`DashboardCache::invalidate`]. Every fetch is tagged with a
/// generation; a fetch that finishes after a newer one was issued is
/// discarded, so the newest invalidation always wins.
pub struct DashboardCache {
    aggregator: Arc<dyn Aggregate>,
    config: CacheConfig,
    entries: RwLock<HashMap<CacheKey, Arc<Entry>>>,
}

impl DashboardCache {
    pub fn new(aggregator: Arc<dyn Aggregate>) -> Self {
        Self::with_config(aggregator, CacheConfig::default())
    }

    pub fn with_config(aggregator: Arc<dyn Aggregate>, config: CacheConfig) -> Self {
        Self {
            aggregator,
            config,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn key(&self, address: &Address) -> CacheKey {
        CacheKey::new(self.config.namespace.clone(), address.clone())
    }

    async fn entry(&self, address: &Address) -> Arc<Entry> {
        let key = self.key(address);
        if let Some(entry) = self.entries.read().await.get(&key) {
            return entry.clone();
        }

        let mut entries = self.entries.write().await;
        entries
            .entry(key.clone())
            .or_insert_with(|| {
                debug!("Creating cache entry {}", key);
                Arc::new(Entry::new(key))
            })
            .clone()
    }

    /// Current state without triggering a fetch
    pub async fn peek(&self, address: &Address) -> CacheState {
        match self.entries.read().await.get(&self.key(address)) {
            Some(entry) => entry.state(),
            None => CacheState::Empty,
        }
    }

    /// Observe every state change of the key
    pub async fn subscribe(&self, address: &Address) -> watch::Receiver<CacheSnapshot> {
        self.entry(address).await.slot.subscribe()
    }

    /// The dashboard for `address`, fetching it on first use.
    ///
    /// Waits while the key is Pending. An Error state is returned as is; it
    /// only clears through [`DashboardCache::invalidate`].
    pub async fn get(&self, address: &Address) -> Result<Arc<DashboardResult>, CacheError> {
        let entry = self.entry(address).await;
        if let Some(generation) = entry.begin_if_empty() {
            info!("Cache miss for {}", entry.key);
            self.spawn_aggregation(entry.clone(), address.clone(), generation);
        }
        entry.settled().await
    }

    /// Re-aggregate `address` and replace the stored value.
    ///
    /// Returns what the key settles on, which is the newest invalidation's
    /// outcome when several overlap.
    pub async fn invalidate(&self, address: &Address) -> Result<Arc<DashboardResult>, CacheError> {
        let entry = self.start_revalidation(address).await;
        entry.settled().await
    }

    /// Focus/visibility hook. Only revalidates when
    /// [`CacheConfig::revalidate_on_focus`] is set; returns whether it did.
    pub async fn on_focus(&self, address: &Address) -> bool {
        if !self.config.revalidate_on_focus {
            debug!("Ignoring focus event for {}", self.key(address));
            return false;
        }
        self.start_revalidation(address).await;
        true
    }

    /// Drop the key, e.g. when the wallet disconnects or switches address
    pub async fn remove(&self, address: &Address) -> bool {
        let key = self.key(address);
        let removed = self.entries.write().await.remove(&key).is_some();
        if removed {
            info!("Evicted cache entry {}", key);
        }
        removed
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    async fn start_revalidation(&self, address: &Address) -> Arc<Entry> {
        let entry = self.entry(address).await;
        let generation = entry.begin();
        info!("Revalidating {} (generation {})", entry.key, generation);
        self.spawn_aggregation(entry.clone(), address.clone(), generation);
        entry
    }

    // Runs detached so a waiter that gives up cannot strand the key in Pending
    fn spawn_aggregation(&self, entry: Arc<Entry>, address: Address, generation: u64) {
        let aggregator = self.aggregator.clone();
        tokio::spawn(async move {
            let state = match aggregator.aggregate(&address).await {
                Ok(result) => CacheState::Ready(Arc::new(result)),
                Err(err) => {
                    warn!("Aggregation for {} failed: {}", entry.key, err);
                    CacheState::Error(CacheError::Aggregation(Arc::new(err)))
                }
            };

            if entry.commit(generation, state) {
                debug!("Committed {} generation {}", entry.key, generation);
            } else {
                debug!(
                    "Discarding stale result for {} (generation {})",
                    entry.key, generation
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> Entry {
        let address: Address = "0x000000000000000000000000000000000000abcd".parse().unwrap();
        Entry::new(CacheKey::new(DASHBOARD_NAMESPACE, address))
    }

    fn ready(name: &str) -> CacheState {
        let mut result = DashboardResult::default();
        result.failures.push(dao_dashboard_types::DaoFailure {
            dao_name: name.to_string(),
            chain_id: dao_dashboard_types::ChainId::ETHEREUM,
            governor_address: "0x3333333333333333333333333333333333333333".parse().unwrap(),
            reason: "marker".to_string(),
        });
        CacheState::Ready(Arc::new(result))
    }

    fn marker(state: &CacheState) -> Option<String> {
        state.value().map(|r| r.failures[0].dao_name.clone())
    }

    #[test]
    fn test_key_display() {
        let entry = entry();
        assert_eq!(
            entry.key.to_string(),
            "dashboard:0x000000000000000000000000000000000000abcd"
        );
    }

    #[test]
    fn test_stale_commit_is_discarded() {
        let entry = entry();

        let first = entry.begin();
        let second = entry.begin();
        assert!(second > first);

        assert!(entry.commit(second, ready("second")));
        assert!(!entry.commit(first, ready("first")));

        assert_eq!(marker(&entry.state()).as_deref(), Some("second"));
    }

    #[test]
    fn test_pending_keeps_previous_value() {
        let entry = entry();

        let generation = entry.begin();
        assert!(entry.commit(generation, ready("v1")));

        entry.begin();
        let state = entry.state();
        assert!(state.is_pending());
        assert_eq!(marker(&state).as_deref(), Some("v1"));
    }

    #[test]
    fn test_begin_if_empty_only_once() {
        let entry = entry();

        assert_eq!(entry.begin_if_empty(), Some(1));
        assert_eq!(entry.begin_if_empty(), None);
        assert_eq!(entry.begin(), 2);
    }
}
