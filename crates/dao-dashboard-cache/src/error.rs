use std::sync::Arc;

use dao_dashboard_sync::SyncError;
use thiserror::Error;

/// Why a cache key has no value to serve.
///
/// Cloneable so the same failure can be handed to every waiter on a key.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    #[error("Dashboard aggregation failed: {0}")]
    Aggregation(Arc<SyncError>),

    #[error("Cache entry {0} was dropped before it settled")]
    Closed(String),
}

impl CacheError {
    pub fn is_network(&self) -> bool {
        match self {
            CacheError::Aggregation(err) => err.is_network(),
            CacheError::Closed(_) => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("No event source configured for chain {0}")]
    UnsupportedChain(u64),

    #[error("Event watchers must be started inside a Tokio runtime")]
    NoRuntime,
}
