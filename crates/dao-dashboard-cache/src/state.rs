use std::fmt;
use std::sync::Arc;

use dao_dashboard_types::{Address, DashboardResult};

use crate::error::CacheError;

/// Default namespace for dashboard cache keys
pub const DASHBOARD_NAMESPACE: &str = "dashboard";

/// Composite key: a fixed namespace plus the wallet address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub namespace: String,
    pub address: Address,
}

impl CacheKey {
    pub fn new(namespace: impl Into<String>, address: Address) -> Self {
        Self {
            namespace: namespace.into(),
            address,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.address)
    }
}

/// Lifecycle of one cache key
#[derive(Debug, Clone)]
pub enum CacheState {
    /// Never fetched
    Empty,

    /// An aggregation is in flight. `previous` is the last good value, if
    /// any, for consumers that want to keep showing it.
    Pending {
        previous: Option<Arc<DashboardResult>>,
    },

    Ready(Arc<DashboardResult>),

    Error(CacheError),
}

impl CacheState {
    pub fn is_pending(&self) -> bool {
        matches!(self, CacheState::Pending { .. })
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, CacheState::Ready(_))
    }

    /// Current value, or the last good one while revalidating
    pub fn value(&self) -> Option<&Arc<DashboardResult>> {
        match self {
            CacheState::Ready(result) => Some(result),
            CacheState::Pending { previous } => previous.as_ref(),
            CacheState::Empty | CacheState::Error(_) => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CacheState::Empty => "empty",
            CacheState::Pending { .. } => "pending",
            CacheState::Ready(_) => "ready",
            CacheState::Error(_) => "error",
        }
    }
}

/// What a key's watchers observe: its state and the latest generation issued
#[derive(Debug, Clone)]
pub struct CacheSnapshot {
    pub generation: u64,
    pub state: CacheState,
}

impl Default for CacheSnapshot {
    fn default() -> Self {
        Self {
            generation: 0,
            state: CacheState::Empty,
        }
    }
}
