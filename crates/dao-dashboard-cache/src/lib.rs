//! # DAO Dashboard Cache
//!
//! Keeps per-address dashboards fresh. [`DashboardCache`] stores one
//! aggregated [`DashboardResult`](dao_dashboard_types::DashboardResult) per
//! wallet address and re-aggregates it on demand; an
//! [`AuctionEventBinding`] invalidates that entry whenever one of the
//! address's DAO auctions is created or receives a bid.
//!
//! [`DashboardView`] turns a cache state into what the screen shows.

pub mod binding;
pub mod cache;
pub mod error;
pub mod rpc_watcher;
pub mod state;
pub mod view;
pub mod watcher;

pub use binding::{filters_for, AuctionEventBinding, SkippedFilter};
pub use cache::{CacheConfig, DashboardCache};
pub use error::{CacheError, WatchError};
pub use rpc_watcher::RpcLogWatcher;
pub use state::{CacheKey, CacheSnapshot, CacheState, DASHBOARD_NAMESPACE};
pub use view::{
    fetchable_url, AuctionCard, DashboardPage, DashboardView, ProposalCard, ProposalSection,
    ViewConfig,
};
pub use watcher::{
    AuctionEvent, ChainEvent, ChainEventWatcher, EventCallback, EventFilter, LocalEventBus,
    Subscription,
};
