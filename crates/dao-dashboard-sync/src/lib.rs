//! # DAO Dashboard Sync
//!
//! Fetches what the dashboard shows for a wallet address. The listing comes
//! from the dashboard API ([`DashboardClient`]), proposal states come from
//! each DAO's governor contract ([`RpcProposalStateResolver`]), and
//! [`DashboardAggregator`] fans both out and merges them back in order.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dao_dashboard_sync::{
//!     Aggregate, ClientConfig, DashboardAggregator, DashboardClient, RpcClient,
//!     RpcProposalStateResolver,
//! };
//! use dao_dashboard_types::ChainId;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DashboardClient::new(&ClientConfig::default())?;
//!     let resolver = RpcProposalStateResolver::new()
//!         .with_endpoint(ChainId::BASE, Arc::new(RpcClient::new("https://mainnet.base.org")));
//!
//!     let aggregator = DashboardAggregator::new(Arc::new(client), Arc::new(resolver));
//!     let dashboard = aggregator
//!         .aggregate(&"0x000000000000000000000000000000000000abcd".parse()?)
//!         .await?;
//!
//!     for dao in dashboard.proposal_partition() {
//!         println!("{}: {} open proposals", dao.name, dao.proposals.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod aggregator;
pub mod client;
pub mod error;
pub mod resolver;
pub mod rpc;

pub use aggregator::{Aggregate, DashboardAggregator, FailurePolicy};
pub use client::{ClientConfig, DaoSource, DashboardClient};
pub use error::{map_reqwest_error, SyncError, SyncResult};
pub use resolver::{ProposalStateResolver, RpcProposalStateResolver, STATE_SELECTOR};
pub use rpc::{parse_quantity, Log, RpcClient};
