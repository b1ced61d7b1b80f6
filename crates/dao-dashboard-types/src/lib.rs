//! # DAO Dashboard Types
//!
//! Shared data model for the DAO dashboard: addresses and chains, wei
//! amounts and their display formatting, DAO listings with their auction
//! snapshots, governance proposals and their lifecycle states, and the
//! aggregated per-address [`DashboardResult`].

pub mod address;
pub mod amount;
pub mod dao;
pub mod dashboard;
pub mod error;
pub mod proposal;
pub mod time;
pub mod transaction;

pub use address::{Address, ChainId};
pub use amount::{format_crypto_val, format_ether, min_bid_amount, Wei};
pub use dao::{AuctionConfig, AuctionSnapshot, Bid, Dao, DashboardDao, TokenMetadata};
pub use dashboard::{DaoFailure, DashboardResult};
pub use error::{TypesError, TypesResult};
pub use proposal::{Proposal, ProposalId, ProposalState, ResolvedProposal, ACTIONABLE_PROPOSAL_STATES};
pub use time::countdown_text;
pub use transaction::{TransactionType, ENTRY_SHORTCUTS};
