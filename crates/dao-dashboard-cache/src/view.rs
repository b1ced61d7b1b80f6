use chrono::{DateTime, Utc};
use dao_dashboard_types::{
    countdown_text, format_crypto_val, format_ether, Address, DashboardDao, DashboardResult,
    ProposalState,
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::state::CacheState;

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Gateway used to turn `ipfs://` URIs into fetchable URLs
    pub ipfs_gateway: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            ipfs_gateway: "https://ipfs.io".to_string(),
        }
    }
}

/// What the dashboard screen should show.
///
/// States are checked in a fixed order: error, loading, no address, empty,
/// data.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardView {
    Error(String),
    Loading,
    NoAddress,
    Empty,
    Data(DashboardPage),
}

impl DashboardView {
    pub fn resolve(
        address: Option<&Address>,
        state: &CacheState,
        now: DateTime<Utc>,
        config: &ViewConfig,
    ) -> Self {
        match state {
            CacheState::Error(err) => DashboardView::Error(err.to_string()),
            CacheState::Pending { .. } => DashboardView::Loading,
            _ if address.is_none() => DashboardView::NoAddress,
            // A known address whose first fetch has not started yet
            CacheState::Empty => DashboardView::Loading,
            CacheState::Ready(result) if result.is_empty() => DashboardView::Empty,
            CacheState::Ready(result) => DashboardView::Data(DashboardPage::build(result, now, config)),
        }
    }
}

/// The two dashboard sections
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardPage {
    /// Every DAO, one auction card each
    pub daos: Vec<AuctionCard>,
    /// Only DAOs with actionable proposals
    pub proposals: Vec<ProposalSection>,
    /// DAOs whose proposals could not be loaded
    pub warnings: Vec<String>,
}

impl DashboardPage {
    pub fn build(result: &DashboardResult, now: DateTime<Utc>, config: &ViewConfig) -> Self {
        Self {
            daos: result
                .dao_partition()
                .map(|dao| AuctionCard::build(dao, now))
                .collect(),
            proposals: result
                .proposal_partition()
                .map(|dao| ProposalSection::build(dao, config))
                .collect(),
            warnings: result
                .failures
                .iter()
                .map(|f| format!("Proposals for {} unavailable: {}", f.dao_name, f.reason))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuctionCard {
    pub dao_name: String,
    pub chain_name: String,
    pub auction_address: Address,
    pub token_name: String,
    pub token_image: Option<String>,
    /// Highest bid in ether, `N/A` only when there is no bid at all
    pub bid_text: String,
    pub countdown_text: String,
    /// Smallest acceptable next bid in ether
    pub min_bid_text: String,
    pub is_over: bool,
}

impl AuctionCard {
    pub fn build(dao: &DashboardDao, now: DateTime<Utc>) -> Self {
        let auction = &dao.current_auction;
        let is_over = auction.is_over(now.timestamp());

        let bid_text = auction
            .highest_amount()
            .map(format_ether)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        let countdown = if is_over {
            NOT_AVAILABLE.to_string()
        } else {
            countdown_text(auction.end_time, now)
        };

        Self {
            dao_name: dao.name.clone(),
            chain_name: dao.chain_id.display_name(),
            auction_address: dao.auction_address.clone(),
            token_name: auction.token.name.clone(),
            token_image: auction.token.image.clone(),
            bid_text,
            countdown_text: countdown,
            min_bid_text: format_crypto_val(dao.min_bid()),
            is_over,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProposalSection {
    pub dao_name: String,
    pub image_url: Option<String>,
    pub token_address: Address,
    pub proposals: Vec<ProposalCard>,
}

impl ProposalSection {
    pub fn build(dao: &DashboardDao, config: &ViewConfig) -> Self {
        Self {
            dao_name: dao.name.clone(),
            image_url: dao
                .dao_image
                .as_deref()
                .and_then(|uri| fetchable_url(uri, &config.ipfs_gateway)),
            token_address: dao.token_address.clone(),
            proposals: dao
                .proposals
                .iter()
                .map(|p| ProposalCard {
                    number: p.proposal.proposal_number,
                    title: p.proposal.title.clone(),
                    state: p.state,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProposalCard {
    pub number: u64,
    pub title: String,
    pub state: ProposalState,
}

/// HTTP(S) URL for an image URI, rewriting `ipfs://` through `gateway`
pub fn fetchable_url(uri: &str, gateway: &str) -> Option<String> {
    let uri = uri.trim();
    if uri.is_empty() {
        return None;
    }

    if let Some(path) = uri.strip_prefix("ipfs://") {
        let path = path.trim_start_matches("ipfs/");
        let base = Url::parse(&format!("{}/", gateway.trim_end_matches('/'))).ok()?;
        return base.join(&format!("ipfs/{}", path)).ok().map(String::from);
    }

    match Url::parse(uri) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Some(url.into()),
        _ => None,
    }
}
