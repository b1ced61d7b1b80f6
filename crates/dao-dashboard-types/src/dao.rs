use serde::{Deserialize, Deserializer, Serialize};

use crate::address::{Address, ChainId};
use crate::amount::{min_bid_amount, Wei};
use crate::proposal::{Proposal, ResolvedProposal};

/// Auction house settings that decide the next acceptable bid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionConfig {
    /// Percentage the next bid must exceed the highest bid by
    #[serde(deserialize_with = "u128_from_text_or_number")]
    pub minimum_bid_increment: u128,
    pub reserve_price: Wei,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    pub amount: Wei,
    pub bidder: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetadata {
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub token_id: Option<String>,
}

/// State of the auction currently running for a DAO
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionSnapshot {
    #[serde(default)]
    pub highest_bid: Option<Bid>,
    /// Unix seconds; `None` means there is no active auction
    #[serde(default, deserialize_with = "opt_u64_from_text_or_number")]
    pub end_time: Option<u64>,
    pub token: TokenMetadata,
}

impl AuctionSnapshot {
    pub fn highest_amount(&self) -> Option<Wei> {
        self.highest_bid.as_ref().map(|bid| bid.amount)
    }

    /// An auction without an end time counts as over
    pub fn is_over(&self, now_unix: i64) -> bool {
        match self.end_time {
            Some(end) => now_unix >= end as i64,
            None => true,
        }
    }
}

/// A DAO the dashboard address is associated with.
///
/// Generic over the proposal representation: the indexer listing yields
/// `Dao<Proposal>`, the aggregated dashboard holds `Dao<ResolvedProposal>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dao<P = Proposal> {
    pub name: String,
    pub chain_id: ChainId,
    #[serde(default)]
    pub dao_image: Option<String>,
    pub token_address: Address,
    pub auction_address: Address,
    pub governor_address: Address,
    pub auction_config: AuctionConfig,
    #[serde(default = "Vec::new")]
    pub proposals: Vec<P>,
    pub current_auction: AuctionSnapshot,
}

/// A DAO entry on the dashboard, proposals already resolved and filtered
pub type DashboardDao = Dao<ResolvedProposal>;

impl<P> Dao<P> {
    /// Rebuild the DAO around a different proposal list
    pub fn with_proposals<Q>(self, proposals: Vec<Q>) -> Dao<Q> {
        Dao {
            name: self.name,
            chain_id: self.chain_id,
            dao_image: self.dao_image,
            token_address: self.token_address,
            auction_address: self.auction_address,
            governor_address: self.governor_address,
            auction_config: self.auction_config,
            proposals,
            current_auction: self.current_auction,
        }
    }

    /// Minimum next bid for the current auction
    pub fn min_bid(&self) -> Wei {
        min_bid_amount(
            self.current_auction.highest_amount(),
            self.auction_config.reserve_price,
            self.auction_config.minimum_bid_increment,
        )
    }
}

fn u128_from_text_or_number<'de, D>(deserializer: D) -> Result<u128, D::Error>
where
    D: Deserializer<'de>,
{
    Wei::deserialize(deserializer).map(|w| w.0)
}

fn opt_u64_from_text_or_number<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Raw::Text(text)) => text.trim().parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub fn sample_dao_json() -> serde_json::Value {
        json!({
            "name": "Builder DAO",
            "chainId": 8453,
            "daoImage": "ipfs://bafybeigdyrzt",
            "tokenAddress": "0x1111111111111111111111111111111111111111",
            "auctionAddress": "0x2222222222222222222222222222222222222222",
            "governorAddress": "0x3333333333333333333333333333333333333333",
            "auctionConfig": {
                "minimumBidIncrement": "10",
                "reservePrice": "10000000000000000"
            },
            "proposals": [{
                "proposalId": format!("0x{}", "0a".repeat(32)),
                "proposalNumber": 12,
                "title": "Sponsor a hackathon"
            }],
            "currentAuction": {
                "endTime": "1700000000",
                "highestBid": {
                    "amount": "1000000000000000000",
                    "bidder": "0x4444444444444444444444444444444444444444"
                },
                "token": { "name": "Builder #88", "image": "https://img/88.svg", "tokenId": "88" }
            }
        })
    }

    #[test]
    fn test_dao_from_indexer_json() {
        let dao: Dao = serde_json::from_value(sample_dao_json()).unwrap();

        assert_eq!(dao.chain_id, ChainId::BASE);
        assert_eq!(dao.auction_config.minimum_bid_increment, 10);
        assert_eq!(dao.current_auction.end_time, Some(1_700_000_000));
        assert_eq!(dao.proposals.len(), 1);
        assert_eq!(dao.min_bid(), Wei(1_100_000_000_000_000_000));
    }

    #[test]
    fn test_missing_auction_fields() {
        let mut value = sample_dao_json();
        value["currentAuction"]["endTime"] = serde_json::Value::Null;
        value["currentAuction"]["highestBid"] = serde_json::Value::Null;
        value.as_object_mut().unwrap().remove("proposals");

        let dao: Dao = serde_json::from_value(value).unwrap();
        assert!(dao.proposals.is_empty());
        assert!(dao.current_auction.is_over(0));
        assert_eq!(dao.min_bid(), dao.auction_config.reserve_price);
    }

    #[test]
    fn test_auction_is_over() {
        let dao: Dao = serde_json::from_value(sample_dao_json()).unwrap();

        assert!(!dao.current_auction.is_over(1_699_999_999));
        assert!(dao.current_auction.is_over(1_700_000_000));
    }
}
