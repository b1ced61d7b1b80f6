use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypesError;

/// Proposal states worth showing on the dashboard
pub const ACTIONABLE_PROPOSAL_STATES: [ProposalState; 3] = [
    ProposalState::Active,
    ProposalState::Pending,
    ProposalState::Queued,
];

/// Lifecycle state of a governance proposal, in the governor's numeric order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalState {
    Pending,
    Active,
    Canceled,
    Defeated,
    Succeeded,
    Queued,
    Expired,
    Executed,
    Vetoed,
}

impl ProposalState {
    pub fn is_actionable(&self) -> bool {
        ACTIONABLE_PROPOSAL_STATES.contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalState::Pending => "Pending",
            ProposalState::Active => "Active",
            ProposalState::Canceled => "Canceled",
            ProposalState::Defeated => "Defeated",
            ProposalState::Succeeded => "Succeeded",
            ProposalState::Queued => "Queued",
            ProposalState::Expired => "Expired",
            ProposalState::Executed => "Executed",
            ProposalState::Vetoed => "Vetoed",
        }
    }
}

impl TryFrom<u8> for ProposalState {
    type Error = TypesError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ProposalState::Pending),
            1 => Ok(ProposalState::Active),
            2 => Ok(ProposalState::Canceled),
            3 => Ok(ProposalState::Defeated),
            4 => Ok(ProposalState::Succeeded),
            5 => Ok(ProposalState::Queued),
            6 => Ok(ProposalState::Expired),
            7 => Ok(ProposalState::Executed),
            8 => Ok(ProposalState::Vetoed),
            other => Err(TypesError::UnknownProposalState(other)),
        }
    }
}

impl fmt::Display for ProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 32-byte proposal identifier, kept as lower-case `0x` hex
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProposalId(String);

impl ProposalId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        if let Ok(bytes) = hex::decode(&self.0[2..]) {
            out.copy_from_slice(&bytes);
        }
        out
    }
}

impl FromStr for ProposalId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s.trim().strip_prefix("0x").unwrap_or(s.trim());
        if body.len() != 64 || !body.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypesError::InvalidProposalId(s.to_string()));
        }
        Ok(ProposalId(format!("0x{}", body.to_ascii_lowercase())))
    }
}

impl TryFrom<String> for ProposalId {
    type Error = TypesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ProposalId> for String {
    fn from(id: ProposalId) -> Self {
        id.0
    }
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A governance proposal as listed by the indexer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub proposal_id: ProposalId,
    pub proposal_number: u64,
    pub title: String,
}

impl Proposal {
    pub fn with_state(self, state: ProposalState) -> ResolvedProposal {
        ResolvedProposal {
            proposal: self,
            state,
        }
    }
}

/// A proposal annotated with the state its governor reported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedProposal {
    #[serde(flatten)]
    pub proposal: Proposal,
    #[serde(rename = "proposalState")]
    pub state: ProposalState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actionable_states() {
        let actionable: Vec<_> = (0u8..=8)
            .map(|n| ProposalState::try_from(n).unwrap())
            .filter(ProposalState::is_actionable)
            .collect();

        assert_eq!(
            actionable,
            vec![ProposalState::Pending, ProposalState::Active, ProposalState::Queued]
        );
        assert_eq!(ProposalState::try_from(9), Err(TypesError::UnknownProposalState(9)));
    }

    #[test]
    fn test_proposal_id_parsing() {
        let raw = format!("0x{}", "AB".repeat(32));
        let id: ProposalId = raw.parse().unwrap();

        assert_eq!(id.as_str(), format!("0x{}", "ab".repeat(32)));
        assert_eq!(id.to_bytes(), [0xab; 32]);
        assert!("0x01".parse::<ProposalId>().is_err());
    }

    #[test]
    fn test_proposal_json_shape() {
        let json = serde_json::json!({
            "proposalId": format!("0x{}", "01".repeat(32)),
            "proposalNumber": 4,
            "title": "Fund the treasury",
        });

        let proposal: Proposal = serde_json::from_value(json).unwrap();
        assert_eq!(proposal.proposal_number, 4);

        let resolved = proposal.with_state(ProposalState::Queued);
        let value = serde_json::to_value(&resolved).unwrap();
        assert_eq!(value["proposalState"], "Queued");
        assert_eq!(value["title"], "Fund the treasury");
    }
}
