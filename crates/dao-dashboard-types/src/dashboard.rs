use serde::{Deserialize, Serialize};

use crate::address::{Address, ChainId};
use crate::dao::DashboardDao;

/// A DAO whose proposal states could not be resolved during aggregation.
///
/// The DAO itself still appears in [`DashboardResult::daos`] with an empty
/// proposal list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaoFailure {
    pub dao_name: String,
    pub chain_id: ChainId,
    pub governor_address: Address,
    pub reason: String,
}

/// Everything the dashboard shows for one address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResult {
    /// DAOs in indexer order, each holding only actionable proposals
    pub daos: Vec<DashboardDao>,
    #[serde(default)]
    pub failures: Vec<DaoFailure>,
}

impl DashboardResult {
    pub fn new(daos: Vec<DashboardDao>) -> Self {
        Self {
            daos,
            failures: Vec::new(),
        }
    }

    /// No DAOs for the address; a valid result, not an error
    pub fn is_empty(&self) -> bool {
        self.daos.is_empty()
    }

    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    /// DAOs section: every DAO
    pub fn dao_partition(&self) -> impl Iterator<Item = &DashboardDao> {
        self.daos.iter()
    }

    /// Proposals section: only DAOs with at least one actionable proposal
    pub fn proposal_partition(&self) -> impl Iterator<Item = &DashboardDao> {
        self.daos.iter().filter(|dao| !dao.proposals.is_empty())
    }

    pub fn proposal_count(&self) -> usize {
        self.daos.iter().map(|dao| dao.proposals.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::tests::sample_dao_json;
    use crate::dao::Dao;
    use crate::proposal::ProposalState;

    #[test]
    fn test_partitions() {
        let raw: Dao = serde_json::from_value(sample_dao_json()).unwrap();

        let with_proposal = raw.clone().with_proposals(
            raw.proposals
                .iter()
                .cloned()
                .map(|p| p.with_state(ProposalState::Active))
                .collect(),
        );
        let mut without_proposal = raw.with_proposals(Vec::new());
        without_proposal.name = "Quiet DAO".to_string();

        let result = DashboardResult::new(vec![with_proposal, without_proposal]);

        let daos: Vec<_> = result.dao_partition().map(|d| d.name.as_str()).collect();
        let proposals: Vec<_> = result.proposal_partition().map(|d| d.name.as_str()).collect();

        assert_eq!(daos, vec!["Builder DAO", "Quiet DAO"]);
        assert_eq!(proposals, vec!["Builder DAO"]);
        assert_eq!(result.proposal_count(), 1);
        assert!(!result.is_partial());
    }

    #[test]
    fn test_empty_result() {
        let result = DashboardResult::default();
        assert!(result.is_empty());
        assert_eq!(result.proposal_partition().count(), 0);
    }
}
