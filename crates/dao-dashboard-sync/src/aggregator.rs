use std::sync::Arc;

use async_trait::async_trait;
use dao_dashboard_types::{Address, Dao, DaoFailure, DashboardDao, DashboardResult};
use futures::future::{join_all, try_join_all};
use tracing::{debug, info, warn};

use crate::client::DaoSource;
use crate::error::{SyncError, SyncResult};
use crate::resolver::ProposalStateResolver;

/// Produces the dashboard for an address
#[async_trait]
pub trait Aggregate: Send + Sync {
    async fn aggregate(&self, address: &Address) -> SyncResult<DashboardResult>;
}

/// What to do when one DAO's proposal states cannot be resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Keep the DAO with no proposals and record the failure in
    /// [`DashboardResult::failures`]; the other DAOs are unaffected
    #[default]
    Isolate,

    /// Fail the whole aggregation with the first failing DAO in listing order
    FailFast,
}

/// Fetches an address's DAOs and keeps only their actionable proposals
pub struct DashboardAggregator {
    source: Arc<dyn DaoSource>,
    resolver: Arc<dyn ProposalStateResolver>,
    policy: FailurePolicy,
}

impl DashboardAggregator {
    pub fn new(source: Arc<dyn DaoSource>, resolver: Arc<dyn ProposalStateResolver>) -> Self {
        Self {
            source,
            resolver,
            policy: FailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Resolve every proposal of `dao` concurrently and drop the ones that are
    /// not actionable. On failure the DAO comes back with no proposals.
    async fn resolve_dao(&self, mut dao: Dao) -> Result<DashboardDao, (DashboardDao, SyncError)> {
        let lookups = dao.proposals.iter().map(|proposal| {
            self.resolver
                .resolve(dao.chain_id, &dao.governor_address, &proposal.proposal_id)
        });

        // try_join_all keeps input order regardless of completion order
        let outcome = try_join_all(lookups).await;
        let states = match outcome {
            Ok(states) => states,
            Err(err) => return Err((dao.with_proposals(Vec::new()), err)),
        };

        let proposals = std::mem::take(&mut dao.proposals);
        let total = proposals.len();
        let actionable: Vec<_> = proposals
            .into_iter()
            .zip(states)
            .map(|(proposal, state)| proposal.with_state(state))
            .filter(|proposal| proposal.state.is_actionable())
            .collect();

        debug!(
            "{}: {} of {} proposals actionable",
            dao.name,
            actionable.len(),
            total
        );

        Ok(dao.with_proposals(actionable))
    }
}

#[async_trait]
impl Aggregate for DashboardAggregator {
    async fn aggregate(&self, address: &Address) -> SyncResult<DashboardResult> {
        let daos = self.source.fetch_daos(address).await?;
        if daos.is_empty() {
            info!("No DAOs associated with {}", address);
            return Ok(DashboardResult::default());
        }

        let dao_count = daos.len();
        let outcomes = join_all(daos.into_iter().map(|dao| self.resolve_dao(dao))).await;

        let mut result = DashboardResult::default();
        for outcome in outcomes {
            match outcome {
                Ok(dao) => result.daos.push(dao),
                Err((dao, err)) => match self.policy {
                    FailurePolicy::FailFast => {
                        return Err(SyncError::DaoResolution {
                            dao: dao.name,
                            source: Box::new(err),
                        });
                    }
                    FailurePolicy::Isolate => {
                        warn!("Could not resolve proposals for {}: {}", dao.name, err);
                        result.failures.push(DaoFailure {
                            dao_name: dao.name.clone(),
                            chain_id: dao.chain_id,
                            governor_address: dao.governor_address.clone(),
                            reason: err.to_string(),
                        });
                        result.daos.push(dao);
                    }
                },
            }
        }

        info!(
            "Aggregated {} DAOs for {} ({} actionable proposals, {} failures)",
            dao_count,
            address,
            result.proposal_count(),
            result.failures.len()
        );

        Ok(result)
    }
}
