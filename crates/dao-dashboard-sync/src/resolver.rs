use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dao_dashboard_types::{Address, ChainId, ProposalId, ProposalState};
use tracing::debug;

use crate::error::{SyncError, SyncResult};
use crate::rpc::RpcClient;

/// Selector of the governor's `state(bytes32)` view
pub const STATE_SELECTOR: [u8; 4] = [0x61, 0xd5, 0x85, 0xda];

/// Looks up the live lifecycle state of a proposal
#[async_trait]
pub trait ProposalStateResolver: Send + Sync {
    async fn resolve(
        &self,
        chain_id: ChainId,
        governor: &Address,
        proposal_id: &ProposalId,
    ) -> SyncResult<ProposalState>;
}

/// Resolves proposal states with `eth_call` against each chain's node
#[derive(Default)]
pub struct RpcProposalStateResolver {
    endpoints: HashMap<ChainId, Arc<RpcClient>>,
}

impl RpcProposalStateResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, chain_id: ChainId, client: Arc<RpcClient>) -> Self {
        self.endpoints.insert(chain_id, client);
        self
    }

    pub fn endpoint(&self, chain_id: ChainId) -> SyncResult<&Arc<RpcClient>> {
        self.endpoints
            .get(&chain_id)
            .ok_or(SyncError::UnknownChain(chain_id.0))
    }
}

#[async_trait]
impl ProposalStateResolver for RpcProposalStateResolver {
    async fn resolve(
        &self,
        chain_id: ChainId,
        governor: &Address,
        proposal_id: &ProposalId,
    ) -> SyncResult<ProposalState> {
        let rpc = self.endpoint(chain_id)?;
        let data = encode_state_call(proposal_id);

        let word = rpc.eth_call(governor, &data).await?;
        let state = decode_state_word(&word)?;
        debug!("Proposal {} on chain {} is {}", proposal_id, chain_id, state);
        Ok(state)
    }
}

/// Calldata for `state(bytes32)`
pub fn encode_state_call(proposal_id: &ProposalId) -> String {
    let mut calldata = Vec::with_capacity(36);
    calldata.extend_from_slice(&STATE_SELECTOR);
    calldata.extend_from_slice(&proposal_id.to_bytes());
    format!("0x{}", hex::encode(calldata))
}

/// Decode the ABI-encoded `uint8` enum returned by `state(bytes32)`
pub fn decode_state_word(word: &str) -> SyncResult<ProposalState> {
    let bytes = hex::decode(word.trim_start_matches("0x"))
        .map_err(|e| SyncError::InvalidResponse(format!("Bad state word {}: {}", word, e)))?;

    if bytes.len() != 32 || bytes[..31].iter().any(|b| *b != 0) {
        return Err(SyncError::InvalidResponse(format!("Bad state word {}", word)));
    }

    Ok(ProposalState::try_from(bytes[31])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn proposal_id() -> ProposalId {
        format!("0x{}", "0a".repeat(32)).parse().unwrap()
    }

    #[test]
    fn test_encode_state_call() {
        let data = encode_state_call(&proposal_id());
        assert_eq!(data, format!("0x61d585da{}", "0a".repeat(32)));
    }

    #[test]
    fn test_decode_state_word() {
        let queued = format!("0x{}05", "00".repeat(31));
        assert_eq!(decode_state_word(&queued).unwrap(), ProposalState::Queued);

        let out_of_range = format!("0x{}2a", "00".repeat(31));
        assert!(matches!(
            decode_state_word(&out_of_range),
            Err(SyncError::Types(_))
        ));

        assert!(decode_state_word("0x").is_err());
    }

    #[tokio::test]
    async fn test_resolve_over_rpc() {
        let mut server = mockito::Server::new_async().await;
        let governor: Address = "0x3333333333333333333333333333333333333333".parse().unwrap();

        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "method": "eth_call",
                "params": [{ "to": governor.as_str(), "data": encode_state_call(&proposal_id()) }, "latest"]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "jsonrpc": "2.0", "id": 1, "result": format!("0x{}01", "00".repeat(31)) }).to_string())
            .create_async()
            .await;

        let resolver = RpcProposalStateResolver::new()
            .with_endpoint(ChainId::BASE, Arc::new(RpcClient::new(server.url())));

        let state = resolver.resolve(ChainId::BASE, &governor, &proposal_id()).await.unwrap();
        assert_eq!(state, ProposalState::Active);
        mock.assert_async().await;

        let err = resolver.resolve(ChainId::ZORA, &governor, &proposal_id()).await.unwrap_err();
        assert!(matches!(err, SyncError::UnknownChain(7777777)));
    }
}
