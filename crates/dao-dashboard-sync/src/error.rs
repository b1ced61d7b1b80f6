use dao_dashboard_types::TypesError;
use thiserror::Error;

pub type SyncResult<T> = Result<T, SyncError>;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error: HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No RPC endpoint configured for chain {0}")]
    UnknownChain(u64),

    #[error("Failed to resolve proposals for {dao}: {source}")]
    DaoResolution {
        dao: String,
        #[source]
        source: Box<SyncError>,
    },

    #[error("Type error: {0}")]
    Types(#[from] TypesError),
}

impl SyncError {
    /// Whether the failure came from talking to the indexer or a node, as
    /// opposed to a malformed payload or local misconfiguration
    pub fn is_network(&self) -> bool {
        match self {
            SyncError::Network(_)
            | SyncError::Api { .. }
            | SyncError::Request(_)
            | SyncError::Rpc { .. } => true,
            SyncError::DaoResolution { source, .. } => source.is_network(),
            _ => false,
        }
    }

    /// Failures worth retrying with backoff
    pub fn is_transient(&self) -> bool {
        match self {
            SyncError::Network(_) => true,
            SyncError::Api { status, .. } => *status == 408 || *status == 429 || *status >= 500,
            SyncError::Request(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

impl From<backoff::Error<SyncError>> for SyncError {
    fn from(err: backoff::Error<SyncError>) -> Self {
        match err {
            backoff::Error::Permanent(e) => e,
            backoff::Error::Transient { err, .. } => err,
        }
    }
}

/// Map a reqwest failure to a more specific error
pub fn map_reqwest_error(err: reqwest::Error) -> SyncError {
    if err.is_timeout() {
        SyncError::Network("Request timed out".to_string())
    } else if err.is_connect() {
        SyncError::Network("Connection error".to_string())
    } else if let Some(status) = err.status() {
        SyncError::Api {
            status: status.as_u16(),
            message: err.to_string(),
        }
    } else {
        SyncError::Request(err)
    }
}
