use thiserror::Error;

pub type TypesResult<T> = Result<T, TypesError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypesError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid proposal id: {0}")]
    InvalidProposalId(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Unknown proposal state: {0}")]
    UnknownProposalState(u8),

    #[error("Unknown transaction type: {0}")]
    UnknownTransactionType(String),
}
