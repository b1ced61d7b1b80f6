use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypesError;

/// Transaction kinds a DAO admin can queue from the transaction builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    SendEth,
    Airdrop,
    Custom,
}

/// Shortcuts offered on the transaction builder's entry screen, in order
pub const ENTRY_SHORTCUTS: [TransactionType; 3] = [
    TransactionType::SendEth,
    TransactionType::Airdrop,
    TransactionType::Custom,
];

impl TransactionType {
    pub fn title(&self) -> &'static str {
        match self {
            TransactionType::SendEth => "Send ETH",
            TransactionType::Airdrop => "Create an Airdrop",
            TransactionType::Custom => "Custom Transaction",
        }
    }

    pub fn subtitle(&self) -> &'static str {
        match self {
            TransactionType::SendEth => "Send ETH from the treasury to any address",
            TransactionType::Airdrop => "Mint DAO tokens to a list of recipients",
            TransactionType::Custom => "Call any contract function with custom calldata",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            TransactionType::SendEth => "send-eth",
            TransactionType::Airdrop => "airdrop",
            TransactionType::Custom => "custom",
        }
    }
}

impl FromStr for TransactionType {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "send-eth" => Ok(TransactionType::SendEth),
            "airdrop" => Ok(TransactionType::Airdrop),
            "custom" => Ok(TransactionType::Custom),
            _ => Err(TypesError::UnknownTransactionType(s.to_string())),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
