use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypesError;

/// A 20-byte account or contract address.
///
/// Parsing accepts any casing with or without the `0x` prefix; the stored
/// form is always lower-case with the prefix, so two spellings of the same
/// address compare equal and produce the same cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Raw 20 bytes of the address
    pub fn to_bytes(&self) -> [u8; 20] {
        let mut out = [0u8; 20];
        // Validated on construction
        if let Ok(bytes) = hex::decode(&self.0[2..]) {
            out.copy_from_slice(&bytes);
        }
        out
    }

    /// Short display form, e.g. `0xabcd…1234`
    pub fn short(&self) -> String {
        format!("{}…{}", &self.0[..6], &self.0[self.0.len() - 4..])
    }
}

impl FromStr for Address {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let body = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if body.len() != 40 || !body.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypesError::InvalidAddress(s.to_string()));
        }

        Ok(Address(format!("0x{}", body.to_ascii_lowercase())))
    }
}

impl TryFrom<String> for Address {
    type Error = TypesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Numeric chain identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u64);

impl ChainId {
    pub const ETHEREUM: ChainId = ChainId(1);
    pub const OPTIMISM: ChainId = ChainId(10);
    pub const BASE: ChainId = ChainId(8453);
    pub const ZORA: ChainId = ChainId(7777777);
    pub const SEPOLIA: ChainId = ChainId(11155111);
    pub const OPTIMISM_SEPOLIA: ChainId = ChainId(11155420);
    pub const BASE_SEPOLIA: ChainId = ChainId(84532);
    pub const ZORA_SEPOLIA: ChainId = ChainId(999999999);

    /// Display name for the chains the dashboard knows about
    pub fn name(&self) -> Option<&'static str> {
        match *self {
            ChainId::ETHEREUM => Some("Ethereum"),
            ChainId::OPTIMISM => Some("Optimism"),
            ChainId::BASE => Some("Base"),
            ChainId::ZORA => Some("Zora"),
            ChainId::SEPOLIA => Some("Sepolia"),
            ChainId::OPTIMISM_SEPOLIA => Some("Optimism Sepolia"),
            ChainId::BASE_SEPOLIA => Some("Base Sepolia"),
            ChainId::ZORA_SEPOLIA => Some("Zora Sepolia"),
            _ => None,
        }
    }

    pub fn display_name(&self) -> String {
        self.name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("Chain {}", self.0))
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChainId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ChainId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_normalization() {
        let a: Address = "0xABCDEF0123456789abcdef0123456789ABCDEF01".parse().unwrap();
        let b: Address = "abcdef0123456789ABCDEF0123456789abcdef01".parse().unwrap();

        assert_eq!(a, b);
        assert_eq!(a.as_str(), "0xabcdef0123456789abcdef0123456789abcdef01");
        assert_eq!(a.short(), "0xabcd…ef01");
        assert_eq!(a.to_bytes()[0], 0xab);
    }

    #[test]
    fn test_address_rejects_garbage() {
        assert!("0x1234".parse::<Address>().is_err());
        assert!("0xzzcdef0123456789abcdef0123456789abcdef01".parse::<Address>().is_err());

        let json = serde_json::json!("not-an-address");
        assert!(serde_json::from_value::<Address>(json).is_err());
    }

    #[test]
    fn test_chain_names() {
        assert_eq!(ChainId::BASE.display_name(), "Base");
        assert_eq!(ChainId(42).display_name(), "Chain 42");
        assert_eq!("7777777".parse::<ChainId>().unwrap(), ChainId::ZORA);
    }
}
