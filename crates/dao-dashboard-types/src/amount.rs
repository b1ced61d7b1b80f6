use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypesError;

const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;
const ETHER_DECIMALS: usize = 18;

/// Decimal places kept by [`format_crypto_val`]
const DISPLAY_DECIMALS: u32 = 4;

/// An amount of a chain's native currency in wei
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Wei(pub u128);

impl Wei {
    pub const ZERO: Wei = Wei(0);

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn from_ether(ether: u64) -> Self {
        Wei(ether as u128 * WEI_PER_ETHER)
    }
}

impl FromStr for Wei {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u128>()
            .map(Wei)
            .map_err(|_| TypesError::InvalidAmount(s.to_string()))
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Indexers send big integers as decimal strings; accept plain numbers too.
impl<'de> Deserialize<'de> for Wei {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
            Raw::Number(n) => Ok(Wei(n as u128)),
        }
    }
}

impl Serialize for Wei {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

/// Exact ether rendering of a wei amount with trailing zeros trimmed
pub fn format_ether(amount: Wei) -> String {
    let whole = amount.0 / WEI_PER_ETHER;
    let fraction = amount.0 % WEI_PER_ETHER;

    if fraction == 0 {
        return whole.to_string();
    }

    let digits = format!("{:0width$}", fraction, width = ETHER_DECIMALS);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

/// Compact ether rendering for display: at most four decimals, rounded up,
/// with thousands separators on the whole part.
///
/// Rounding up keeps a suggested minimum bid from ever showing a value below
/// the real minimum.
pub fn format_crypto_val(amount: Wei) -> String {
    let unit = WEI_PER_ETHER / 10u128.pow(DISPLAY_DECIMALS);
    let mut scaled = amount.0 / unit;
    if amount.0 % unit != 0 {
        scaled += 1;
    }

    let scale = 10u128.pow(DISPLAY_DECIMALS);
    let whole = group_thousands(scaled / scale);
    let fraction = scaled % scale;

    if fraction == 0 {
        return whole;
    }

    let digits = format!("{:0width$}", fraction, width = DISPLAY_DECIMALS as usize);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

fn group_thousands(value: u128) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Smallest bid the auction house will accept next.
///
/// With no bid yet (or a zero bid) that is the reserve price; otherwise the
/// highest bid raised by `min_bid_increment` percent.
pub fn min_bid_amount(highest_bid: Option<Wei>, reserve_price: Wei, min_bid_increment: u128) -> Wei {
    match highest_bid {
        Some(bid) if !bid.is_zero() => {
            let increment = bid.0.saturating_mul(min_bid_increment) / 100;
            Wei(bid.0.saturating_add(increment))
        }
        _ => reserve_price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ether() {
        assert_eq!(format_ether(Wei::ZERO), "0");
        assert_eq!(format_ether(Wei::from_ether(3)), "3");
        assert_eq!(format_ether(Wei(1_500_000_000_000_000_000)), "1.5");
        assert_eq!(format_ether(Wei(1)), "0.000000000000000001");
    }

    #[test]
    fn test_format_crypto_val_rounds_up() {
        assert_eq!(format_crypto_val(Wei(10_000_000_000_000_000)), "0.01");
        assert_eq!(format_crypto_val(Wei(10_000_000_000_000_001)), "0.0101");
        assert_eq!(format_crypto_val(Wei(1)), "0.0001");
        assert_eq!(format_crypto_val(Wei::from_ether(1234)), "1,234");
        assert_eq!(format_crypto_val(Wei::ZERO), "0");
    }

    #[test]
    fn test_min_bid_amount() {
        let reserve = Wei(10_000_000_000_000_000);

        assert_eq!(min_bid_amount(None, reserve, 10), reserve);
        assert_eq!(min_bid_amount(Some(Wei::ZERO), reserve, 10), reserve);
        assert_eq!(
            min_bid_amount(Some(Wei::from_ether(1)), reserve, 10),
            Wei(1_100_000_000_000_000_000)
        );
    }

    #[test]
    fn test_wei_deserialization() {
        let from_text: Wei = serde_json::from_str("\"340282366920938463463374607431768211455\"").unwrap();
        assert_eq!(from_text, Wei(u128::MAX));

        let from_number: Wei = serde_json::from_str("42").unwrap();
        assert_eq!(from_number, Wei(42));

        assert!(serde_json::from_str::<Wei>("\"-1\"").is_err());
        assert_eq!(serde_json::to_string(&Wei(7)).unwrap(), "\"7\"");
    }
}
