use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Native currency base units (18 decimals per whole unit).
pub type Wei = u128;

/// USD values carry the same 18-decimal precision as [`Wei`].
pub type UsdWei = u128;

pub const WEI_PER_UNIT: Wei = 1_000_000_000_000_000_000;

/// 預設最低捐款: 5 USD
pub const DEFAULT_MINIMUM_USD: UsdWei = 5 * WEI_PER_UNIT;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One reading of the price feed.
///
/// `rate` is the USD price of one native unit scaled by `10^decimals`, so an
/// 8-decimal feed reporting $2000 answers `200_000_000_000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub rate: i128,
    pub decimals: u8,
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingReceipt {
    pub contributor: Address,
    pub amount: Wei,
    pub usd_value: UsdWei,
    pub contributor_total: Wei,
    pub funded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalReceipt {
    pub owner: Address,
    pub amount: Wei,
    pub contributions_cleared: usize,
    pub withdrawn_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub amount: Wei,
    pub unit_price_usd: UsdWei,
    pub usd_value: UsdWei,
    pub minimum_usd: UsdWei,
    pub accepted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorBalance {
    pub contributor: Address,
    pub amount: Wei,
}

/// Point-in-time view of the ledger, in first-contribution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub total_balance: Wei,
    pub contribution_count: usize,
    pub balances: Vec<ContributorBalance>,
}

/// Formats a wei amount as whole units with up to 18 decimals, trimming zeros.
pub fn format_units(amount: u128) -> String {
    let whole = amount / WEI_PER_UNIT;
    let frac = amount % WEI_PER_UNIT;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:018}", frac);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

/// Parses a decimal string such as `"0.1"` or `"5"` into 18-decimal base units.
///
/// Returns `None` for malformed input, more than 18 fractional digits, or overflow.
pub fn parse_units(value: &str) -> Option<u128> {
    let value = value.trim();
    let (whole, frac) = match value.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (value, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if frac.len() > 18 || !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }

    let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let frac: u128 = if frac.is_empty() {
        0
    } else {
        format!("{:0<18}", frac).parse().ok()?
    };

    whole.checked_mul(WEI_PER_UNIT)?.checked_add(frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_units("1"), Some(WEI_PER_UNIT));
        assert_eq!(parse_units("0.1"), Some(WEI_PER_UNIT / 10));
        assert_eq!(parse_units(".0025"), Some(2_500_000_000_000_000));
        assert_eq!(parse_units("5.00"), Some(DEFAULT_MINIMUM_USD));
        assert_eq!(parse_units("0.000000000000000001"), Some(1));
        assert_eq!(parse_units("0.0000000000000000001"), None);
        assert_eq!(parse_units("-1"), None);
        assert_eq!(parse_units("1e18"), None);
        assert_eq!(parse_units(""), None);
        assert_eq!(parse_units("."), None);
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(0), "0");
        assert_eq!(format_units(WEI_PER_UNIT), "1");
        assert_eq!(format_units(WEI_PER_UNIT / 10 * 9), "0.9");
        assert_eq!(format_units(2_500_000_000_000_000), "0.0025");
        assert_eq!(format_units(DEFAULT_MINIMUM_USD), "5");
    }

    #[test]
    fn test_address_serializes_as_plain_string() {
        let addr = Address::from("0xabc");
        assert_eq!(serde_json::to_string(&addr).unwrap(), "\"0xabc\"");
        assert_eq!(addr.to_string(), "0xabc");
    }
}
