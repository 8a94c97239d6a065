use std::fmt;

/// Number of base units in one display unit of a balance
pub const WEI_PER_UNIT: u128 = 1_000_000_000_000_000_000;

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize)]
pub struct Address(pub String);

impl Address {
    pub fn zero() -> Address {
        Address(format!("0x{:040x}", 0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An amount in base units, displayed in whole units with trailing zeros trimmed
///
/// Serialized as a decimal string of base units, as amounts overflow json numbers.
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(into = "String", try_from = "String")]
pub struct Balance(pub u128);

impl From<Balance> for String {
    fn from(b: Balance) -> String {
        b.0.to_string()
    }
}

impl TryFrom<String> for Balance {
    type Error = std::num::ParseIntError;

    fn try_from(s: String) -> Result<Balance, Self::Error> {
        s.parse().map(Balance)
    }
}

impl Balance {
    pub fn units(n: u128) -> Balance {
        Balance(n.saturating_mul(WEI_PER_UNIT))
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / WEI_PER_UNIT;
        let frac = self.0 % WEI_PER_UNIT;
        if frac == 0 {
            return write!(f, "{whole}");
        }
        let frac = format!("{frac:018}");
        write!(f, "{whole}.{}", frac.trim_end_matches('0'))
    }
}
