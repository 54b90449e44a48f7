//! Fixed-point quantities with two decimal places.
//!
//! Paper dimensions and job costs are compared exactly, so both are kept as
//! integer hundredths and serialized as decimal strings (`"210.00"`).

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Errors from parsing a two-decimal quantity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitParseError {
    #[error("value is empty")]
    Empty,

    #[error("invalid decimal: {0}")]
    Invalid(String),

    #[error("too many decimal places in {0} (at most 2)")]
    Precision(String),

    #[error("value out of range: {0}")]
    Overflow(String),
}

fn parse_hundredths(raw: &str) -> Result<u64, UnitParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UnitParseError::Empty);
    }

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(UnitParseError::Invalid(trimmed.to_string()));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(UnitParseError::Invalid(trimmed.to_string()));
    }
    if fraction.len() > 2 {
        return Err(UnitParseError::Precision(trimmed.to_string()));
    }

    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole
            .parse()
            .map_err(|_| UnitParseError::Overflow(trimmed.to_string()))?
    };
    let fraction: u64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<u64>().unwrap_or(0) * 10,
        _ => fraction.parse::<u64>().unwrap_or(0),
    };

    whole
        .checked_mul(100)
        .and_then(|value| value.checked_add(fraction))
        .ok_or_else(|| UnitParseError::Overflow(trimmed.to_string()))
}

fn write_hundredths(f: &mut Formatter<'_>, value: u64) -> std::fmt::Result {
    write!(f, "{}.{:02}", value / 100, value % 100)
}

/// A length in millimeters, stored as hundredths of a millimeter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Millimeters(u64);

impl Millimeters {
    pub fn from_hundredths(value: u64) -> Self {
        Self(value)
    }

    pub fn whole(mm: u64) -> Self {
        Self(mm.saturating_mul(100))
    }

    pub fn hundredths(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl FromStr for Millimeters {
    type Err = UnitParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        parse_hundredths(raw).map(Self)
    }
}

impl Display for Millimeters {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write_hundredths(f, self.0)
    }
}

impl TryFrom<String> for Millimeters {
    type Error = UnitParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Millimeters> for String {
    fn from(value: Millimeters) -> Self {
        value.to_string()
    }
}

/// A currency amount, stored in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> u64 {
        self.0
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }
}

impl FromStr for Money {
    type Err = UnitParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        parse_hundredths(raw).map(Self)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write_hundredths(f, self.0)
    }
}

impl TryFrom<String> for Money {
    type Error = UnitParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Money> for String {
    fn from(value: Money) -> Self {
        value.to_string()
    }
}
