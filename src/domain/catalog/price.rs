//! Fixed-point price value type.
//!
//! Prices carry exactly two decimal places and are stored as minor units
//! (cents) so equality and arithmetic never go through floating point. The
//! serde representation is a decimal string (`"20.00"`); deserialisation also
//! accepts JSON numbers for client convenience.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Largest representable amount in minor units (five significant digits,
/// matching the storage column: 999.99).
pub const PRICE_MAX_MINOR_UNITS: i64 = 99_999;

/// Errors returned when constructing a [`Price`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceError {
    #[error("price must not be negative")]
    Negative,
    #[error("price must be at most 999.99")]
    TooLarge,
    #[error("price must be a decimal number with at most two decimal places")]
    Malformed,
}

/// Non-negative money amount with two-decimal precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "PriceDto", into = "String")]
pub struct Price(i64);

impl Price {
    /// Construct from minor units (cents).
    pub fn from_minor_units(minor_units: i64) -> Result<Self, PriceError> {
        if minor_units < 0 {
            return Err(PriceError::Negative);
        }
        if minor_units > PRICE_MAX_MINOR_UNITS {
            return Err(PriceError::TooLarge);
        }
        Ok(Self(minor_units))
    }

    /// The amount in minor units (cents).
    pub fn minor_units(self) -> i64 {
        self.0
    }

    /// Parse a decimal string such as `"20.00"`, `"7.5"`, or `"5"`.
    pub fn parse(raw: &str) -> Result<Self, PriceError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(PriceError::Malformed);
        }
        if let Some(rest) = raw.strip_prefix('-') {
            // Distinguish "-5" from junk like "-".
            if rest.chars().next().is_some_and(|c| c.is_ascii_digit()) {
                return Err(PriceError::Negative);
            }
            return Err(PriceError::Malformed);
        }

        let (whole, frac) = match raw.split_once('.') {
            Some((_, "")) => return Err(PriceError::Malformed),
            Some((whole, frac)) => (whole, frac),
            None => (raw, ""),
        };
        if whole.is_empty() || frac.len() > 2 {
            return Err(PriceError::Malformed);
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(PriceError::Malformed);
        }

        let whole: i64 = whole.parse().map_err(|_| PriceError::TooLarge)?;
        let cents: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| PriceError::Malformed)? * 10,
            _ => frac.parse().map_err(|_| PriceError::Malformed)?,
        };

        whole
            .checked_mul(100)
            .and_then(|minor| minor.checked_add(cents))
            .ok_or(PriceError::TooLarge)
            .and_then(Self::from_minor_units)
    }

    fn from_f64(value: f64) -> Result<Self, PriceError> {
        if !value.is_finite() {
            return Err(PriceError::Malformed);
        }
        if value < 0.0 {
            return Err(PriceError::Negative);
        }
        let scaled = value * 100.0;
        let rounded = scaled.round();
        // Reject amounts that need more than two decimals rather than
        // silently rounding them away.
        if (scaled - rounded).abs() > 1e-6 {
            return Err(PriceError::Malformed);
        }
        if rounded > PRICE_MAX_MINOR_UNITS as f64 {
            return Err(PriceError::TooLarge);
        }
        Self::from_minor_units(rounded as i64)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl From<Price> for String {
    fn from(value: Price) -> Self {
        value.to_string()
    }
}

/// Accept either a decimal string or a JSON number on the wire.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PriceDto {
    Text(String),
    Number(f64),
}

impl TryFrom<PriceDto> for Price {
    type Error = PriceError;

    fn try_from(value: PriceDto) -> Result<Self, Self::Error> {
        match value {
            PriceDto::Text(raw) => Self::parse(&raw),
            PriceDto::Number(value) => Self::from_f64(value),
        }
    }
}
