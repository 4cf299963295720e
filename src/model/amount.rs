//! Amount type for whole-unit money values.
//!
//! Household amounts are recorded in whole currency units (no minor units), so `Amount` wraps a
//! `u64`. Display groups thousands with commas and never includes a currency symbol; callers
//! prepend one when rendering.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::num::ParseIntError;
use std::str::FromStr;

/// Represents a non-negative, whole-unit amount of money.
///
/// # Examples
///
/// ```
/// # use kakeibo::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("1,200").unwrap();
/// assert_eq!(amount.value(), 1200);
/// assert_eq!(amount.to_string(), "1,200");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying whole-unit value.
    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// The value as a signed number, for balance arithmetic. Saturates at `i64::MAX`.
    pub fn signed(&self) -> i64 {
        i64::try_from(self.0).unwrap_or(i64::MAX)
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(ParseIntError);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        // Handle empty string
        if trimmed.is_empty() {
            return Ok(Amount::default());
        }

        // Remove commas (thousand separators)
        let without_commas = trimmed.replace(',', "");
        let value = u64::from_str(&without_commas).map_err(AmountError)?;
        Ok(Amount(value))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", group_thousands(self.signed()))
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount(value)
    }
}

impl From<Amount> for u64 {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

const MILLION: u64 = 1_000_000;

/// Formats a signed whole-unit value with comma thousands separators, e.g. `-1,200`. Exact over
/// the whole `i64` range.
pub fn group_thousands(value: i64) -> String {
    let sign = if value < 0 { "-" } else { "" };
    let magnitude = value.unsigned_abs();
    let (high, low) = (magnitude / MILLION, magnitude % MILLION);
    if high == 0 {
        return format!("{sign}{}", format_num::format_num!(",.0f", low as f64));
    }
    // `high` stays below 2^53, so the f64 round trip is exact; the low six digits are padded.
    format!(
        "{sign}{},{:03},{:03}",
        format_num::format_num!(",.0f", high as f64),
        low / 1000,
        low % 1000
    )
}
