//! Amount type for non-negative monetary values.
//!
//! Amounts are stored as JSON numbers. When parsed from text they may carry a leading dollar sign
//! and thousands separators. Amounts are kept to the cent.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Represents a non-negative dollar amount.
///
/// `Display` writes the plain number with no trailing zeros, which is how amounts appear in CSV
/// exports. Use [`Amount::currency`] for a human-readable `$1,234.50` form.
///
/// ```
/// # use hotelflow::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("$1,000.00").unwrap();
/// assert_eq!(amount.to_string(), "1000");
/// assert_eq!(amount.currency(), "$1,000.00");
/// assert!(Amount::from_str("-5").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Creates an amount, rejecting negative values. The value is rounded to two decimal places.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative(value));
        }
        Ok(Self(value.round_dp(2).normalize()))
    }

    /// Adds two amounts, returning `None` if the sum cannot be represented.
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(|sum| Amount(sum.normalize()))
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Formats the amount as dollars with thousands separators and two decimal places.
    pub fn currency(&self) -> String {
        currency(self.0)
    }
}

/// Formats any decimal (including a negative balance) as `$1,234.50` or `-$1,234.50`.
pub fn currency(value: Decimal) -> String {
    let sign = if value.is_sign_negative() && !value.is_zero() {
        "-"
    } else {
        ""
    };
    let abs = value.abs().round_dp(2).to_f64().unwrap_or_default();
    format!("{sign}${}", format_num::format_num!(",.2", abs))
}

/// An error that can occur when creating or parsing an `Amount`.
#[derive(Debug, Clone, PartialEq)]
pub enum AmountError {
    Negative(Decimal),
    Parse(rust_decimal::Error),
    NotFinite,
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Negative(value) => write!(f, "Amount cannot be negative: {value}"),
            AmountError::Parse(e) => Display::fmt(e, f),
            AmountError::NotFinite => f.write_str("Amount must be a finite number"),
        }
    }
}

impl std::error::Error for AmountError {}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Amount::ZERO);
        }
        let without_dollar = trimmed.strip_prefix('$').unwrap_or(trimmed);
        let without_commas = without_dollar.replace(',', "");
        let value = Decimal::from_str(&without_commas).map_err(AmountError::Parse)?;
        Amount::new(value)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Whole amounts are written as integers so `1000` stays `1000` on a round trip.
        if self.0.fract().is_zero() {
            if let Some(i) = self.0.to_i64() {
                return serializer.serialize_i64(i);
            }
        }
        // A float is only written when it reads back as the same amount. Otherwise the exact
        // decimal text is written as a string.
        if let Some(f) = self.0.to_f64() {
            if Decimal::from_f64(f).map(|d| d.round_dp(2).normalize()) == Some(self.0) {
                return serializer.serialize_f64(f);
            }
        }
        serializer.serialize_str(&self.0.to_string())
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative number")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Amount::new(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Amount::new(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        let value = Decimal::from_f64(v).ok_or_else(|| E::custom(AmountError::NotFinite))?;
        Amount::new(value).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Amount::from_str(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}
