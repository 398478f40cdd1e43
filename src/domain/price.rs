//! Monetary amount with a fixed text encoding: `"8.25 USD"`.
//!
//! Amounts are held as whole cents so the two-decimal precision is exact. On the
//! wire a price is always a JSON string; a bare number is a format error.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Unit suffix written by the encoder.
pub const CURRENCY: &str = "USD";

/// Largest amount in cents that fits the `NUMERIC(12, 2)` column.
pub const MAX_CENTS: i64 = 999_999_999_999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid price format")]
pub struct PriceFormatError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price {
    cents: i64,
}

impl Price {
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    pub fn cents(self) -> i64 {
        self.cents
    }

    pub fn is_zero(self) -> bool {
        self.cents == 0
    }

    pub fn is_positive(self) -> bool {
        self.cents > 0
    }

    /// Rounds `amount` to the nearest cent. Non-finite or out-of-range amounts are rejected.
    pub fn from_amount(amount: f64) -> Result<Self, PriceFormatError> {
        if !amount.is_finite() {
            return Err(PriceFormatError);
        }
        let cents = (amount * 100.0).round();
        if cents.abs() > MAX_CENTS as f64 {
            return Err(PriceFormatError);
        }
        Ok(Self {
            cents: cents as i64,
        })
    }
}

/// Unquoted text form, e.g. `8.25 USD`.
impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.cents < 0 { "-" } else { "" };
        let abs = self.cents.unsigned_abs();
        write!(f, "{}{}.{:02} {}", sign, abs / 100, abs % 100, CURRENCY)
    }
}

/// Parses the unquoted text form: exactly two tokens separated by a single space.
/// The unit token is positional only and its content is not checked.
impl FromStr for Price {
    type Err = PriceFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(' ').collect();
        if parts.len() != 2 {
            return Err(PriceFormatError);
        }
        let amount: f64 = parts[0].parse().map_err(|_| PriceFormatError)?;
        Price::from_amount(amount)
    }
}

/// Encodes `price` as a quoted JSON string literal.
pub fn encode(price: Price) -> String {
    format!("\"{}\"", price)
}

/// Decodes a quoted JSON string literal produced by [`encode`].
pub fn decode(text: &str) -> Result<Price, PriceFormatError> {
    let unquoted: String = serde_json::from_str(text).map_err(|_| PriceFormatError)?;
    unquoted.parse()
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct PriceVisitor;

impl<'de> Visitor<'de> for PriceVisitor {
    type Value = Price;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a price string such as \"8.25 USD\"")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Price, E> {
        v.parse().map_err(E::custom)
    }

    // Everything that is not a string gets the same error as a bad string.
    fn visit_i64<E: de::Error>(self, _: i64) -> Result<Price, E> {
        Err(E::custom(PriceFormatError))
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<Price, E> {
        Err(E::custom(PriceFormatError))
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<Price, E> {
        Err(E::custom(PriceFormatError))
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Price, E> {
        Err(E::custom(PriceFormatError))
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PriceVisitor)
    }
}
