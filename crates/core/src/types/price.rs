//! Type-safe price representation using decimal arithmetic.
//!
//! The backend prices everything in a single store currency, so a price is
//! just a decimal amount. Amounts are never represented as floats.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price in the store currency.
///
/// Deserializes from either a JSON string (`"1299.00"`) or a JSON number
/// (`1299.0`), since the backend's serializer emits plain numbers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from an amount in cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Returns the decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns the price of `quantity` units.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// Formats with thousands separators and at most two decimals, dropping
/// trailing zeros: `1299.50` renders as `1,299.5`, `1500.00` as `1,500`.
impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.0.round_dp(2).normalize();
        let digits = rounded.abs().to_string();
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((int_part, frac_part)) => (int_part, Some(frac_part)),
            None => (digits.as_str(), None),
        };

        if rounded.is_sign_negative() && !rounded.is_zero() {
            f.write_str("-")?;
        }

        let len = int_part.len();
        for (i, c) in int_part.chars().enumerate() {
            if i > 0 && (len - i) % 3 == 0 {
                f.write_str(",")?;
            }
            write!(f, "{c}")?;
        }

        if let Some(frac_part) = frac_part {
            write!(f, ".{frac_part}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn price(s: &str) -> Price {
        Price::new(Decimal::from_str(s).unwrap())
    }

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(price("1299.00").to_string(), "1,299");
        assert_eq!(price("1234567.5").to_string(), "1,234,567.5");
        assert_eq!(price("999").to_string(), "999");
        assert_eq!(price("0").to_string(), "0");
    }

    #[test]
    fn test_display_rounds_to_two_decimals() {
        assert_eq!(price("10.456").to_string(), "10.46");
        assert_eq!(price("-1500.10").to_string(), "-1,500.1");
    }

    #[test]
    fn test_times_and_sum() {
        let total: Price = [price("100.50").times(2), price("9.99").times(3)]
            .into_iter()
            .sum();
        assert_eq!(total, price("230.97"));
    }

    #[test]
    fn test_from_cents() {
        assert_eq!(Price::from_cents(129_950), price("1299.50"));
    }

    #[test]
    fn test_deserialize_number_and_string() {
        let from_number: Price = serde_json::from_str("1299.5").unwrap();
        let from_string: Price = serde_json::from_str("\"1299.50\"").unwrap();
        assert_eq!(from_number, from_string);
    }
}
