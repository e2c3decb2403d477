//! Type-safe price representation using decimal arithmetic.
//!
//! The catalog is single-currency, so a price is a non-negative decimal
//! amount in the store's currency unit. Arithmetic stays in `Decimal` so
//! cart totals never pick up float rounding.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when constructing a price from an invalid amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("price cannot be negative: {0}")]
    Negative(Decimal),
}

/// A non-negative unit or total price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// The zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// The largest representable price. Arithmetic saturates here.
    pub const MAX: Self = Self(Decimal::MAX);

    /// Create a new price.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if `amount` is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: u32) -> Self {
        Self(Decimal::new(i64::from(cents), 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units at this unit price, saturating at
    /// [`Price::MAX`].
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        self.0
            .checked_mul(Decimal::from(quantity))
            .map_or(Self::MAX, Self)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Add for Price {
    type Output = Self;

    /// Saturates at [`Price::MAX`].
    fn add(self, rhs: Self) -> Self::Output {
        self.0.checked_add(rhs.0).map_or(Self::MAX, Self)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// Formats as `$12.50`, always with two decimal places.
impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_negative_amounts() {
        let result = Price::new(Decimal::new(-1, 0));
        assert_eq!(result, Err(PriceError::Negative(Decimal::new(-1, 0))));
    }

    #[test]
    fn test_accepts_zero() {
        assert_eq!(Price::new(Decimal::ZERO).unwrap(), Price::ZERO);
    }

    #[test]
    fn test_display_uses_two_decimals() {
        assert_eq!(Price::from_cents(1050).to_string(), "$10.50");
        assert_eq!(Price::new(Decimal::new(20, 0)).unwrap().to_string(), "$20.00");
    }

    #[test]
    fn test_times_and_sum() {
        let unit = Price::from_cents(250);
        let total: Price = [unit.times(2), unit.times(3)].into_iter().sum();
        assert_eq!(total, Price::from_cents(1250));
    }

    #[test]
    fn test_arithmetic_saturates_instead_of_overflowing() {
        let huge = Price::new(Decimal::MAX / Decimal::TWO + Decimal::ONE).unwrap();
        assert_eq!(huge.times(2), Price::MAX);
        assert_eq!(huge + huge, Price::MAX);
        assert_eq!(Price::MAX + Price::from_cents(1), Price::MAX);
        assert_eq!(Price::from_cents(1).times(0), Price::ZERO);
    }

    #[test]
    fn test_deserialize_number_and_reject_negative() {
        let price: Price = serde_json::from_str("10.5").unwrap();
        assert_eq!(price, Price::from_cents(1050));

        assert!(serde_json::from_str::<Price>("-3").is_err());
    }
}
