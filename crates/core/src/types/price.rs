//! Type-safe price representation using decimal arithmetic.
//!
//! All prices are Indonesian rupiah in the currency's standard unit.
//! Arithmetic is checked: totals that overflow, or that won't fit the
//! `NUMERIC(14, 2)` price columns, are reported as [`PriceError`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Price arithmetic or range failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("price arithmetic overflowed")]
    Overflow,

    #[error("price exceeds the maximum of {}", Price::MAX.display())]
    TooLarge,
}

/// A unit or total price in rupiah.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(transparent))]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero rupiah.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest amount a `NUMERIC(14, 2)` column holds: 999 999 999 999.99.
    pub const MAX: Self = Self(Decimal::from_parts(0x107A_3FFF, 0x5AF3, 0, false, 2));

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole rupiah amount.
    #[must_use]
    pub fn from_rupiah(amount: i64) -> Self {
        Self(Decimal::from(amount))
    }

    /// Whether the price is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Return `self` if it fits the storage columns.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::TooLarge` if the magnitude is above [`Price::MAX`].
    pub fn storable(self) -> Result<Self, PriceError> {
        if self.0.abs() > Self::MAX.0 {
            return Err(PriceError::TooLarge);
        }
        Ok(self)
    }

    /// Price of `qty` units at this unit price.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Overflow` if the product overflows and
    /// `PriceError::TooLarge` if it won't fit the storage columns.
    pub fn times(self, qty: i32) -> Result<Self, PriceError> {
        self.0
            .checked_mul(Decimal::from(qty))
            .map(Self)
            .ok_or(PriceError::Overflow)?
            .storable()
    }

    /// Sum of `prices`.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Overflow` if the sum overflows and
    /// `PriceError::TooLarge` if it won't fit the storage columns.
    pub fn total<I>(prices: I) -> Result<Self, PriceError>
    where
        I: IntoIterator<Item = Self>,
    {
        prices
            .into_iter()
            .try_fold(Self::ZERO, |acc, price| {
                acc.0
                    .checked_add(price.0)
                    .map(Self)
                    .ok_or(PriceError::Overflow)
            })?
            .storable()
    }

    /// Format for display (e.g., "Rp 15000").
    #[must_use]
    pub fn display(&self) -> String {
        format!("Rp {}", self.0.normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_times_and_total() {
        let lines = [
            Price::from_rupiah(15_000).times(2),
            Price::from_rupiah(5_000).times(3),
        ];
        let total = Price::total(lines.into_iter().map(|line| line.unwrap_or_default()));
        assert_eq!(total, Ok(Price::from_rupiah(45_000)));
    }

    #[test]
    fn test_times_overflow_is_an_error() {
        assert_eq!(
            Price::new(Decimal::MAX).times(2),
            Err(PriceError::Overflow)
        );
    }

    #[test]
    fn test_total_overflow_is_an_error() {
        assert_eq!(
            Price::total([Price::new(Decimal::MAX), Price::new(Decimal::MAX)]),
            Err(PriceError::Overflow)
        );
    }

    #[test]
    fn test_storable_range() {
        assert_eq!(Price::MAX.display(), "Rp 999999999999.99");
        assert_eq!(Price::MAX.storable(), Ok(Price::MAX));
        assert_eq!(
            Price::from_rupiah(1_000_000_000_000).storable(),
            Err(PriceError::TooLarge)
        );
        assert_eq!(
            Price::from_rupiah(600_000_000_000).times(2),
            Err(PriceError::TooLarge)
        );
    }

    #[test]
    fn test_is_negative() {
        assert!(Price::from_rupiah(-1).is_negative());
        assert!(!Price::ZERO.is_negative());
        assert!(!Price::from_rupiah(10).is_negative());
    }

    #[test]
    fn test_deserializes_from_number_or_string() {
        let from_number: Price = serde_json::from_str("15000").unwrap_or_default();
        let from_string: Price = serde_json::from_str("\"15000\"").unwrap_or_default();
        assert_eq!(from_number, Price::from_rupiah(15_000));
        assert_eq!(from_string, Price::from_rupiah(15_000));
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::from_rupiah(25_000).display(), "Rp 25000");
    }
}
