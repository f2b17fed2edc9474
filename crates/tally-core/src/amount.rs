//! Fixed-point ledger amounts
//!
//! Values are whole base units held in a signed 64-bit integer. The type is
//! signed on purpose so that a transaction proposing a negative output can be
//! represented and then rejected. Sums across many values are taken in
//! `i128` so that adding up a transaction's inputs can never wrap.
//!
//! Fees are [`Fee`] values in `i128`. One transaction may spend several
//! outputs of `i64::MAX` each, so neither a single fee nor a round total fits
//! an [`Amount`]. Any fee is bounded by the value of the snapshot it was
//! collected from, which keeps fee sums inside `i128`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Amount of value in base units
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    /// The zero amount
    pub const ZERO: Amount = Amount(0);

    /// Wrap a raw unit count
    pub const fn from_units(units: i64) -> Self {
        Self(units)
    }

    /// Raw unit count
    pub const fn units(self) -> i64 {
        self.0
    }

    /// Whether this amount is below zero
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Narrow a wide sum back into an amount, `None` if it does not fit
    pub fn from_wide(units: i128) -> Option<Self> {
        i64::try_from(units).ok().map(Self)
    }

    /// Widen for overflow-free summation
    pub const fn wide(self) -> i128 {
        self.0 as i128
    }

    /// Checked addition
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Checked subtraction
    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl From<i64> for Amount {
    fn from(units: i64) -> Self {
        Self(units)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fee in base units: input value minus output value
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Fee(i128);

impl Fee {
    /// No fee
    pub const ZERO: Fee = Fee(0);

    /// Wrap a raw unit count
    pub const fn from_units(units: i128) -> Self {
        Self(units)
    }

    /// Raw unit count
    pub const fn units(self) -> i128 {
        self.0
    }
}

impl From<Amount> for Fee {
    fn from(amount: Amount) -> Self {
        Self(amount.wide())
    }
}

impl Add for Fee {
    type Output = Fee;

    fn add(self, other: Fee) -> Fee {
        Fee(self.0 + other.0)
    }
}

impl AddAssign for Fee {
    fn add_assign(&mut self, other: Fee) {
        self.0 += other.0;
    }
}

impl Sum for Fee {
    fn sum<I: Iterator<Item = Fee>>(iter: I) -> Fee {
        iter.fold(Fee::ZERO, Add::add)
    }
}

impl fmt::Display for Fee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wide sum of a sequence of amounts
pub fn wide_sum<I: IntoIterator<Item = Amount>>(amounts: I) -> i128 {
    amounts.into_iter().map(Amount::wide).sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn wide_sum_does_not_wrap() {
        let total = wide_sum([Amount::from_units(i64::MAX), Amount::from_units(i64::MAX)]);
        assert_eq!(total, 2 * i64::MAX as i128);
        assert_eq!(Amount::from_wide(total), None);
    }

    #[test]
    fn narrowing_round_trips_in_range() {
        assert_eq!(Amount::from_wide(-7), Some(Amount::from_units(-7)));
        assert!(Amount::from_units(-1).is_negative());
        assert!(!Amount::ZERO.is_negative());
    }

    #[test]
    fn checked_ops() {
        assert_eq!(Amount::from_units(i64::MAX).checked_add(Amount::from_units(1)), None);
        assert_eq!(
            Amount::from_units(10).checked_sub(Amount::from_units(3)),
            Some(Amount::from_units(7))
        );
    }

    #[test]
    fn fees_beyond_amount_range_add_up() {
        let max = Fee::from(Amount::from_units(i64::MAX));
        let total: Fee = [max, max, Fee::from_units(1)].into_iter().sum();
        assert_eq!(total.units(), 2 * i64::MAX as i128 + 1);
        assert!(total > max);
    }

    #[test]
    fn serializes_as_plain_integer() {
        let json = serde_json::to_string(&Amount::from_units(42)).unwrap();
        assert_eq!(json, "42");
    }
}
