//! Monetary amounts in integer minor units.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Neg, Sub};

/// Minor units per whole currency unit.
pub const MINOR_PER_UNIT: i64 = 100;

/// An exact monetary amount stored as minor units (1/100 of a unit).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    pub const fn from_whole(units: i64) -> Self {
        Self(units * MINOR_PER_UNIT)
    }

    pub const fn minor(&self) -> i64 {
        self.0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Whole currency units, rounding half away from zero.
    ///
    /// `2.50 → 3`, `2.49 → 2`, `-2.50 → -3`.
    pub fn whole_units(&self) -> i64 {
        let quotient = self.0 / MINOR_PER_UNIT;
        let remainder = self.0 % MINOR_PER_UNIT;
        if remainder.abs() * 2 >= MINOR_PER_UNIT {
            quotient + self.0.signum()
        } else {
            quotient
        }
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// `max(self, 0)`.
    pub fn clamp_non_negative(self) -> Money {
        Money(self.0.max(0))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(self.0.saturating_neg())
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(
            f,
            "{}{}.{:02}",
            sign,
            abs / MINOR_PER_UNIT as u64,
            abs % MINOR_PER_UNIT as u64
        )
    }
}
