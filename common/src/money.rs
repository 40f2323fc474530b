//! [`Money`]-related definitions.

use std::{fmt, iter, ops, str::FromStr};

use derive_more::{Add, AddAssign, From, Into, Sub};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Amount of money in the dealership currency.
///
/// Backed by a [`Decimal`], so sums and products never accumulate binary
/// floating-point error.
#[derive(
    Add,
    AddAssign,
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    From,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Sub,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Money(Decimal);

impl Money {
    /// Zero amount of [`Money`].
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Number of fractional digits [`Money`] is rounded to.
    pub const SCALE: u32 = 2;

    /// Creates a new [`Money`] amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Returns the amount of this [`Money`].
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Indicates whether this [`Money`] is zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Indicates whether this [`Money`] is below zero.
    #[must_use]
    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Rounds this [`Money`] to whole cents, half away from zero.
    #[must_use]
    pub fn round(self) -> Self {
        Self(
            self.0.round_dp_with_strategy(
                Self::SCALE,
                RoundingStrategy::MidpointAwayFromZero,
            ),
        )
    }
}

impl ops::Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl ops::Div<Decimal> for Money {
    type Output = Self;

    fn div(self, rhs: Decimal) -> Self::Output {
        Self(self.0 / rhs)
    }
}

impl iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, m| acc + m)
    }
}

impl<'a> iter::Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl From<u32> for Money {
    fn from(amount: u32) -> Self {
        Self(amount.into())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl FromStr for Money {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix('$').unwrap_or(s);
        if s.is_empty() {
            return Err("empty amount");
        }

        Decimal::from_str_exact(s)
            .map(Self)
            .map_err(|_| "invalid amount")
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::Money;

    fn money(s: &str) -> Money {
        Money::new(s.parse::<Decimal>().unwrap())
    }

    #[test]
    fn from_str() {
        assert_eq!(Money::from_str("123.45").unwrap(), money("123.45"));
        assert_eq!(Money::from_str("$30000").unwrap(), money("30000"));
        assert_eq!(Money::from_str("-5").unwrap(), money("-5"));

        assert!(Money::from_str("").is_err());
        assert!(Money::from_str("$").is_err());
        assert!(Money::from_str("12USD").is_err());
        assert!(Money::from_str("1.2.3").is_err());
    }

    #[test]
    fn to_string() {
        assert_eq!(money("123.45").to_string(), "123.45");
        assert_eq!(money("123.00").to_string(), "123");
        assert_eq!(money("123.0").to_string(), "123");
        assert_eq!(money("123.50").to_string(), "123.5");
        assert_eq!(money("123").to_string(), "123");
    }

    #[test]
    fn rounds_to_cents() {
        assert_eq!(money("732.55199").round(), money("732.55"));
        assert_eq!(money("0.005").round(), money("0.01"));
        assert_eq!(money("-0.005").round(), money("-0.01"));
        assert_eq!(money("10").round(), money("10"));
    }

    #[test]
    fn sums_without_drift() {
        let total: Money =
            std::iter::repeat(money("0.1")).take(10).sum();

        assert_eq!(total, money("1"));
    }

    #[test]
    fn detects_sign() {
        assert!(money("-0.01").is_negative());
        assert!(!money("0").is_negative());
        assert!(!money("0.01").is_negative());
        assert!(Money::ZERO.is_zero());
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&money("99.90")).unwrap();
        assert_eq!(json, "\"99.9\"");

        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, money("99.9"));
    }
}
