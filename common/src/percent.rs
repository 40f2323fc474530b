//! [`Percent`]-related definitions.

use std::str::FromStr;

use derive_more::Display;
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Decimal percentage in the `0..=100` range.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[display("{}%", _0.normalize())]
pub struct Percent(Decimal);

impl Percent {
    /// Zero [`Percent`].
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a new [`Percent`] by checking the provided value is not less
    /// than `0` and not greater than `100`.
    #[must_use]
    pub fn new(val: Decimal) -> Option<Self> {
        if val < Decimal::ZERO || val > Decimal::ONE_HUNDRED {
            None
        } else {
            Some(Self(val))
        }
    }

    /// Creates a new [`Percent`] from the provided amount of basis points
    /// (hundredths of a percent), so `350` is `3.5%`.
    ///
    /// [`None`] is returned if the amount exceeds `100%`.
    #[must_use]
    pub const fn from_basis_points(bps: u32) -> Option<Self> {
        if bps > 10_000 {
            None
        } else {
            Some(Self(Decimal::from_parts(bps, 0, 0, false, 2)))
        }
    }

    /// Returns the value of this [`Percent`], so `3.5%` is `3.5`.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }

    /// Returns this [`Percent`] as a fraction of one, so `3.5%` is `0.035`.
    #[must_use]
    pub fn fraction(self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }

    /// Adds the provided [`Percent`] to this one.
    ///
    /// [`None`] is returned if the sum exceeds `100%`.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        Self::new(self.0 + rhs.0)
    }
}

impl FromStr for Percent {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_suffix('%').unwrap_or(s);
        Decimal::from_str(s)
            .ok()
            .and_then(Self::new)
            .ok_or("invalid percent value")
    }
}

impl Serialize for Percent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0.normalize())
    }
}

impl<'de> Deserialize<'de> for Percent {
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

    use super::Percent;

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn checks_range() {
        assert!(Percent::new(decimal("-0.1")).is_none());
        assert!(Percent::new(decimal("100.01")).is_none());
        assert!(Percent::new(decimal("0")).is_some());
        assert!(Percent::new(decimal("100")).is_some());
    }

    #[test]
    fn from_basis_points() {
        assert_eq!(
            Percent::from_basis_points(350),
            Percent::new(decimal("3.5")),
        );
        assert_eq!(
            Percent::from_basis_points(10_000),
            Percent::new(decimal("100")),
        );
        assert_eq!(Percent::from_basis_points(10_001), None);
    }

    #[test]
    fn fraction() {
        let rate = Percent::from_str("3.5").unwrap();

        assert_eq!(rate.fraction(), decimal("0.035"));
    }

    #[test]
    fn to_string() {
        assert_eq!(Percent::from_basis_points(350).unwrap().to_string(), "3.5%");
        assert_eq!(Percent::from_basis_points(1500).unwrap().to_string(), "15%");
    }

    #[test]
    fn from_str() {
        assert_eq!(
            Percent::from_str("5.9%").unwrap(),
            Percent::new(decimal("5.9")).unwrap(),
        );
        assert!(Percent::from_str("abc").is_err());
        assert!(Percent::from_str("101").is_err());
    }

    #[test]
    fn checked_add() {
        let base = Percent::from_str("15").unwrap();
        let surcharge = Percent::from_str("1.5").unwrap();

        assert_eq!(
            base.checked_add(surcharge),
            Percent::new(decimal("16.5")),
        );
        assert_eq!(
            Percent::from_str("99.9")
                .unwrap()
                .checked_add(Percent::from_str("1").unwrap()),
            None,
        );
    }
}
