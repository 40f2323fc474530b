//! Buyer [`Preferences`] for matching [`Vehicle`]s.

use std::collections::HashSet;

use common::Money;
use serde::{Deserialize, Serialize};

use super::{FuelType, Make, Mileage, Vehicle, Year};

/// Criteria a buyer expects from a [`Vehicle`].
///
/// Every criterion is optional and all the set ones must hold for a
/// [`Vehicle`] to match. Empty sets impose no constraint.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Preferences {
    /// Lowest acceptable price.
    pub min_price: Option<Money>,

    /// Highest acceptable price.
    pub max_price: Option<Money>,

    /// Earliest acceptable model [`Year`].
    pub min_year: Option<Year>,

    /// Latest acceptable model [`Year`].
    pub max_year: Option<Year>,

    /// Highest acceptable [`Mileage`].
    pub max_mileage: Option<Mileage>,

    /// Acceptable [`Make`]s.
    pub makes: HashSet<Make>,

    /// Acceptable [`FuelType`]s.
    pub fuel_types: HashSet<FuelType>,
}

impl Preferences {
    /// Checks that no bound of these [`Preferences`] is negative and no lower
    /// bound exceeds its upper one.
    ///
    /// # Errors
    ///
    /// Returns the name of the first inconsistent criterion.
    pub fn validate(&self) -> Result<(), &'static str> {
        fn ordered<T: PartialOrd>(min: Option<&T>, max: Option<&T>) -> bool {
            min.zip(max).is_none_or(|(min, max)| min <= max)
        }

        let negative = [self.min_price, self.max_price]
            .into_iter()
            .flatten()
            .any(Money::is_negative);
        if negative
            || !ordered(self.min_price.as_ref(), self.max_price.as_ref())
        {
            return Err("price");
        }
        if !ordered(self.min_year.as_ref(), self.max_year.as_ref()) {
            return Err("year");
        }
        Ok(())
    }

    /// Treats zero bounds as unset.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.min_price = self.min_price.filter(|p| !p.is_zero());
        self.max_price = self.max_price.filter(|p| !p.is_zero());
        self.max_mileage = self.max_mileage.filter(|m| *m != Mileage::default());
        self
    }

    /// Indicates whether the provided [`Vehicle`] satisfies these
    /// [`Preferences`].
    #[must_use]
    pub fn matches(&self, vehicle: &Vehicle) -> bool {
        self.min_price.is_none_or(|min| vehicle.price >= min)
            && self.max_price.is_none_or(|max| vehicle.price <= max)
            && self.min_year.is_none_or(|min| vehicle.year >= min)
            && self.max_year.is_none_or(|max| vehicle.year <= max)
            && self.max_mileage.is_none_or(|max| vehicle.mileage <= max)
            && (self.makes.is_empty() || self.makes.contains(&vehicle.make))
            && (self.fuel_types.is_empty()
                || vehicle
                    .fuel_type
                    .as_ref()
                    .is_some_and(|f| self.fuel_types.contains(f)))
    }

    /// Filters the provided [`Vehicle`]s matching these [`Preferences`],
    /// preserving their order.
    #[must_use]
    pub fn find_matches(
        &self,
        vehicles: impl IntoIterator<Item = Vehicle>,
    ) -> Vec<Vehicle> {
        vehicles.into_iter().filter(|v| self.matches(v)).collect()
    }
}

#[cfg(test)]
mod spec {
    use common::Money;

    use super::Preferences;
    use crate::domain::vehicle::{
        spec::vehicle, FuelType, Make, Mileage, Year,
    };

    #[test]
    fn empty_preferences_match_everything() {
        let prefs = Preferences::default();

        assert!(prefs.matches(&vehicle("Toyota", 1999, 1)));
        assert!(prefs.matches(&vehicle("Ford", 2024, 99_999)));
    }

    #[test]
    fn bounds_price_inclusively() {
        let prefs = Preferences {
            min_price: Some(Money::from(10_000)),
            max_price: Some(Money::from(20_000)),
            ..Preferences::default()
        };

        assert!(prefs.matches(&vehicle("Toyota", 2020, 10_000)));
        assert!(prefs.matches(&vehicle("Toyota", 2020, 20_000)));
        assert!(!prefs.matches(&vehicle("Toyota", 2020, 9_999)));
        assert!(!prefs.matches(&vehicle("Toyota", 2020, 20_001)));
    }

    #[test]
    fn bounds_year_and_mileage() {
        let prefs = Preferences {
            min_year: Year::new(2018),
            max_year: Year::new(2022),
            max_mileage: Mileage::new(10_000),
            ..Preferences::default()
        };

        assert!(prefs.matches(&vehicle("Toyota", 2018, 1)));
        assert!(!prefs.matches(&vehicle("Toyota", 2017, 1)));
        assert!(!prefs.matches(&vehicle("Toyota", 2023, 1)));

        let mut v = vehicle("Toyota", 2020, 1);
        v.mileage = Mileage::new(10_001).unwrap();
        assert!(!prefs.matches(&v));
    }

    #[test]
    fn filters_by_makes_and_fuel() {
        let prefs = Preferences {
            makes: [Make::new("Honda").unwrap()].into(),
            fuel_types: [FuelType::new("Hybrid").unwrap()].into(),
            ..Preferences::default()
        };

        let mut honda = vehicle("Honda", 2020, 1);
        assert!(!prefs.matches(&honda), "unknown fuel type");

        honda.fuel_type = FuelType::new("Hybrid");
        assert!(prefs.matches(&honda));

        let mut toyota = vehicle("Toyota", 2020, 1);
        toyota.fuel_type = FuelType::new("Hybrid");
        assert!(!prefs.matches(&toyota));
    }

    #[test]
    fn finds_matches_in_order() {
        let prefs = Preferences {
            max_price: Some(Money::from(20_000)),
            ..Preferences::default()
        };
        let vehicles = vec![
            vehicle("A", 2020, 30_000),
            vehicle("B", 2020, 15_000),
            vehicle("C", 2020, 40_000),
            vehicle("D", 2020, 5_000),
        ];

        let makes: Vec<_> = prefs
            .find_matches(vehicles)
            .into_iter()
            .map(|v| v.make.to_string())
            .collect();

        assert_eq!(makes, ["B", "D"]);
    }

    #[test]
    fn treats_zeroes_as_unset() {
        let prefs = Preferences {
            min_price: Some(Money::ZERO),
            max_price: Some(Money::ZERO),
            max_mileage: Mileage::new(0),
            ..Preferences::default()
        }
        .normalized();

        assert_eq!(prefs, Preferences::default());
        assert!(prefs.matches(&vehicle("Toyota", 2020, 50_000)));
    }

    #[test]
    fn validates_bounds() {
        let prefs = Preferences {
            min_price: Some(Money::from(2)),
            max_price: Some(Money::from(1)),
            ..Preferences::default()
        };
        assert_eq!(prefs.validate(), Err("price"));

        let prefs = Preferences {
            min_year: Year::new(2022),
            max_year: Year::new(2020),
            ..Preferences::default()
        };
        assert_eq!(prefs.validate(), Err("year"));

        let prefs = Preferences {
            min_price: Some("-5".parse().unwrap()),
            ..Preferences::default()
        };
        assert_eq!(prefs.validate(), Err("price"));

        let prefs = Preferences {
            min_price: Some("-10".parse().unwrap()),
            max_price: Some("-1".parse().unwrap()),
            ..Preferences::default()
        };
        assert_eq!(prefs.validate(), Err("price"));

        assert_eq!(Preferences::default().validate(), Ok(()));
    }
}
