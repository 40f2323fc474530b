//! [`Vehicle`] definitions.

pub mod preferences;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, define_text, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use self::preferences::Preferences;

/// Vehicle in the dealership inventory.
#[derive(Clone, Debug, Serialize)]
pub struct Vehicle {
    /// ID of this [`Vehicle`].
    pub id: Id,

    /// [`Vin`] of this [`Vehicle`].
    pub vin: Vin,

    /// [`Make`] of this [`Vehicle`].
    pub make: Make,

    /// [`Model`] of this [`Vehicle`].
    pub model: Model,

    /// [`Year`] this [`Vehicle`] was manufactured in.
    pub year: Year,

    /// [`Color`] of this [`Vehicle`].
    pub color: Color,

    /// [`Mileage`] of this [`Vehicle`].
    pub mileage: Mileage,

    /// Asking price of this [`Vehicle`].
    pub price: Money,

    /// Current [`Status`] of this [`Vehicle`].
    pub status: Status,

    /// [`EngineType`] of this [`Vehicle`], if known.
    pub engine_type: Option<EngineType>,

    /// [`Transmission`] of this [`Vehicle`], if known.
    pub transmission: Option<Transmission>,

    /// [`FuelType`] of this [`Vehicle`], if known.
    pub fuel_type: Option<FuelType>,

    /// [`DateTime`] when this [`Vehicle`] was added to the inventory.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Vehicle`] was last modified.
    pub updated_at: ModificationDateTime,
}

impl Vehicle {
    /// Returns the age of this [`Vehicle`] in whole years at the provided
    /// `current_year`.
    #[must_use]
    pub fn age_in(&self, current_year: i32) -> i32 {
        current_year - i32::from(self.year.0)
    }
}

/// ID of a [`Vehicle`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_text! {
    #[doc = "Manufacturer of a [`Vehicle`]."]
    struct Make(max_len = 64);
}

define_text! {
    #[doc = "Model name of a [`Vehicle`]."]
    struct Model(max_len = 64);
}

define_text! {
    #[doc = "Exterior color of a [`Vehicle`]."]
    struct Color(max_len = 32);
}

define_text! {
    #[doc = "Engine description of a [`Vehicle`]."]
    struct EngineType(max_len = 64);
}

define_text! {
    #[doc = "Transmission kind of a [`Vehicle`]."]
    struct Transmission(max_len = 32);
}

define_text! {
    #[doc = "Fuel a [`Vehicle`] runs on."]
    struct FuelType(max_len = 32);
}

/// [Vehicle Identification Number][1] of a [`Vehicle`].
///
/// [1]: https://en.wikipedia.org/wiki/Vehicle_identification_number
#[derive(
    AsRef,
    Clone,
    Debug,
    Deserialize,
    Display,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
#[as_ref(forward)]
#[serde(try_from = "String")]
pub struct Vin(String);

impl Vin {
    /// Creates a new [`Vin`] if the given `vin` is valid.
    ///
    /// Lowercase letters are uppercased.
    #[must_use]
    pub fn new(vin: impl AsRef<str>) -> Option<Self> {
        let vin = vin.as_ref().to_ascii_uppercase();
        Self::check(&vin).then_some(Self(vin))
    }

    /// Checks whether the given `vin` is 17 characters long and contains no
    /// `I`, `O` or `Q`, as these are mistaken for digits.
    fn check(vin: &str) -> bool {
        vin.len() == 17
            && vin.bytes().all(|b| {
                b.is_ascii_digit()
                    || (b.is_ascii_uppercase() && !matches!(b, b'I' | b'O' | b'Q'))
            })
    }
}

impl std::str::FromStr for Vin {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid VIN")
    }
}

impl TryFrom<String> for Vin {
    type Error = &'static str;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Model year of a [`Vehicle`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
#[serde(try_from = "i16")]
pub struct Year(i16);

impl Year {
    /// Earliest accepted [`Year`].
    pub const MIN: Self = Self(1886);

    /// Creates a new [`Year`] if the provided value is not earlier than
    /// [`Year::MIN`].
    #[must_use]
    pub const fn new(year: i16) -> Option<Self> {
        if year < Self::MIN.0 {
            None
        } else {
            Some(Self(year))
        }
    }

    /// Returns the numeric value of this [`Year`].
    #[must_use]
    pub const fn value(self) -> i16 {
        self.0
    }
}

impl std::str::FromStr for Year {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i16>()
            .map_err(|_| "year must be an integer")?
            .try_into()
    }
}

impl TryFrom<i16> for Year {
    type Error = &'static str;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or("year must be 1886 or later")
    }
}

/// Odometer reading of a [`Vehicle`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
#[serde(try_from = "i32")]
pub struct Mileage(i32);

impl Mileage {
    /// Creates a new [`Mileage`] if the provided value is not negative.
    #[must_use]
    pub const fn new(mileage: i32) -> Option<Self> {
        if mileage < 0 {
            None
        } else {
            Some(Self(mileage))
        }
    }
}

impl std::str::FromStr for Mileage {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i32>()
            .map_err(|_| "mileage must be an integer")?
            .try_into()
    }
}

impl TryFrom<i32> for Mileage {
    type Error = &'static str;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or("mileage cannot be negative")
    }
}

define_kind! {
    #[doc = "Status of a [`Vehicle`] in the inventory."]
    enum Status {
        #[doc = "[`Vehicle`] may be reserved or sold."]
        Available = 1,

        #[doc = "[`Vehicle`] is held for a customer."]
        Reserved = 2,

        #[doc = "[`Vehicle`] is sold and cannot be sold again."]
        Sold = 3,

        #[doc = "[`Vehicle`] is being serviced."]
        Maintenance = 4,

        #[doc = "[`Vehicle`] awaits an external decision."]
        Pending = 5,
    }
}

impl Status {
    /// Indicates whether a [`Vehicle`] in this [`Status`] may be reserved.
    #[must_use]
    pub const fn is_reservable(self) -> bool {
        matches!(self, Self::Available)
    }

    /// Indicates whether a [`Vehicle`] in this [`Status`] may enter a sale.
    #[must_use]
    pub const fn is_sellable(self) -> bool {
        matches!(self, Self::Available | Self::Reserved)
    }
}

/// Guarded change of a [`Vehicle`]'s [`Status`].
///
/// Applied only if the [`Vehicle`] is still in one of the [`from`] statuses
/// at the moment of the write, so concurrent changes cannot overwrite each
/// other.
///
/// [`from`]: StatusTransition::from
#[derive(Clone, Debug)]
pub struct StatusTransition {
    /// ID of the [`Vehicle`] to change.
    pub id: Id,

    /// [`Status`]es the [`Vehicle`] is expected to be in.
    pub from: Vec<Status>,

    /// [`Status`] to set.
    pub to: Status,

    /// [`DateTime`] of the change.
    pub at: ModificationDateTime,
}

/// [`DateTime`] when a [`Vehicle`] was added to the inventory.
pub type CreationDateTime = DateTimeOf<(Vehicle, unit::Creation)>;

/// [`DateTime`] when a [`Vehicle`] was last modified.
pub type ModificationDateTime = DateTimeOf<(Vehicle, unit::Modification)>;

#[cfg(test)]
pub(crate) mod spec {
    use std::sync::atomic::{AtomicU32, Ordering};

    use common::{DateTime, Money};

    use super::{
        Color, Make, Mileage, Model, Status, Vehicle, Vin, Year,
    };

    #[test]
    fn validates_vin() {
        assert!(Vin::new("1HGCM82633A004352").is_some());
        assert_eq!(
            AsRef::<str>::as_ref(&Vin::new("1hgcm82633a004352").unwrap()),
            "1HGCM82633A004352",
        );

        assert!(Vin::new("1HGCM82633A00435").is_none());
        assert!(Vin::new("1HGCM82633A0043522").is_none());
        assert!(Vin::new("1HGCM82633I004352").is_none());
        assert!(Vin::new("1HGCM82633-004352").is_none());
    }

    #[test]
    fn validates_year_and_mileage() {
        assert!(Year::new(1885).is_none());
        assert_eq!(Year::new(2024).map(Year::value), Some(2024));
        assert!(Mileage::new(-1).is_none());
        assert!(Mileage::new(0).is_some());
    }

    #[test]
    fn parses_only_valid_year_and_mileage() {
        assert_eq!("2020".parse::<Year>().map(Year::value), Ok(2020));
        assert!("1885".parse::<Year>().is_err());
        assert!("new".parse::<Year>().is_err());
        assert!(serde_json::from_str::<Year>("1885").is_err());
        assert_eq!(
            serde_json::from_str::<Year>("1999").ok().map(Year::value),
            Some(1999),
        );

        assert_eq!("0".parse::<Mileage>(), Ok(Mileage::default()));
        assert!("-1".parse::<Mileage>().is_err());
        assert!(serde_json::from_str::<Mileage>("-5").is_err());
    }

    #[test]
    fn guards_status_changes() {
        assert!(Status::Available.is_reservable());
        assert!(!Status::Reserved.is_reservable());
        assert!(!Status::Sold.is_reservable());

        assert!(Status::Available.is_sellable());
        assert!(Status::Reserved.is_sellable());
        assert!(!Status::Sold.is_sellable());
        assert!(!Status::Maintenance.is_sellable());
        assert!(!Status::Pending.is_sellable());
    }

    #[test]
    fn computes_age() {
        assert_eq!(vehicle("Toyota", 2020, 1).age_in(2025), 5);
    }

    pub(crate) fn vehicle(make: &str, year: i16, price: u32) -> Vehicle {
        static SERIAL: AtomicU32 = AtomicU32::new(0);

        let serial = SERIAL.fetch_add(1, Ordering::Relaxed);
        Vehicle {
            id: super::Id::new(),
            vin: Vin::new(format!("1HGCM8263{serial:08}")).unwrap(),
            make: Make::new(make).unwrap(),
            model: Model::new("Model").unwrap(),
            year: Year::new(year).unwrap(),
            color: Color::new("Black").unwrap(),
            mileage: Mileage::new(10_000).unwrap(),
            price: Money::from(price),
            status: Status::Available,
            engine_type: None,
            transmission: None,
            fuel_type: None,
            created_at: DateTime::now().coerce(),
            updated_at: DateTime::now().coerce(),
        }
    }
}
