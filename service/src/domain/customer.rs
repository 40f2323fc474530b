//! [`Customer`] definitions.

use std::collections::BTreeMap;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, define_text, unit, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    contact::{Email, Phone},
    credit,
};

/// Customer of the dealership.
#[derive(Clone, Debug, Serialize)]
pub struct Customer {
    /// ID of this [`Customer`].
    pub id: Id,

    /// First [`Name`] of this [`Customer`].
    pub first_name: Name,

    /// Last [`Name`] of this [`Customer`].
    pub last_name: Name,

    /// [`Email`] of this [`Customer`].
    pub email: Email,

    /// [`Phone`] of this [`Customer`], if known.
    pub phone: Option<Phone>,

    /// Street [`Address`] of this [`Customer`], if known.
    pub address: Option<Address>,

    /// [`City`] this [`Customer`] lives in, if known.
    pub city: Option<City>,

    /// [`State`] this [`Customer`] lives in, if known.
    pub state: Option<State>,

    /// [`ZipCode`] of this [`Customer`], if known.
    pub zip_code: Option<ZipCode>,

    /// [`DateTime`] this [`Customer`] was born at, if known.
    pub born_at: Option<BirthDateTime>,

    /// Stored [`credit::Score`] of this [`Customer`].
    ///
    /// [`None`] means the score was never assessed, so it's synthesized on
    /// every credit evaluation.
    pub credit_score: Option<credit::Score>,

    /// [`Preferences`] of this [`Customer`].
    pub preferences: Preferences,

    /// [`DateTime`] when this [`Customer`] was registered.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Customer`] was last modified.
    pub updated_at: ModificationDateTime,
}

impl Customer {
    /// Returns the age of this [`Customer`] in the provided `year`.
    ///
    /// Only the years are compared, so the result may overshoot the real age
    /// by one before the birthday.
    ///
    /// [`None`] is returned if the birth date is unknown.
    #[must_use]
    pub fn age_in(&self, year: i32) -> Option<i32> {
        self.born_at.map(|born| year - born.year())
    }
}

/// ID of a [`Customer`].
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
    #[doc = "Personal name of a [`Customer`]."]
    struct Name(max_len = 256);
}

define_text! {
    #[doc = "Street address of a [`Customer`]."]
    struct Address(max_len = 512);
}

define_text! {
    #[doc = "City of a [`Customer`]."]
    struct City(max_len = 256);
}

define_text! {
    #[doc = "State of a [`Customer`]."]
    struct State(max_len = 256);
}

define_text! {
    #[doc = "Zip code of a [`Customer`]."]
    struct ZipCode(max_len = 16);
}

define_kind! {
    #[doc = "Preference a [`Customer`] may express."]
    enum Preference {
        #[doc = "Preferred channel to be contacted through."]
        ContactChannel = 1,

        #[doc = "Preferred language of communication."]
        Language = 2,

        #[doc = "Whether the [`Customer`] wants to receive newsletters."]
        Newsletter = 3,
    }
}

/// Set of [`Preference`]s of a [`Customer`].
///
/// Keys unknown to this version land in [`Preferences::extensions`], so they
/// survive a round trip through an older release.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Preferences {
    /// Values of the known [`Preference`]s.
    pub known: BTreeMap<Preference, String>,

    /// Values of the keys not covered by [`Preference`].
    pub extensions: BTreeMap<String, String>,
}

impl Preferences {
    /// Sets the provided `value` for the provided `key`, routing it either to
    /// the [`Preference`] it names or to the [`Preferences::extensions`].
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if let Ok(known) = key.parse::<Preference>() {
            drop(self.known.insert(known, value));
        } else {
            drop(self.extensions.insert(key.to_owned(), value));
        }
    }

    /// Returns the value of the provided [`Preference`], if set.
    #[must_use]
    pub fn get(&self, key: Preference) -> Option<&str> {
        self.known.get(&key).map(String::as_str)
    }

    /// Indicates whether no preferences are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.known.is_empty() && self.extensions.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Preferences {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut prefs = Self::default();
        for (k, v) in iter {
            prefs.set(k.as_ref(), v);
        }
        prefs
    }
}

/// Marker type indicating a [`Customer`] birth.
#[derive(Clone, Copy, Debug)]
pub struct Birth;

/// [`DateTime`] when a [`Customer`] was born.
pub type BirthDateTime = DateTimeOf<(Customer, Birth)>;

/// [`DateTime`] when a [`Customer`] was registered.
pub type CreationDateTime = DateTimeOf<(Customer, unit::Creation)>;

/// [`DateTime`] when a [`Customer`] was last modified.
pub type ModificationDateTime = DateTimeOf<(Customer, unit::Modification)>;

#[cfg(test)]
pub(crate) mod spec {
    use common::DateTime;

    use super::{Preference, Preferences};
    use crate::domain::customer::BirthDateTime;

    #[test]
    fn routes_known_preferences() {
        let prefs: Preferences = [
            ("contact_channel", "email"),
            ("language", "de"),
            ("favorite_color", "teal"),
        ]
        .into_iter()
        .collect();

        assert_eq!(prefs.get(Preference::ContactChannel), Some("email"));
        assert_eq!(prefs.get(Preference::Language), Some("de"));
        assert_eq!(prefs.get(Preference::Newsletter), None);
        assert_eq!(
            prefs.extensions.get("favorite_color").map(String::as_str),
            Some("teal"),
        );
        assert!(!prefs.is_empty());
    }

    #[test]
    fn computes_age_from_years_only() {
        let born: BirthDateTime =
            DateTime::from_ymd(1990, 12, 31).unwrap().coerce();
        let mut customer = customer();
        customer.born_at = Some(born);

        assert_eq!(customer.age_in(2025), Some(35));

        customer.born_at = None;
        assert_eq!(customer.age_in(2025), None);
    }

    pub(crate) fn customer() -> super::Customer {
        use super::{Customer, Id, Name};
        use crate::domain::contact::Email;

        Customer {
            id: Id::new(),
            first_name: Name::new("Jane").unwrap(),
            last_name: Name::new("Doe").unwrap(),
            email: Email::new("jane.doe@example.com").unwrap(),
            phone: None,
            address: None,
            city: None,
            state: None,
            zip_code: None,
            born_at: None,
            credit_score: None,
            preferences: Preferences::default(),
            created_at: DateTime::now().coerce(),
            updated_at: DateTime::now().coerce(),
        }
    }
}
