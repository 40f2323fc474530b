//! [`Salesperson`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, define_text, unit, DateTimeOf, Percent};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::contact::{Email, Phone};

/// Employee selling [`Vehicle`]s.
///
/// [`Vehicle`]: crate::domain::Vehicle
#[derive(Clone, Debug, Serialize)]
pub struct Salesperson {
    /// ID of this [`Salesperson`].
    pub id: Id,

    /// [`EmployeeNumber`] of this [`Salesperson`].
    pub employee_number: EmployeeNumber,

    /// First [`Name`] of this [`Salesperson`].
    pub first_name: Name,

    /// Last [`Name`] of this [`Salesperson`].
    pub last_name: Name,

    /// [`Email`] of this [`Salesperson`].
    pub email: Email,

    /// [`Phone`] of this [`Salesperson`], if known.
    pub phone: Option<Phone>,

    /// [`Department`] this [`Salesperson`] works in, if any.
    pub department: Option<Department>,

    /// Commission rate of this [`Salesperson`].
    pub commission_rate: Percent,

    /// [`Status`] of this [`Salesperson`].
    pub status: Status,

    /// [`DateTime`] when this [`Salesperson`] was hired.
    pub hired_at: HiringDateTime,

    /// [`DateTime`] when this [`Salesperson`] was registered.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Salesperson`] was last modified.
    pub updated_at: ModificationDateTime,
}

/// ID of a [`Salesperson`].
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
    #[doc = "Personnel number of a [`Salesperson`]."]
    struct EmployeeNumber(max_len = 32);
}

define_text! {
    #[doc = "Personal name of a [`Salesperson`]."]
    struct Name(max_len = 256);
}

define_text! {
    #[doc = "Department of a [`Salesperson`]."]
    struct Department(max_len = 128);
}

define_kind! {
    #[doc = "Employment status of a [`Salesperson`]."]
    enum Status {
        #[doc = "[`Salesperson`] is currently working."]
        Active = 1,

        #[doc = "[`Salesperson`] is temporarily away."]
        Inactive = 2,

        #[doc = "[`Salesperson`] no longer works at the dealership."]
        Terminated = 3,
    }
}

/// Marker type indicating a [`Salesperson`] hiring.
#[derive(Clone, Copy, Debug)]
pub struct Hiring;

/// [`DateTime`] when a [`Salesperson`] was hired.
pub type HiringDateTime = DateTimeOf<(Salesperson, Hiring)>;

/// [`DateTime`] when a [`Salesperson`] was registered.
pub type CreationDateTime = DateTimeOf<(Salesperson, unit::Creation)>;

/// [`DateTime`] when a [`Salesperson`] was last modified.
pub type ModificationDateTime = DateTimeOf<(Salesperson, unit::Modification)>;

#[cfg(test)]
pub(crate) mod spec {
    use common::{DateTime, Percent};

    use super::{EmployeeNumber, Id, Name, Salesperson, Status};
    use crate::domain::contact::Email;

    pub(crate) fn salesperson(first_name: &str) -> Salesperson {
        let now = DateTime::now();
        Salesperson {
            id: Id::new(),
            employee_number: EmployeeNumber::new("E-001").unwrap(),
            first_name: Name::new(first_name).unwrap(),
            last_name: Name::new("Seller").unwrap(),
            email: Email::new(format!("{first_name}@dealer.test")).unwrap(),
            phone: None,
            department: None,
            commission_rate: Percent::from_basis_points(200).unwrap(),
            status: Status::Active,
            hired_at: now.coerce(),
            created_at: now.coerce(),
            updated_at: now.coerce(),
        }
    }

    #[test]
    fn serializes_status() {
        let json = serde_json::to_value(salesperson("ann")).unwrap();

        assert_eq!(json["status"], "active");
        assert_eq!(json["commission_rate"], "2");
        assert_eq!(json["email"], "ann@dealer.test");
    }
}
