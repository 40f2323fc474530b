//! [`SalesSession`] definitions.

use std::time::Duration;

use common::{define_kind, DateTime, DateTimeOf};
use derive_more::{Display, Error, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Customer, Salesperson, Vehicle};

/// In-flight negotiation of a [`Vehicle`] sale.
///
/// Never persisted: it lives only between starting and completing (or
/// cancelling) a sale.
#[derive(Clone, Debug, Serialize)]
pub struct SalesSession {
    /// ID of this [`SalesSession`].
    pub id: Id,

    /// [`Customer`] buying the [`Vehicle`].
    pub customer: Customer,

    /// [`Vehicle`] being sold.
    pub vehicle: Vehicle,

    /// [`Salesperson`] conducting this [`SalesSession`].
    pub salesperson: Salesperson,

    /// [`DateTime`] when this [`SalesSession`] was started.
    pub started_at: StartDateTime,

    /// [`Status`] of this [`SalesSession`].
    pub status: Status,
}

impl SalesSession {
    /// Starts a new [`Status::Active`] [`SalesSession`].
    #[must_use]
    pub fn start(
        customer: Customer,
        vehicle: Vehicle,
        salesperson: Salesperson,
        now: DateTime,
    ) -> Self {
        Self {
            id: Id::new(),
            customer,
            vehicle,
            salesperson,
            started_at: now.coerce(),
            status: Status::Active,
        }
    }

    /// Indicates whether this [`SalesSession`] outlived the provided `ttl` at
    /// the provided moment.
    #[must_use]
    pub fn is_expired(&self, ttl: Duration, now: DateTime) -> bool {
        self.started_at.coerce::<()>() + ttl <= now
    }

    /// Marks this [`SalesSession`] as [`Status::Completed`].
    ///
    /// # Errors
    ///
    /// If this [`SalesSession`] is not [`Status::Active`].
    pub fn complete(&mut self) -> Result<(), NotActive> {
        self.transition(Status::Completed)
    }

    /// Marks this [`SalesSession`] as [`Status::Cancelled`].
    ///
    /// # Errors
    ///
    /// If this [`SalesSession`] is not [`Status::Active`].
    pub fn cancel(&mut self) -> Result<(), NotActive> {
        self.transition(Status::Cancelled)
    }

    /// Marks this [`SalesSession`] as [`Status::Expired`].
    ///
    /// # Errors
    ///
    /// If this [`SalesSession`] is not [`Status::Active`].
    pub fn expire(&mut self) -> Result<(), NotActive> {
        self.transition(Status::Expired)
    }

    fn transition(&mut self, to: Status) -> Result<(), NotActive> {
        if self.status != Status::Active {
            return Err(NotActive(self.status));
        }
        self.status = to;
        Ok(())
    }
}

/// ID of a [`SalesSession`].
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
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_kind! {
    #[doc = "Status of a [`SalesSession`]."]
    enum Status {
        #[doc = "[`SalesSession`] is in progress."]
        Active = 1,

        #[doc = "[`SalesSession`] ended with a sale."]
        Completed = 2,

        #[doc = "[`SalesSession`] was called off."]
        Cancelled = 3,

        #[doc = "[`SalesSession`] timed out."]
        Expired = 4,
    }
}

/// Error of changing the [`Status`] of an already finished [`SalesSession`].
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("`SalesSession` is already {_0}")]
pub struct NotActive(#[error(not(source))] pub Status);

/// [`DateTime`] when a [`SalesSession`] was started.
pub type StartDateTime = DateTimeOf<SalesSession>;

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;

    use super::{NotActive, SalesSession, Status};
    use crate::domain::{
        customer::spec::customer, salesperson::spec::salesperson,
        vehicle::spec::vehicle,
    };

    fn session(now: DateTime) -> SalesSession {
        SalesSession::start(
            customer(),
            vehicle("Toyota", 2022, 30_000),
            salesperson("bob"),
            now,
        )
    }

    #[test]
    fn starts_active() {
        assert_eq!(session(DateTime::now()).status, Status::Active);
    }

    #[test]
    fn finishes_once() {
        let mut s = session(DateTime::now());

        s.complete().unwrap();
        assert_eq!(s.status, Status::Completed);

        assert!(matches!(s.cancel(), Err(NotActive(Status::Completed))));
        assert!(matches!(s.expire(), Err(NotActive(Status::Completed))));
        assert_eq!(s.status, Status::Completed);
    }

    #[test]
    fn cancels_and_expires() {
        let mut s = session(DateTime::now());
        s.cancel().unwrap();
        assert_eq!(s.status, Status::Cancelled);

        let mut s = session(DateTime::now());
        s.expire().unwrap();
        assert_eq!(s.status, Status::Expired);
        assert_eq!(
            s.complete().unwrap_err().to_string(),
            "`SalesSession` is already expired",
        );
    }

    #[test]
    fn expires_after_ttl() {
        let start = DateTime::from_ymd(2025, 1, 1).unwrap();
        let s = session(start);
        let ttl = Duration::from_secs(60);

        assert!(!s.is_expired(ttl, start + Duration::from_secs(59)));
        assert!(s.is_expired(ttl, start + Duration::from_secs(60)));
    }
}
