//! [`Command`] for registering a new [`Customer`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        contact::{Email, Phone},
        credit, customer, Customer,
    },
    error::{Classify, Kind},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for registering a new [`Customer`].
#[derive(Clone, Debug)]
pub struct RegisterCustomer {
    /// First name of a new [`Customer`].
    pub first_name: customer::Name,

    /// Last name of a new [`Customer`].
    pub last_name: customer::Name,

    /// [`Email`] of a new [`Customer`].
    pub email: Email,

    /// [`Phone`] of a new [`Customer`], if any.
    pub phone: Option<Phone>,

    /// Street address of a new [`Customer`], if any.
    pub address: Option<customer::Address>,

    /// City of a new [`Customer`], if any.
    pub city: Option<customer::City>,

    /// State of a new [`Customer`], if any.
    pub state: Option<customer::State>,

    /// Zip code of a new [`Customer`], if any.
    pub zip_code: Option<customer::ZipCode>,

    /// Birth date of a new [`Customer`], if known.
    pub born_at: Option<customer::BirthDateTime>,

    /// Already known [`credit::Score`] of a new [`Customer`], if any.
    pub credit_score: Option<credit::Score>,

    /// [`customer::Preferences`] of a new [`Customer`].
    pub preferences: customer::Preferences,
}

impl<Db> Command<RegisterCustomer> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Customer>, Email>>,
            Ok = Option<Customer>,
            Err = Traced<database::Error>,
        > + Database<Insert<Customer>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Customer;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RegisterCustomer,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RegisterCustomer {
            first_name,
            last_name,
            email,
            phone,
            address,
            city,
            state,
            zip_code,
            born_at,
            credit_score,
            preferences,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let existing = tx
            .execute(Select(By::<Option<Customer>, _>::new(email.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.is_some() {
            return Err(tracerr::new!(E::EmailOccupied(email)));
        }

        let now = DateTime::now();
        let customer = Customer {
            id: customer::Id::new(),
            first_name,
            last_name,
            email,
            phone,
            address,
            city,
            state,
            zip_code,
            born_at,
            credit_score,
            preferences,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };

        tx.execute(Insert(customer.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!("`Customer({})` registered", customer.id);

        Ok(customer)
    }
}

/// Error of [`RegisterCustomer`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Email`] is already used by another [`Customer`].
    #[display("`{_0}` email is occupied")]
    EmailOccupied(#[error(not(source))] Email),
}

impl Classify for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::EmailOccupied(_) => Kind::InvalidState,
        }
    }
}

#[cfg(test)]
pub(crate) mod spec {
    use crate::{
        domain::{contact::Email, customer},
        error::{Classify as _, Kind},
        infra::Memory,
        Command as _, Config, Service,
    };

    use super::RegisterCustomer;

    pub(crate) fn register(email: &str) -> RegisterCustomer {
        RegisterCustomer {
            first_name: customer::Name::new("Jane").unwrap(),
            last_name: customer::Name::new("Doe").unwrap(),
            email: Email::new(email).unwrap(),
            phone: None,
            address: None,
            city: None,
            state: None,
            zip_code: None,
            born_at: None,
            credit_score: None,
            preferences: customer::Preferences::default(),
        }
    }

    #[tokio::test]
    async fn registers() {
        let svc = Service::new(Config::default(), Memory::new());

        let c = svc.execute(register("jane@example.com")).await.unwrap();

        assert_eq!(c.email.to_string(), "jane@example.com");
        assert!(c.credit_score.is_none());
    }

    #[tokio::test]
    async fn rejects_occupied_email() {
        let svc = Service::new(Config::default(), Memory::new());
        _ = svc.execute(register("jane@example.com")).await.unwrap();

        let err = svc
            .execute(register("jane@example.com"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::InvalidState);
    }
}
