//! [`Command`] for hiring a new [`Salesperson`].

use common::{
    operations::{Commit, Insert, Transact, Transacted},
    DateTime, Percent,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        contact::{Email, Phone},
        salesperson, Salesperson,
    },
    error::{Classify, Kind},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for hiring a new [`salesperson::Status::Active`]
/// [`Salesperson`].
#[derive(Clone, Debug)]
pub struct HireSalesperson {
    /// [`salesperson::EmployeeNumber`] of a new [`Salesperson`].
    pub employee_number: salesperson::EmployeeNumber,

    /// First name of a new [`Salesperson`].
    pub first_name: salesperson::Name,

    /// Last name of a new [`Salesperson`].
    pub last_name: salesperson::Name,

    /// [`Email`] of a new [`Salesperson`].
    pub email: Email,

    /// [`Phone`] of a new [`Salesperson`], if any.
    pub phone: Option<Phone>,

    /// [`salesperson::Department`] of a new [`Salesperson`], if any.
    pub department: Option<salesperson::Department>,

    /// Commission rate of a new [`Salesperson`].
    pub commission_rate: Percent,

    /// [`DateTime`] of hiring, defaults to now.
    pub hired_at: Option<DateTime>,
}

impl<Db> Command<HireSalesperson> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Salesperson>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Salesperson;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: HireSalesperson,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let HireSalesperson {
            employee_number,
            first_name,
            last_name,
            email,
            phone,
            department,
            commission_rate,
            hired_at,
        } = cmd;

        let now = DateTime::now();
        let salesperson = Salesperson {
            id: salesperson::Id::new(),
            employee_number,
            first_name,
            last_name,
            email,
            phone,
            department,
            commission_rate,
            status: salesperson::Status::Active,
            hired_at: hired_at.unwrap_or(now).coerce(),
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(salesperson.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!("`Salesperson({})` hired", salesperson.id);

        Ok(salesperson)
    }
}

/// Error of [`HireSalesperson`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}

impl Classify for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
        }
    }
}
