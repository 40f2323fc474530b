//! [`Command`] for starting a [`SalesSession`].

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        customer, salesperson, vehicle, Customer, SalesSession, Salesperson,
        Vehicle,
    },
    error::{Classify, Kind},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for starting a [`SalesSession`] between a [`Customer`], a
/// [`Vehicle`] and a [`Salesperson`].
///
/// Only checks the preconditions of a sale, so nothing is written.
#[derive(Clone, Copy, Debug)]
pub struct StartSale {
    /// ID of the buying [`Customer`].
    pub customer_id: customer::Id,

    /// ID of the [`Vehicle`] being sold.
    pub vehicle_id: vehicle::Id,

    /// ID of the [`Salesperson`] conducting the sale.
    pub salesperson_id: salesperson::Id,
}

impl<Db> Command<StartSale> for Service<Db>
where
    Db: Database<
            Select<By<Option<Customer>, customer::Id>>,
            Ok = Option<Customer>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Vehicle>, vehicle::Id>>,
            Ok = Option<Vehicle>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Salesperson>, salesperson::Id>>,
            Ok = Option<Salesperson>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = SalesSession;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: StartSale) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let StartSale { customer_id, vehicle_id, salesperson_id } = cmd;

        let customer = self
            .database()
            .execute(Select(By::<Option<Customer>, _>::new(customer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CustomerNotExists(customer_id))
            .map_err(tracerr::wrap!())?;
        let vehicle = self
            .database()
            .execute(Select(By::<Option<Vehicle>, _>::new(vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::VehicleNotExists(vehicle_id))
            .map_err(tracerr::wrap!())?;
        let salesperson = self
            .database()
            .execute(Select(By::<Option<Salesperson>, _>::new(salesperson_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::SalespersonNotExists(salesperson_id))
            .map_err(tracerr::wrap!())?;

        if !vehicle.status.is_sellable() {
            log::warn!(
                "`Vehicle({vehicle_id})` cannot be sold being {}",
                vehicle.status,
            );
            return Err(tracerr::new!(E::NotSellable(vehicle.status)));
        }

        let session = SalesSession::start(
            customer,
            vehicle,
            salesperson,
            DateTime::now(),
        );
        log::debug!(
            "`SalesSession({})` started for `Vehicle({vehicle_id})`",
            session.id,
        );

        Ok(session)
    }
}

/// Error of [`StartSale`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Customer`] with the provided ID doesn't exist.
    #[display("`Customer(id: {_0})` doesn't exist")]
    CustomerNotExists(#[error(not(source))] customer::Id),

    /// [`Vehicle`] with the provided ID doesn't exist.
    #[display("`Vehicle(id: {_0})` doesn't exist")]
    VehicleNotExists(#[error(not(source))] vehicle::Id),

    /// [`Salesperson`] with the provided ID doesn't exist.
    #[display("`Salesperson(id: {_0})` doesn't exist")]
    SalespersonNotExists(#[error(not(source))] salesperson::Id),

    /// [`Vehicle`] is neither available nor reserved.
    #[display("`Vehicle` is {_0} and cannot be sold")]
    NotSellable(#[error(not(source))] vehicle::Status),
}

impl Classify for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::CustomerNotExists(_)
            | Self::VehicleNotExists(_)
            | Self::SalespersonNotExists(_) => Kind::NotFound,
            Self::NotSellable(_) => Kind::InvalidState,
        }
    }
}
