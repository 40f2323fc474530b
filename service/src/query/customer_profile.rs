//! [`CustomerProfile`] definition.

use std::collections::HashMap;

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use itertools::Itertools as _;
use tracerr::Traced;

use crate::{
    domain::{customer, sale, vehicle, CreditDecision, Customer, Sale, Vehicle},
    error::{Classify, Kind},
    infra::{database, Database},
    read::customer::Profile,
    Query, Service,
};

/// [`Query`] assembling the [`Profile`] of a [`Customer`].
#[derive(Clone, Copy, Debug)]
pub struct CustomerProfile {
    /// ID of the [`Customer`] to assemble the [`Profile`] of.
    pub customer_id: customer::Id,
}

impl<Db> Query<CustomerProfile> for Service<Db>
where
    Db: Database<
            Select<By<Option<Customer>, customer::Id>>,
            Ok = Option<Customer>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Sale>, customer::Id>>,
            Ok = Vec<Sale>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<HashMap<vehicle::Id, Vehicle>, Vec<vehicle::Id>>>,
            Ok = HashMap<vehicle::Id, Vehicle>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Profile;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        CustomerProfile { customer_id }: CustomerProfile,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let customer = self
            .database()
            .execute(Select(By::<Option<Customer>, _>::new(customer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CustomerNotExists(customer_id))
            .map_err(tracerr::wrap!())?;

        let sales = self
            .database()
            .execute(Select(By::<Vec<Sale>, _>::new(customer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let vehicle_ids = sales
            .iter()
            .filter(|s| s.status == sale::Status::Completed)
            .map(|s| s.vehicle_id)
            .unique()
            .collect_vec();
        let vehicles = self
            .database()
            .execute(Select(
                By::<HashMap<vehicle::Id, Vehicle>, _>::new(vehicle_ids),
            ))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let credit = CreditDecision::evaluate(
            &customer,
            self.config().credit_scorer.as_ref(),
            DateTime::now(),
        );

        Ok(Profile::assemble(customer, credit, sales, vehicles))
    }
}

/// Error of [`CustomerProfile`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Customer`] with the provided ID doesn't exist.
    #[display("`Customer(id: {_0})` doesn't exist")]
    CustomerNotExists(#[error(not(source))] customer::Id),
}

impl Classify for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::CustomerNotExists(_) => Kind::NotFound,
        }
    }
}
