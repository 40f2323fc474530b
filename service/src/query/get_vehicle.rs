//! [`GetVehicle`] definition.

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{vehicle, Vehicle},
    error::{Classify, Kind},
    infra::{database, Database},
    Query, Service,
};

/// [`Query`] fetching an existing [`Vehicle`] by its ID.
#[derive(Clone, Copy, Debug)]
pub struct GetVehicle {
    /// ID of the [`Vehicle`] to fetch.
    pub id: vehicle::Id,
}

impl<Db> Query<GetVehicle> for Service<Db>
where
    Db: Database<
        Select<By<Option<Vehicle>, vehicle::Id>>,
        Ok = Option<Vehicle>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vehicle;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        GetVehicle { id }: GetVehicle,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        self.database()
            .execute(Select(By::<Option<Vehicle>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::VehicleNotExists(id))
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`GetVehicle`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Vehicle`] with the provided ID doesn't exist.
    #[display("`Vehicle(id: {_0})` doesn't exist")]
    VehicleNotExists(#[error(not(source))] vehicle::Id),
}

impl Classify for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::VehicleNotExists(_) => Kind::NotFound,
        }
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        command::add_vehicle,
        domain::vehicle,
        error::{Classify as _, Kind},
        infra::Memory,
        Config, Query as _, Service,
    };

    use super::GetVehicle;

    #[tokio::test]
    async fn fetches_existing() {
        let svc = Service::new(Config::default(), Memory::new());
        let added = svc
            .execute(add_vehicle::spec::add("1HGCM82633A004352", "Kia", 9))
            .await
            .unwrap();

        let found = svc.execute(GetVehicle { id: added.id }).await.unwrap();

        assert_eq!(found.id, added.id);
        assert_eq!(found.make.to_string(), "Kia");
    }

    #[tokio::test]
    async fn fails_for_unknown_vehicle() {
        let svc = Service::new(Config::default(), Memory::new());

        let err = svc
            .execute(GetVehicle {
                id: vehicle::Id::new(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::NotFound);
    }
}
