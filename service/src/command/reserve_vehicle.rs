//! [`Command`] for reserving a [`Vehicle`] for a [`Customer`].

use common::{
    operations::{By, Commit, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{customer, vehicle, Customer, Vehicle},
    error::{Classify, Kind},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for reserving an [`vehicle::Status::Available`] [`Vehicle`]
/// for a [`Customer`].
#[derive(Clone, Copy, Debug)]
pub struct ReserveVehicle {
    /// ID of the [`Vehicle`] to reserve.
    pub vehicle_id: vehicle::Id,

    /// ID of the [`Customer`] the [`Vehicle`] is reserved for.
    pub customer_id: customer::Id,
}

impl<Db> Command<ReserveVehicle> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Vehicle>, vehicle::Id>>,
            Ok = Option<Vehicle>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Customer>, customer::Id>>,
            Ok = Option<Customer>,
            Err = Traced<database::Error>,
        > + Database<
            Update<vehicle::StatusTransition>,
            Ok = read::vehicle::Transitioned,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Vehicle;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ReserveVehicle,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ReserveVehicle { vehicle_id, customer_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let vehicle = tx
            .execute(Select(By::<Option<Vehicle>, _>::new(vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::VehicleNotExists(vehicle_id))
            .map_err(tracerr::wrap!())?;
        if !vehicle.status.is_reservable() {
            log::warn!(
                "`Vehicle({vehicle_id})` cannot be reserved being {}",
                vehicle.status,
            );
            return Err(tracerr::new!(E::NotAvailable(vehicle.status)));
        }

        _ = tx
            .execute(Select(By::<Option<Customer>, _>::new(customer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CustomerNotExists(customer_id))
            .map_err(tracerr::wrap!())?;

        let transitioned = tx
            .execute(Update(vehicle::StatusTransition {
                id: vehicle_id,
                from: vec![vehicle::Status::Available],
                to: vehicle::Status::Reserved,
                at: DateTime::now().coerce(),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let read::vehicle::Transitioned::Applied(vehicle) = transitioned else {
            return Err(tracerr::new!(E::NotAvailable(vehicle.status)));
        };

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "`Vehicle({vehicle_id})` reserved for `Customer({customer_id})`",
        );

        Ok(vehicle)
    }
}

/// Error of [`ReserveVehicle`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Vehicle`] with the provided ID doesn't exist.
    #[display("`Vehicle(id: {_0})` doesn't exist")]
    VehicleNotExists(#[error(not(source))] vehicle::Id),

    /// [`Customer`] with the provided ID doesn't exist.
    #[display("`Customer(id: {_0})` doesn't exist")]
    CustomerNotExists(#[error(not(source))] customer::Id),

    /// [`Vehicle`] is not [`vehicle::Status::Available`].
    #[display("`Vehicle` is {_0} and cannot be reserved")]
    NotAvailable(#[error(not(source))] vehicle::Status),
}

impl Classify for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::VehicleNotExists(_) | Self::CustomerNotExists(_) => {
                Kind::NotFound
            }
            Self::NotAvailable(_) => Kind::InvalidState,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};

    use crate::{
        command::{add_vehicle, register_customer, start_sale},
        domain::{customer, vehicle, Vehicle},
        error::{Classify as _, Kind},
        infra::{Database as _, Memory},
        Config, Service,
    };

    use super::ReserveVehicle;

    #[tokio::test]
    async fn reserves_available() {
        let svc = Service::new(Config::default(), Memory::new());
        let v = svc
            .execute(add_vehicle::spec::add("1HGCM82633A004352", "Honda", 1))
            .await
            .unwrap();
        let c = svc
            .execute(register_customer::spec::register("a@example.com"))
            .await
            .unwrap();

        let reserved = svc
            .execute(ReserveVehicle { vehicle_id: v.id, customer_id: c.id })
            .await
            .unwrap();
        assert_eq!(reserved.status, vehicle::Status::Reserved);

        let stored = svc
            .database()
            .execute(Select(By::<Option<Vehicle>, _>::new(v.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, vehicle::Status::Reserved);

        let err = svc
            .execute(ReserveVehicle { vehicle_id: v.id, customer_id: c.id })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::InvalidState);
    }

    #[tokio::test]
    async fn requires_existing_parties() {
        let svc = Service::new(Config::default(), Memory::new());
        let v = svc
            .execute(add_vehicle::spec::add("1HGCM82633A004352", "Honda", 1))
            .await
            .unwrap();
        let c = svc
            .execute(register_customer::spec::register("a@example.com"))
            .await
            .unwrap();

        let err = svc
            .execute(ReserveVehicle {
                vehicle_id: vehicle::Id::new(),
                customer_id: c.id,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::NotFound);

        let err = svc
            .execute(ReserveVehicle {
                vehicle_id: v.id,
                customer_id: customer::Id::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::NotFound);

        let stored = svc
            .database()
            .execute(Select(By::<Option<Vehicle>, _>::new(v.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, vehicle::Status::Available);
    }

    #[tokio::test]
    async fn rejects_sold() {
        let svc = Service::new(Config::default(), Memory::new());
        let (c, v, _) =
            start_sale::spec::seed(&svc, vehicle::Status::Sold, 30_000).await;

        let err = svc
            .execute(ReserveVehicle { vehicle_id: v.id, customer_id: c.id })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::InvalidState);

        let stored = svc
            .database()
            .execute(Select(By::<Option<Vehicle>, _>::new(v.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, vehicle::Status::Sold);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn only_one_concurrent_reservation_wins() {
        let svc = Service::new(Config::default(), Memory::new());
        let v = svc
            .execute(add_vehicle::spec::add("1HGCM82633A004352", "Honda", 1))
            .await
            .unwrap();
        let c = svc
            .execute(register_customer::spec::register("a@example.com"))
            .await
            .unwrap();

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let svc = svc.clone();
                let cmd = ReserveVehicle { vehicle_id: v.id, customer_id: c.id };
                tokio::spawn(async move { svc.execute(cmd).await })
            })
            .collect();

        let mut reserved = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => reserved += 1,
                Err(e) => assert_eq!(e.kind(), Kind::InvalidState),
            }
        }
        assert_eq!(reserved, 1);

        let stored = svc
            .database()
            .execute(Select(By::<Option<Vehicle>, _>::new(v.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, vehicle::Status::Reserved);
    }
}
