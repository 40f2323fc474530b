//! [`Command`] for adding a new [`Vehicle`] to the inventory.

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{vehicle, Vehicle},
    error::{Classify, Kind},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for adding a new [`Vehicle`] to the inventory.
///
/// The added [`Vehicle`] is [`vehicle::Status::Available`].
#[derive(Clone, Debug)]
pub struct AddVehicle {
    /// [`vehicle::Vin`] of a new [`Vehicle`].
    pub vin: vehicle::Vin,

    /// [`vehicle::Make`] of a new [`Vehicle`].
    pub make: vehicle::Make,

    /// [`vehicle::Model`] of a new [`Vehicle`].
    pub model: vehicle::Model,

    /// [`vehicle::Year`] of a new [`Vehicle`].
    pub year: vehicle::Year,

    /// [`vehicle::Color`] of a new [`Vehicle`].
    pub color: vehicle::Color,

    /// [`vehicle::Mileage`] of a new [`Vehicle`].
    pub mileage: vehicle::Mileage,

    /// Listed price of a new [`Vehicle`].
    pub price: Money,

    /// [`vehicle::EngineType`] of a new [`Vehicle`], if known.
    pub engine_type: Option<vehicle::EngineType>,

    /// [`vehicle::Transmission`] of a new [`Vehicle`], if known.
    pub transmission: Option<vehicle::Transmission>,

    /// [`vehicle::FuelType`] of a new [`Vehicle`], if known.
    pub fuel_type: Option<vehicle::FuelType>,
}

impl<Db> Command<AddVehicle> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Vehicle>, vehicle::Vin>>,
            Ok = Option<Vehicle>,
            Err = Traced<database::Error>,
        > + Database<Insert<Vehicle>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Vehicle;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: AddVehicle) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AddVehicle {
            vin,
            make,
            model,
            year,
            color,
            mileage,
            price,
            engine_type,
            transmission,
            fuel_type,
        } = cmd;

        if price.is_negative() {
            return Err(tracerr::new!(E::NegativePrice(price)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let existing = tx
            .execute(Select(By::<Option<Vehicle>, _>::new(vin.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.is_some() {
            return Err(tracerr::new!(E::VinOccupied(vin)));
        }

        let now = DateTime::now();
        let vehicle = Vehicle {
            id: vehicle::Id::new(),
            vin,
            make,
            model,
            year,
            color,
            mileage,
            price,
            status: vehicle::Status::Available,
            engine_type,
            transmission,
            fuel_type,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };

        tx.execute(Insert(vehicle.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!("`Vehicle({})` added with `{}` VIN", vehicle.id, vehicle.vin);

        Ok(vehicle)
    }
}

/// Error of [`AddVehicle`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Price of the [`Vehicle`] is negative.
    #[display("`Vehicle` price cannot be negative: {_0}")]
    NegativePrice(#[error(not(source))] Money),

    /// [`vehicle::Vin`] is already registered.
    #[display("`{_0}` VIN is occupied")]
    VinOccupied(#[error(not(source))] vehicle::Vin),
}

impl Classify for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::NegativePrice(_) => Kind::InvalidInput,
            Self::VinOccupied(_) => Kind::InvalidState,
        }
    }
}

#[cfg(test)]
pub(crate) mod spec {
    use common::Money;

    use crate::{
        domain::vehicle,
        error::{Classify as _, Kind},
        infra::Memory,
        Command as _, Config, Service,
    };

    use super::AddVehicle;

    pub(crate) fn add(vin: &str, make: &str, price: u32) -> AddVehicle {
        AddVehicle {
            vin: vehicle::Vin::new(vin).unwrap(),
            make: vehicle::Make::new(make).unwrap(),
            model: vehicle::Model::new("Base").unwrap(),
            year: vehicle::Year::new(2022).unwrap(),
            color: vehicle::Color::new("Black").unwrap(),
            mileage: vehicle::Mileage::new(1_000).unwrap(),
            price: Money::from(price),
            engine_type: None,
            transmission: None,
            fuel_type: vehicle::FuelType::new("Gasoline"),
        }
    }

    #[tokio::test]
    async fn adds_available() {
        let svc = Service::new(Config::default(), Memory::new());

        let v = svc
            .execute(add("1hgcm82633a004352", "Honda", 25_000))
            .await
            .unwrap();

        assert_eq!(v.status, vehicle::Status::Available);
        assert_eq!(v.vin.to_string(), "1HGCM82633A004352");
    }

    #[tokio::test]
    async fn rejects_occupied_vin() {
        let svc = Service::new(Config::default(), Memory::new());
        _ = svc
            .execute(add("1HGCM82633A004352", "Honda", 25_000))
            .await
            .unwrap();

        let err = svc
            .execute(add("1HGCM82633A004352", "Toyota", 30_000))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::InvalidState);
    }

    #[tokio::test]
    async fn rejects_negative_price() {
        let svc = Service::new(Config::default(), Memory::new());
        let mut cmd = add("1HGCM82633A004352", "Honda", 0);
        cmd.price = "-1".parse().unwrap();

        let err = svc.execute(cmd).await.unwrap_err();

        assert_eq!(err.kind(), Kind::InvalidInput);
    }
}
