//! [`Query`] definition.

pub mod credit_application;
pub mod customer;
pub mod customer_profile;
pub mod customers;
pub mod get_vehicle;
pub mod quote_financing;
pub mod report;
pub mod salespeople;
pub mod search_vehicles;
pub mod vehicle;
pub mod vehicles;

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    infra::{database, Database},
    Service,
};

pub use self::{
    credit_application::CreditApplication, customer_profile::CustomerProfile,
    get_vehicle::GetVehicle, quote_financing::QuoteFinancing,
    search_vehicles::SearchVehicles,
};

/// [`Query`] of the [`Service`].
pub use common::Handler as Query;

/// [`Query`] [`Select`]ing a `T`ype from a [`Database`].
#[derive(Clone, Copy, Debug)]
#[expect(clippy::module_name_repetitions, reason = "more readable")]
pub struct DatabaseQuery<T>(T);

impl<W, B> DatabaseQuery<By<W, B>> {
    /// Creates a new [`DatabaseQuery`] selecting a `W` by the provided `B`.
    #[must_use]
    pub fn by(by: B) -> Self {
        Self(By::new(by))
    }
}

impl<Db, W, B> Query<DatabaseQuery<By<W, B>>> for Service<Db>
where
    Db: Database<Select<By<W, B>>, Ok = W, Err = Traced<database::Error>>,
{
    type Ok = W;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        DatabaseQuery(by): DatabaseQuery<By<W, B>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.database()
            .execute(Select(by))
            .await
            .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        command::add_vehicle, infra::Memory, read, Config, Query as _,
        Service,
    };

    use super::{vehicle, vehicles};

    #[tokio::test]
    async fn selects_from_database() {
        let svc = Service::new(Config::default(), Memory::new());
        let cmd = add_vehicle::spec::add("1HGCM82633A004352", "Kia", 9);
        let added = svc.execute(cmd.clone()).await.unwrap();

        let by_id = svc.execute(vehicle::ById::by(added.id)).await.unwrap();
        let by_vin = svc.execute(vehicle::ByVin::by(cmd.vin)).await.unwrap();
        let all = svc
            .execute(vehicles::List::by(read::vehicle::All))
            .await
            .unwrap();

        assert_eq!(by_id.map(|v| v.id), Some(added.id));
        assert_eq!(by_vin.map(|v| v.id), Some(added.id));
        assert_eq!(all.len(), 1);
    }
}
