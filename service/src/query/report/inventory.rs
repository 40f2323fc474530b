//! [`Inventory`] report definition.

use common::{
    operations::{By, Select},
    DateTime,
};
use tracerr::Traced;

use crate::{
    domain::Vehicle,
    infra::{database, Database},
    read::{self, report::InventoryReport},
    Query, Service,
};

/// [`Query`] aggregating the [`InventoryReport`] over every [`Vehicle`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Inventory;

impl<Db> Query<Inventory> for Service<Db>
where
    Db: Database<
        Select<By<Vec<Vehicle>, read::vehicle::All>>,
        Ok = Vec<Vehicle>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = InventoryReport;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Inventory) -> Result<Self::Ok, Self::Err> {
        let vehicles = self
            .database()
            .execute(Select(By::<Vec<Vehicle>, _>::new(read::vehicle::All)))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(InventoryReport::aggregate(vehicles, DateTime::now().year()))
    }
}
