//! [`SearchVehicles`] definition.

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{vehicle::Preferences, Vehicle},
    error::{Classify, Kind},
    infra::{database, Database},
    read, Query, Service,
};

/// [`Query`] searching the inventory for the [`Vehicle`]s matching the
/// provided [`Preferences`].
///
/// Zero bounds of the [`Preferences`] are treated as unset.
#[derive(Clone, Debug)]
pub struct SearchVehicles(pub Preferences);

impl<Db> Query<SearchVehicles> for Service<Db>
where
    Db: Database<
        Select<By<Vec<Vehicle>, read::vehicle::All>>,
        Ok = Vec<Vehicle>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Vehicle>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        SearchVehicles(preferences): SearchVehicles,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let preferences = preferences.normalized();
        preferences
            .validate()
            .map_err(E::InconsistentBounds)
            .map_err(tracerr::wrap!())?;

        let vehicles = self
            .database()
            .execute(Select(By::<Vec<Vehicle>, _>::new(read::vehicle::All)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(preferences.find_matches(vehicles))
    }
}

/// Error of [`SearchVehicles`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Lower bound of a criterion exceeds its upper one.
    #[display("`{_0}` lower bound exceeds the upper one")]
    InconsistentBounds(#[error(not(source))] &'static str),
}

impl Classify for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::InconsistentBounds(_) => Kind::InvalidInput,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::{operations::Insert, Money};

    use crate::{
        domain::vehicle::{spec::vehicle, Make, Preferences},
        error::{Classify as _, Kind},
        infra::{Database as _, Memory},
        Config, Service,
    };

    use super::SearchVehicles;

    #[tokio::test]
    async fn finds_matches_in_inventory_order() {
        let svc = Service::new(Config::default(), Memory::new());
        let inventory = [
            vehicle("Honda", 2020, 15_000),
            vehicle("Toyota", 2021, 22_000),
            vehicle("Honda", 2023, 28_000),
            vehicle("Honda", 2024, 45_000),
        ];
        for v in &inventory {
            svc.database().execute(Insert(v.clone())).await.unwrap();
        }

        let found = svc
            .execute(SearchVehicles(Preferences {
                min_price: Some(Money::ZERO),
                max_price: Some(Money::from(30_000)),
                makes: [Make::new("Honda").unwrap()].into(),
                ..Preferences::default()
            }))
            .await
            .unwrap();

        let ids: Vec<_> = found.iter().map(|v| v.id).collect();
        assert_eq!(ids, [inventory[0].id, inventory[2].id]);
    }

    #[tokio::test]
    async fn rejects_inverted_bounds() {
        let svc = Service::new(Config::default(), Memory::new());

        let err = svc
            .execute(SearchVehicles(Preferences {
                min_price: Some(Money::from(30_000)),
                max_price: Some(Money::from(10_000)),
                ..Preferences::default()
            }))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::InvalidInput);
    }
}
