//! [`Sales`] report definition.

use std::collections::HashMap;

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use itertools::Itertools as _;
use tracerr::Traced;

use crate::{
    domain::{vehicle, Sale, Vehicle},
    error::{Classify, Kind},
    infra::{database, Database},
    read::{self, report::SalesReport},
    Query, Service,
};

use super::InvertedPeriod;

/// [`Query`] aggregating the [`SalesReport`] for the [`Sale`]s happened
/// strictly between the provided moments.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Sales {
    /// Start of the period.
    pub start: DateTime,

    /// End of the period.
    pub end: DateTime,
}

impl<Db> Query<Sales> for Service<Db>
where
    Db: Database<
            Select<By<Vec<Sale>, read::Period>>,
            Ok = Vec<Sale>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<HashMap<vehicle::Id, Vehicle>, Vec<vehicle::Id>>>,
            Ok = HashMap<vehicle::Id, Vehicle>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = SalesReport;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        Sales { start, end }: Sales,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let period =
            super::period(start, end).map_err(tracerr::from_and_wrap!(=> E))?;

        let sales = self
            .database()
            .execute(Select(By::<Vec<Sale>, _>::new(period)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let vehicle_ids =
            sales.iter().map(|s| s.vehicle_id).unique().collect_vec();
        let vehicles = self
            .database()
            .execute(Select(
                By::<HashMap<vehicle::Id, Vehicle>, _>::new(vehicle_ids),
            ))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(SalesReport::aggregate(period, &sales, &vehicles))
    }
}

/// Error of [`Sales`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Requested period is inverted.
    #[display("Invalid period: {_0}")]
    Period(InvertedPeriod),
}

impl Classify for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::Period(_) => Kind::InvalidInput,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::{operations::Insert, DateTime, Money};

    use crate::{
        domain::{sale, salesperson, vehicle::spec::vehicle},
        error::{Classify as _, Kind},
        infra::{Database as _, Memory},
        Config, Service,
    };

    use super::Sales;

    fn day(d: u8) -> DateTime {
        DateTime::from_ymd(2024, 6, d).unwrap()
    }

    #[tokio::test]
    async fn reports_sales_strictly_within_period() {
        let svc = Service::new(Config::default(), Memory::new());
        let car = vehicle("Toyota", 2022, 100);
        let seller = salesperson::Id::new();
        svc.database().execute(Insert(car.clone())).await.unwrap();
        for (price, d) in [(100, 5), (200, 20), (999, 1), (999, 30)] {
            svc.database()
                .execute(Insert(sale::spec::sale(car.id, seller, price, day(d))))
                .await
                .unwrap();
        }

        let report = svc
            .execute(Sales {
                start: day(1),
                end: day(30),
            })
            .await
            .unwrap();

        assert_eq!(report.total_sales, 2);
        assert_eq!(report.total_revenue, Money::from(300));
        assert_eq!(report.average_revenue, Money::from(150));
        assert_eq!(report.top_vehicles[0].vehicle.id, car.id);
    }

    #[tokio::test]
    async fn rejects_inverted_period() {
        let svc = Service::new(Config::default(), Memory::new());

        let err = svc
            .execute(Sales {
                start: day(2),
                end: day(1),
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::InvalidInput);
    }
}
