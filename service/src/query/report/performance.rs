//! [`Performance`] report definition.

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{Sale, Salesperson},
    error::{Classify, Kind},
    infra::{database, Database},
    read::{self, report::PerformanceReport},
    Query, Service,
};

use super::InvertedPeriod;

/// [`Query`] aggregating the [`PerformanceReport`] of every [`Salesperson`]
/// for the [`Sale`]s happened strictly between the provided moments.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Performance {
    /// Start of the period.
    pub start: DateTime,

    /// End of the period.
    pub end: DateTime,
}

impl<Db> Query<Performance> for Service<Db>
where
    Db: Database<
            Select<By<Vec<Salesperson>, read::salesperson::All>>,
            Ok = Vec<Salesperson>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Sale>, read::Period>>,
            Ok = Vec<Sale>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = PerformanceReport;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        Performance { start, end }: Performance,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let period =
            super::period(start, end).map_err(tracerr::from_and_wrap!(=> E))?;

        let salespeople = self
            .database()
            .execute(Select(By::<Vec<Salesperson>, _>::new(
                read::salesperson::All,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if salespeople.is_empty() {
            return Err(tracerr::new!(E::NoSalespeople));
        }

        let sales = self
            .database()
            .execute(Select(By::<Vec<Sale>, _>::new(period)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        PerformanceReport::aggregate(period, salespeople, &sales)
            .ok_or(E::NoSalespeople)
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`Performance`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Requested period is inverted.
    #[display("Invalid period: {_0}")]
    #[from]
    Period(InvertedPeriod),

    /// There is no [`Salesperson`] to report on.
    #[display("No `Salesperson` exists")]
    NoSalespeople,
}

impl Classify for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::Period(_) => Kind::InvalidInput,
            Self::NoSalespeople => Kind::NotFound,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::{operations::Insert, DateTime, Money};

    use crate::{
        command::hire_salesperson,
        domain::{sale, vehicle, Salesperson},
        error::{Classify as _, Kind},
        infra::{Database as _, Memory},
        Config, Service,
    };

    use super::Performance;

    fn day(d: u8) -> DateTime {
        DateTime::from_ymd(2024, 6, d).unwrap()
    }

    async fn hire(svc: &Service<Memory>, number: &str) -> Salesperson {
        svc.execute(hire_salesperson::spec::hire(number)).await.unwrap()
    }

    #[tokio::test]
    async fn includes_idle_salespeople() {
        let svc = Service::new(Config::default(), Memory::new());
        let ann = hire(&svc, "E-001").await;
        let bob = hire(&svc, "E-002").await;
        let car = vehicle::Id::new();
        svc.database()
            .execute(Insert(sale::spec::sale(car, bob.id, 50_000, day(10))))
            .await
            .unwrap();

        let report = svc
            .execute(Performance {
                start: day(1),
                end: day(30),
            })
            .await
            .unwrap();

        assert_eq!(report.top_salesperson.id, bob.id);
        assert_eq!(report.salespeople.len(), 2);
        assert_eq!(report.salespeople[0].salesperson.id, ann.id);
        assert_eq!(report.salespeople[0].total_sales, 0);
        assert_eq!(report.salespeople[1].commission, Money::from(1_000));
    }

    #[tokio::test]
    async fn fails_without_salespeople() {
        let svc = Service::new(Config::default(), Memory::new());

        let err = svc
            .execute(Performance {
                start: day(1),
                end: day(30),
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::NotFound);
    }
}
