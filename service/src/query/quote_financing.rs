//! [`QuoteFinancing`] definition.

use common::{
    operations::{By, Select},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        customer,
        financing::{self, FinancingOptions},
        vehicle, CreditDecision, Customer, Vehicle,
    },
    error::{Classify, Kind},
    infra::{database, Database},
    Query, Service,
};

/// [`Query`] quoting the [`FinancingOptions`] a [`Customer`] is offered for
/// buying a [`Vehicle`].
#[derive(Clone, Copy, Debug)]
pub struct QuoteFinancing {
    /// ID of the [`Vehicle`] to finance.
    pub vehicle_id: vehicle::Id,

    /// ID of the [`Customer`] asking for the financing.
    pub customer_id: customer::Id,

    /// Amount paid upfront.
    pub down_payment: Money,
}

impl<Db> Query<QuoteFinancing> for Service<Db>
where
    Db: Database<
            Select<By<Option<Vehicle>, vehicle::Id>>,
            Ok = Option<Vehicle>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Customer>, customer::Id>>,
            Ok = Option<Customer>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = FinancingOptions;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: QuoteFinancing,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let QuoteFinancing {
            vehicle_id,
            customer_id,
            down_payment,
        } = query;

        let vehicle = self
            .database()
            .execute(Select(By::<Option<Vehicle>, _>::new(vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::VehicleNotExists(vehicle_id))
            .map_err(tracerr::wrap!())?;
        let customer = self
            .database()
            .execute(Select(By::<Option<Customer>, _>::new(customer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CustomerNotExists(customer_id))
            .map_err(tracerr::wrap!())?;

        let credit = CreditDecision::evaluate(
            &customer,
            self.config().credit_scorer.as_ref(),
            DateTime::now(),
        );
        let loan_amount =
            financing::loan_amount(vehicle.price, down_payment, &credit)
                .map_err(|e| {
                    log::debug!(
                        "Financing of `Vehicle({vehicle_id})` for \
                         `Customer({customer_id})` refused: {e}",
                    );
                    tracerr::new!(E::Refused(e))
                })?;
        let options = financing::build_menu(loan_amount, credit.interest_rate)
            .ok_or(E::Unquotable)
            .map_err(tracerr::wrap!())?;

        Ok(FinancingOptions {
            customer_id,
            vehicle_id,
            loan_amount,
            credit,
            options,
        })
    }
}

/// Error of [`QuoteFinancing`] [`Query`] execution.
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

    /// Financing is refused.
    #[display("Financing is refused: {_0}")]
    Refused(financing::Refusal),

    /// Loan cannot be amortized over the standard terms.
    #[display("Loan cannot be quoted")]
    Unquotable,
}

impl Classify for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::VehicleNotExists(_) | Self::CustomerNotExists(_) => {
                Kind::NotFound
            }
            Self::Refused(r) if r.is_input() => Kind::InvalidInput,
            Self::Refused(_) | Self::Unquotable => Kind::InvalidState,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::{operations::Insert, Money, Percent};

    use crate::{
        domain::{
            credit::Score, customer, vehicle::spec::vehicle, Customer, Vehicle,
        },
        error::{Classify as _, Kind},
        infra::{Database as _, Memory},
        Config, Service,
    };

    use super::QuoteFinancing;

    async fn seed(
        svc: &Service<Memory>,
        score: u16,
        price: u32,
    ) -> (Customer, Vehicle) {
        let mut c = customer::spec::customer();
        c.credit_score = Score::new(score);
        let v = vehicle("Subaru", 2023, price);
        svc.database().execute(Insert(c.clone())).await.unwrap();
        svc.database().execute(Insert(v.clone())).await.unwrap();
        (c, v)
    }

    #[tokio::test]
    async fn quotes_four_standard_terms() {
        let svc = Service::new(Config::default(), Memory::new());
        let (c, v) = seed(&svc, 780, 5_700).await;

        let quote = svc
            .execute(QuoteFinancing {
                vehicle_id: v.id,
                customer_id: c.id,
                down_payment: Money::from(5_000),
            })
            .await
            .unwrap();

        assert!(quote.credit.approved);
        assert_eq!(quote.loan_amount, Money::from(700));
        let terms: Vec<_> = quote.options.iter().map(|o| o.term_months).collect();
        assert_eq!(terms, [36, 48, 60, 72]);
        assert_eq!(
            quote.options[0].interest_rate,
            Percent::from_basis_points(350).unwrap(),
        );
        assert_eq!(quote.options[0].monthly_payment, "20.51".parse().unwrap());
    }

    #[tokio::test]
    async fn refuses_loan_above_credit_limit() {
        let svc = Service::new(Config::default(), Memory::new());
        let (c, v) = seed(&svc, 780, 30_000).await;

        let err = svc
            .execute(QuoteFinancing {
                vehicle_id: v.id,
                customer_id: c.id,
                down_payment: Money::from(5_000),
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::InvalidState);
    }

    #[tokio::test]
    async fn refuses_unapproved_customer() {
        let svc = Service::new(Config::default(), Memory::new());
        let (c, v) = seed(&svc, 640, 1_000).await;

        let err = svc
            .execute(QuoteFinancing {
                vehicle_id: v.id,
                customer_id: c.id,
                down_payment: Money::from(900),
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::InvalidState);
    }

    #[tokio::test]
    async fn rejects_malformed_down_payment() {
        let svc = Service::new(Config::default(), Memory::new());
        let (c, v) = seed(&svc, 800, 1_000).await;

        for down_payment in ["-1".parse().unwrap(), Money::from(1_001)] {
            let err = svc
                .execute(QuoteFinancing {
                    vehicle_id: v.id,
                    customer_id: c.id,
                    down_payment,
                })
                .await
                .unwrap_err();

            assert_eq!(err.kind(), Kind::InvalidInput);
        }
    }

    #[tokio::test]
    async fn requires_existing_vehicle() {
        let svc = Service::new(Config::default(), Memory::new());
        let (c, _) = seed(&svc, 800, 1_000).await;

        let err = svc
            .execute(QuoteFinancing {
                vehicle_id: crate::domain::vehicle::Id::new(),
                customer_id: c.id,
                down_payment: Money::ZERO,
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::NotFound);
    }
}
