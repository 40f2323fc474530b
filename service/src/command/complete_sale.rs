//! [`Command`] for completing a [`SalesSession`] with a [`Sale`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted, Update},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use serde::Serialize;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        customer, financing,
        financing::StandardTerm,
        sale::{self, Contract, FinancingDetails},
        salesperson, session, vehicle, CreditDecision, Customer, Sale,
        SalesSession, Salesperson, Vehicle,
    },
    error::{Classify, Kind},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for completing a [`SalesSession`] by recording a
/// [`sale::Status::Completed`] [`Sale`] and marking its [`Vehicle`] as
/// [`vehicle::Status::Sold`].
#[derive(Clone, Debug)]
pub struct CompleteSale {
    /// [`SalesSession`] to complete.
    pub session: SalesSession,

    /// [`sale::PaymentMethod`] of the [`Sale`].
    pub payment_method: sale::PaymentMethod,

    /// Amount paid upfront.
    ///
    /// Ignored for [`sale::PaymentMethod::Cash`], which pays the whole price.
    pub down_payment: Money,

    /// [`StandardTerm`] of the financing, defaults to
    /// [`StandardTerm::Months36`].
    ///
    /// Ignored for [`sale::PaymentMethod::Cash`].
    pub term: Option<StandardTerm>,

    /// [`sale::Notes`] on the [`Sale`], if any.
    pub notes: Option<sale::Notes>,
}

/// Result of a [`CompleteSale`] [`Command`].
#[derive(Clone, Debug, Serialize)]
pub struct Completed {
    /// Recorded [`Sale`].
    pub sale: Sale,

    /// [`Contract`] generated for the [`Sale`].
    pub contract: Contract,

    /// [`FinancingDetails`] of the [`Sale`], if it's financed.
    pub financing: Option<FinancingDetails>,

    /// Completed [`SalesSession`].
    pub session: SalesSession,

    /// Commission earned for the [`Sale`].
    pub commission: Money,
}

impl<Db> Command<CompleteSale> for Service<Db>
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
            Select<By<Option<Salesperson>, salesperson::Id>>,
            Ok = Option<Salesperson>,
            Err = Traced<database::Error>,
        > + Database<
            Update<vehicle::StatusTransition>,
            Ok = read::vehicle::Transitioned,
            Err = Traced<database::Error>,
        > + Database<Insert<Sale>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Completed;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CompleteSale) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CompleteSale {
            mut session,
            payment_method,
            down_payment,
            term,
            notes,
        } = cmd;

        let now = DateTime::now();
        if session.status != session::Status::Active {
            return Err(tracerr::new!(E::SessionNotActive(session.status)));
        }
        if session.is_expired(self.config().sales_session_ttl, now) {
            log::warn!("`SalesSession({})` is expired", session.id);
            return Err(tracerr::new!(E::SessionExpired(session.id)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let vehicle_id = session.vehicle.id;
        let vehicle = tx
            .execute(Select(By::<Option<Vehicle>, _>::new(vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::VehicleNotExists(vehicle_id))
            .map_err(tracerr::wrap!())?;
        let customer_id = session.customer.id;
        let customer = tx
            .execute(Select(By::<Option<Customer>, _>::new(customer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CustomerNotExists(customer_id))
            .map_err(tracerr::wrap!())?;
        let salesperson_id = session.salesperson.id;
        _ = tx
            .execute(Select(By::<Option<Salesperson>, _>::new(salesperson_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::SalespersonNotExists(salesperson_id))
            .map_err(tracerr::wrap!())?;

        if !vehicle.status.is_sellable() {
            log::warn!(
                "`Vehicle({vehicle_id})` cannot be sold being {}",
                vehicle.status,
            );
            return Err(tracerr::new!(E::NotSellable(vehicle.status)));
        }

        let price = vehicle.price;
        let details = if payment_method.is_credit() {
            let credit = CreditDecision::evaluate(
                &customer,
                self.config().credit_scorer.as_ref(),
                now,
            );
            let loan = financing::loan_amount(price, down_payment, &credit)
                .map_err(tracerr::from_and_wrap!(=> E))?;
            let term = term.unwrap_or(StandardTerm::Months36);
            let option = term
                .quote(loan, credit.interest_rate)
                .ok_or(E::Unquotable(term))
                .map_err(tracerr::wrap!())?;
            Some(FinancingDetails {
                loan_amount: loan,
                interest_rate: option.interest_rate,
                monthly_payment: option.monthly_payment,
                term_months: option.term_months,
            })
        } else {
            None
        };

        let transitioned = tx
            .execute(Update(vehicle::StatusTransition {
                id: vehicle_id,
                from: vec![vehicle::Status::Available, vehicle::Status::Reserved],
                to: vehicle::Status::Sold,
                at: now.coerce(),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if let read::vehicle::Transitioned::Rejected = transitioned {
            return Err(tracerr::new!(E::NotSellable(vehicle.status)));
        }

        let sale = Sale {
            id: sale::Id::new(),
            vehicle_id,
            customer_id,
            salesperson_id,
            price,
            down_payment: details.map_or(price, |f| price - f.loan_amount),
            financed_amount: details.map_or(Money::ZERO, |f| f.loan_amount),
            financing_term: details.map(|f| f.term_months),
            interest_rate: details.map(|f| f.interest_rate),
            payment_method,
            status: sale::Status::Completed,
            notes,
            sold_at: now.coerce(),
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };
        tx.execute(Insert(sale.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        session
            .complete()
            .map_err(|e| tracerr::new!(E::SessionNotActive(e.0)))?;

        log::info!(
            "`Sale({})` of `Vehicle({vehicle_id})` completed by \
             `Salesperson({salesperson_id})`",
            sale.id,
        );

        Ok(Completed {
            contract: Contract::standard(&sale),
            sale,
            financing: details,
            session,
            commission: sale::FIXED_COMMISSION,
        })
    }
}

/// Error of [`CompleteSale`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`SalesSession`] is already finished.
    #[display("`SalesSession` is already {_0}")]
    SessionNotActive(#[error(not(source))] session::Status),

    /// [`SalesSession`] outlived its time to live.
    #[display("`SalesSession({_0})` is expired")]
    SessionExpired(#[error(not(source))] session::Id),

    /// [`Vehicle`] with the provided ID doesn't exist.
    #[display("`Vehicle(id: {_0})` doesn't exist")]
    VehicleNotExists(#[error(not(source))] vehicle::Id),

    /// [`Customer`] with the provided ID doesn't exist.
    #[display("`Customer(id: {_0})` doesn't exist")]
    CustomerNotExists(#[error(not(source))] customer::Id),

    /// [`Salesperson`] with the provided ID doesn't exist.
    #[display("`Salesperson(id: {_0})` doesn't exist")]
    SalespersonNotExists(#[error(not(source))] salesperson::Id),

    /// [`Vehicle`] is neither available nor reserved.
    #[display("`Vehicle` is {_0} and cannot be sold")]
    NotSellable(#[error(not(source))] vehicle::Status),

    /// Financing is refused.
    #[display("Financing is refused: {_0}")]
    #[from]
    Refused(financing::Refusal),

    /// [`StandardTerm`] cannot be quoted for the loan.
    #[display("`{_0:?}` term cannot be quoted")]
    Unquotable(#[error(not(source))] StandardTerm),
}

impl Classify for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::VehicleNotExists(_)
            | Self::CustomerNotExists(_)
            | Self::SalespersonNotExists(_) => Kind::NotFound,
            Self::Refused(r) if r.is_input() => Kind::InvalidInput,
            Self::SessionNotActive(_)
            | Self::SessionExpired(_)
            | Self::NotSellable(_)
            | Self::Refused(_)
            | Self::Unquotable(_) => Kind::InvalidState,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{
        operations::{By, Insert, Select},
        DateTime, Money,
    };

    use crate::{
        command::{start_sale, StartSale},
        domain::{
            credit::Score, financing::StandardTerm, sale, session, vehicle,
            Sale, SalesSession, Vehicle,
        },
        error::{Classify as _, Kind},
        infra::{Database as _, Memory},
        Config, Service,
    };

    use super::CompleteSale;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    async fn start(
        svc: &Service<Memory>,
        status: vehicle::Status,
        price: u32,
    ) -> SalesSession {
        let (c, v, s) = start_sale::spec::seed(svc, status, price).await;
        svc.execute(StartSale {
            customer_id: c.id,
            vehicle_id: v.id,
            salesperson_id: s.id,
        })
        .await
        .unwrap()
    }

    fn cash(session: SalesSession) -> CompleteSale {
        CompleteSale {
            session,
            payment_method: sale::PaymentMethod::Cash,
            down_payment: Money::ZERO,
            term: None,
            notes: None,
        }
    }

    async fn stored(svc: &Service<Memory>, id: vehicle::Id) -> Vehicle {
        svc.database()
            .execute(Select(By::<Option<Vehicle>, _>::new(id)))
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn completes_cash_sale() {
        let svc = Service::new(Config::default(), Memory::new());
        let session = start(&svc, vehicle::Status::Reserved, 20_000).await;
        let vehicle_id = session.vehicle.id;

        let done = svc.execute(cash(session)).await.unwrap();

        assert_eq!(done.sale.status, sale::Status::Completed);
        assert_eq!(done.sale.price, Money::from(20_000));
        assert_eq!(done.sale.down_payment, Money::from(20_000));
        assert_eq!(done.sale.financed_amount, Money::ZERO);
        assert!(done.financing.is_none());
        assert_eq!(done.contract.sale_id, done.sale.id);
        assert_eq!(done.commission, sale::FIXED_COMMISSION);
        assert_eq!(done.session.status, session::Status::Completed);
        assert_eq!(
            stored(&svc, vehicle_id).await.status,
            vehicle::Status::Sold,
        );
    }

    #[tokio::test]
    async fn finances_within_credit_limit() {
        let svc = Service::new(Config::default(), Memory::new());
        let session = start(&svc, vehicle::Status::Available, 5_700).await;
        let mut customer = session.customer.clone();
        customer.credit_score = Score::new(780);
        svc.database()
            .execute(Insert(customer))
            .await
            .unwrap();

        let done = svc
            .execute(CompleteSale {
                session,
                payment_method: sale::PaymentMethod::Finance,
                down_payment: Money::from(5_000),
                term: Some(StandardTerm::Months48),
                notes: None,
            })
            .await
            .unwrap();

        let financing = done.financing.unwrap();
        assert_eq!(financing.loan_amount, Money::from(700));
        assert_eq!(financing.term_months, 48);
        assert_eq!(financing.interest_rate.to_string(), "4%");
        assert_eq!(financing.monthly_payment, money("15.81"));
        assert_eq!(done.sale.financed_amount, Money::from(700));
        assert_eq!(done.sale.down_payment, Money::from(5_000));
        assert_eq!(done.sale.financing_term, Some(48));
    }

    #[tokio::test]
    async fn refuses_loan_above_credit_limit() {
        let svc = Service::new(Config::default(), Memory::new());
        let session = start(&svc, vehicle::Status::Available, 30_000).await;
        let vehicle_id = session.vehicle.id;

        let err = svc
            .execute(CompleteSale {
                session,
                payment_method: sale::PaymentMethod::Lease,
                down_payment: Money::from(5_000),
                term: None,
                notes: None,
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::InvalidState);
        assert_eq!(
            stored(&svc, vehicle_id).await.status,
            vehicle::Status::Available,
        );
    }

    #[tokio::test]
    async fn rejects_excessive_down_payment() {
        let svc = Service::new(Config::default(), Memory::new());
        let session = start(&svc, vehicle::Status::Available, 1_000).await;

        let err = svc
            .execute(CompleteSale {
                session,
                payment_method: sale::PaymentMethod::Finance,
                down_payment: Money::from(1_001),
                term: None,
                notes: None,
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::InvalidInput);
    }

    #[tokio::test]
    async fn sells_vehicle_only_once() {
        let svc = Service::new(Config::default(), Memory::new());
        let session = start(&svc, vehicle::Status::Available, 10_000).await;

        _ = svc.execute(cash(session.clone())).await.unwrap();
        let err = svc.execute(cash(session)).await.unwrap_err();

        assert_eq!(err.kind(), Kind::InvalidState);
    }

    #[tokio::test]
    async fn refuses_finished_or_expired_session() {
        let svc = Service::new(Config::default(), Memory::new());

        let mut session = start(&svc, vehicle::Status::Available, 10_000).await;
        session.cancel().unwrap();
        let err = svc.execute(cash(session)).await.unwrap_err();
        assert_eq!(err.kind(), Kind::InvalidState);

        let mut session = start(&svc, vehicle::Status::Available, 10_000).await;
        session.started_at =
            (DateTime::now() - Duration::from_secs(3 * 60 * 60)).coerce();
        let err = svc.execute(cash(session)).await.unwrap_err();
        assert_eq!(err.kind(), Kind::InvalidState);
    }

    #[tokio::test]
    async fn discards_sale_of_unsellable_vehicle() {
        let svc = Service::new(Config::default(), Memory::new());
        let session = start(&svc, vehicle::Status::Available, 10_000).await;
        let customer_id = session.customer.id;
        let mut serviced = stored(&svc, session.vehicle.id).await;
        serviced.status = vehicle::Status::Maintenance;
        svc.database()
            .execute(Insert(serviced))
            .await
            .unwrap();

        let err = svc.execute(cash(session)).await.unwrap_err();

        assert_eq!(err.kind(), Kind::InvalidState);
        let sales = svc
            .database()
            .execute(Select(By::<Vec<Sale>, _>::new(customer_id)))
            .await
            .unwrap();
        assert!(sales.is_empty());
    }
}
