//! [`CreditApplication`] definition.

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{customer, CreditDecision, Customer},
    error::{Classify, Kind},
    infra::{database, Database},
    Query, Service,
};

/// [`Query`] deciding upon the credit for a [`Customer`].
#[derive(Clone, Copy, Debug)]
pub struct CreditApplication {
    /// ID of the applying [`Customer`].
    pub customer_id: customer::Id,
}

impl<Db> Query<CreditApplication> for Service<Db>
where
    Db: Database<
        Select<By<Option<Customer>, customer::Id>>,
        Ok = Option<Customer>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = CreditDecision;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        CreditApplication { customer_id }: CreditApplication,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let customer = self
            .database()
            .execute(Select(By::<Option<Customer>, _>::new(customer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CustomerNotExists(customer_id))
            .map_err(tracerr::wrap!())?;

        Ok(CreditDecision::evaluate(
            &customer,
            self.config().credit_scorer.as_ref(),
            DateTime::now(),
        ))
    }
}

/// Error of [`CreditApplication`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Customer`] with the provided ID doesn't exist.
    #[display("`Customer(id: {_0})` doesn't exist")]
    CustomerNotExists(#[error(not(source))] customer::Id),
}

impl Classify for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::CustomerNotExists(_) => Kind::NotFound,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::{
        domain::{credit, customer},
        error::{Classify as _, Kind},
        infra::{Database as _, Memory},
        Config, Service,
    };

    use super::CreditApplication;

    #[tokio::test]
    async fn uses_stored_score() {
        let svc = Service::new(Config::default(), Memory::new());
        let mut c = customer::spec::customer();
        c.credit_score = credit::Score::new(710);
        svc.database().execute(Insert(c.clone())).await.unwrap();

        let decision = svc
            .execute(CreditApplication { customer_id: c.id })
            .await
            .unwrap();

        assert!(decision.approved);
        assert_eq!(decision.score.value(), 710);
        assert_eq!(decision.reason, credit::Reason::GoodScore);
    }

    #[tokio::test]
    async fn fails_for_unknown_customer() {
        let svc = Service::new(Config::default(), Memory::new());

        let err = svc
            .execute(CreditApplication {
                customer_id: customer::Id::new(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::NotFound);
    }
}
