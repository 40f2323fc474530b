//! In-process [`Database`] implementation.
//!
//! Keeps every entity in insertion order. [`Transact`]ing takes an exclusive
//! lock on the whole [`State`] until the transaction is committed or dropped,
//! so transactions never interleave. Dropping a [`Tx`] without a [`Commit`]
//! discards its changes.

use std::{collections::HashMap, future::Future, sync::Arc};

use common::operations::{By, Commit, Insert, Select, Transact, Update};
use derive_more::{Display, Error as StdError};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        contact::Email, customer, salesperson, vehicle, Customer, Sale,
        Salesperson, Vehicle,
    },
    infra::{database, Database},
    read,
};

/// In-process [`Database`] client.
#[derive(Clone, Debug, Default)]
pub struct Memory<T = NonTx>(T);

impl Memory {
    /// Creates a new empty [`Memory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Snapshot of all the entities stored in a [`Memory`] database.
#[derive(Clone, Debug, Default)]
pub struct State {
    customers: Vec<Customer>,
    vehicles: Vec<Vehicle>,
    salespeople: Vec<Salesperson>,
    sales: Vec<Sale>,
}

/// Non-transactional [`Memory`] client.
#[derive(Clone, Debug, Default)]
pub struct NonTx(Arc<Mutex<State>>);

/// Transactional [`Memory`] client.
#[derive(Clone, Debug)]
pub struct Tx(Arc<Mutex<Option<Staged>>>);

/// Changes of a [`Tx`] not committed yet.
#[derive(Debug)]
struct Staged {
    /// Lock on the published [`State`], held for the whole transaction.
    published: OwnedMutexGuard<State>,

    /// [`State`] the changes are applied to.
    state: State,
}

/// [`Memory`] database error.
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// [`Tx`] is used after being committed.
    #[display("transaction is already committed")]
    Committed,

    /// Stored row conflicts with an existing one.
    #[display("unique constraint `{_0}` is violated")]
    UniqueViolation(#[error(not(source))] &'static str),
}

/// Access to the [`State`] of a [`Memory`] client.
pub trait Storage {
    /// Runs the provided function over the current [`State`].
    ///
    /// # Errors
    ///
    /// If the [`State`] is not accessible anymore.
    fn read<R>(
        &self,
        f: impl FnOnce(&State) -> R,
    ) -> impl Future<Output = Result<R, Traced<database::Error>>>;

    /// Runs the provided function mutating the current [`State`].
    ///
    /// # Errors
    ///
    /// If the [`State`] is not accessible anymore.
    fn write<R>(
        &self,
        f: impl FnOnce(&mut State) -> R,
    ) -> impl Future<Output = Result<R, Traced<database::Error>>>;
}

impl Storage for NonTx {
    async fn read<R>(
        &self,
        f: impl FnOnce(&State) -> R,
    ) -> Result<R, Traced<database::Error>> {
        Ok(f(&*self.0.lock().await))
    }

    async fn write<R>(
        &self,
        f: impl FnOnce(&mut State) -> R,
    ) -> Result<R, Traced<database::Error>> {
        Ok(f(&mut *self.0.lock().await))
    }
}

impl Storage for Tx {
    async fn read<R>(
        &self,
        f: impl FnOnce(&State) -> R,
    ) -> Result<R, Traced<database::Error>> {
        let staged = self.0.lock().await;
        let staged = staged
            .as_ref()
            .ok_or(Error::Committed)
            .map_err(tracerr::from_and_wrap!(=> database::Error))?;
        Ok(f(&staged.state))
    }

    async fn write<R>(
        &self,
        f: impl FnOnce(&mut State) -> R,
    ) -> Result<R, Traced<database::Error>> {
        let mut staged = self.0.lock().await;
        let staged = staged
            .as_mut()
            .ok_or(Error::Committed)
            .map_err(tracerr::from_and_wrap!(=> database::Error))?;
        Ok(f(&mut staged.state))
    }
}

/// Row of a [`State`] table.
trait Row: Clone {
    /// Indicates whether this [`Row`] has the same identity as the `other`.
    fn is_same(&self, other: &Self) -> bool;

    /// Returns the name of the unique constraint the `other` [`Row`] violates
    /// against this one, if any.
    fn conflicts(&self, _: &Self) -> Option<&'static str> {
        None
    }
}

impl Row for Customer {
    fn is_same(&self, other: &Self) -> bool {
        self.id == other.id
    }

    fn conflicts(&self, other: &Self) -> Option<&'static str> {
        (self.email == other.email).then_some("customers_email_key")
    }
}

impl Row for Vehicle {
    fn is_same(&self, other: &Self) -> bool {
        self.id == other.id
    }

    fn conflicts(&self, other: &Self) -> Option<&'static str> {
        (self.vin == other.vin).then_some("vehicles_vin_key")
    }
}

impl Row for Salesperson {
    fn is_same(&self, other: &Self) -> bool {
        self.id == other.id
    }

    fn conflicts(&self, other: &Self) -> Option<&'static str> {
        (self.employee_number == other.employee_number)
            .then_some("salespeople_employee_number_key")
    }
}

impl Row for Sale {
    fn is_same(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<S: Storage> Memory<S> {
    /// Inserts the provided [`Row`] into the table, replacing the one with
    /// the same identity.
    async fn upsert<R: Row>(
        &self,
        table: impl FnOnce(&mut State) -> &mut Vec<R>,
        row: R,
    ) -> Result<(), Traced<database::Error>> {
        self.0
            .write(|s| {
                let rows = table(s);
                if let Some(constraint) = rows
                    .iter()
                    .filter(|r| !r.is_same(&row))
                    .find_map(|r| r.conflicts(&row))
                {
                    return Err(Error::UniqueViolation(constraint));
                }
                if let Some(existing) = rows.iter_mut().find(|r| r.is_same(&row))
                {
                    *existing = row;
                } else {
                    rows.push(row);
                }
                Ok(())
            })
            .await
            .map_err(tracerr::wrap!())?
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl Database<Transact> for Memory<NonTx> {
    type Ok = Memory<Tx>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        let published = Arc::clone(&self.0 .0).lock_owned().await;
        let state = published.clone();
        Ok(Memory(Tx(Arc::new(Mutex::new(Some(Staged {
            published,
            state,
        }))))))
    }
}

impl Database<Transact> for Memory<Tx> {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        let Staged {
            mut published,
            state,
        } = self.0 .0
            .lock()
            .await
            .take()
            .ok_or(Error::Committed)
            .map_err(tracerr::from_and_wrap!(=> database::Error))?;
        *published = state;
        Ok(())
    }
}

impl<S: Storage> Database<Select<By<Option<Customer>, customer::Id>>>
    for Memory<S>
{
    type Ok = Option<Customer>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Customer>, customer::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0
            .read(|s| s.customers.iter().find(|c| c.id == id).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Select<By<Option<Customer>, Email>>> for Memory<S> {
    type Ok = Option<Customer>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Customer>, Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();
        self.0
            .read(|s| s.customers.iter().find(|c| c.email == email).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Select<By<Vec<Customer>, read::customer::All>>>
    for Memory<S>
{
    type Ok = Vec<Customer>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Customer>, read::customer::All>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .read(|s| s.customers.clone())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Insert<Customer>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(customer): Insert<Customer>,
    ) -> Result<Self::Ok, Self::Err> {
        self.upsert(|s| &mut s.customers, customer)
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S, IDs> Database<Select<By<HashMap<vehicle::Id, Vehicle>, IDs>>>
    for Memory<S>
where
    S: Storage,
    IDs: AsRef<[vehicle::Id]>,
{
    type Ok = HashMap<vehicle::Id, Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<vehicle::Id, Vehicle>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        let ids = ids.as_ref();
        self.0
            .read(|s| {
                s.vehicles
                    .iter()
                    .filter(|v| ids.contains(&v.id))
                    .map(|v| (v.id, v.clone()))
                    .collect()
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Select<By<Option<Vehicle>, vehicle::Id>>>
    for Memory<S>
{
    type Ok = Option<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Vehicle>, vehicle::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0
            .read(|s| s.vehicles.iter().find(|v| v.id == id).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Select<By<Option<Vehicle>, vehicle::Vin>>>
    for Memory<S>
{
    type Ok = Option<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Vehicle>, vehicle::Vin>>,
    ) -> Result<Self::Ok, Self::Err> {
        let vin = by.into_inner();
        self.0
            .read(|s| s.vehicles.iter().find(|v| v.vin == vin).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Select<By<Vec<Vehicle>, read::vehicle::All>>>
    for Memory<S>
{
    type Ok = Vec<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Vehicle>, read::vehicle::All>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .read(|s| s.vehicles.clone())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Insert<Vehicle>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(vehicle): Insert<Vehicle>,
    ) -> Result<Self::Ok, Self::Err> {
        self.upsert(|s| &mut s.vehicles, vehicle)
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Update<vehicle::StatusTransition>> for Memory<S> {
    type Ok = read::vehicle::Transitioned;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(transition): Update<vehicle::StatusTransition>,
    ) -> Result<Self::Ok, Self::Err> {
        let vehicle::StatusTransition { id, from, to, at } = transition;
        self.0
            .write(|s| match s.vehicles.iter_mut().find(|v| v.id == id) {
                Some(v) if from.contains(&v.status) => {
                    v.status = to;
                    v.updated_at = at;
                    read::vehicle::Transitioned::Applied(v.clone())
                }
                Some(_) | None => {
                    log::debug!("`Vehicle({id})` status is not in {from:?}");
                    read::vehicle::Transitioned::Rejected
                }
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Select<By<Option<Salesperson>, salesperson::Id>>>
    for Memory<S>
{
    type Ok = Option<Salesperson>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Salesperson>, salesperson::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0
            .read(|s| s.salespeople.iter().find(|p| p.id == id).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Select<By<Vec<Salesperson>, read::salesperson::All>>>
    for Memory<S>
{
    type Ok = Vec<Salesperson>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Salesperson>, read::salesperson::All>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .read(|s| s.salespeople.clone())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Insert<Salesperson>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(salesperson): Insert<Salesperson>,
    ) -> Result<Self::Ok, Self::Err> {
        self.upsert(|s| &mut s.salespeople, salesperson)
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Insert<Sale>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(sale): Insert<Sale>,
    ) -> Result<Self::Ok, Self::Err> {
        self.upsert(|s| &mut s.sales, sale)
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Select<By<Vec<Sale>, customer::Id>>> for Memory<S> {
    type Ok = Vec<Sale>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Sale>, customer::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0
            .read(|s| {
                s.sales
                    .iter()
                    .filter(|sale| sale.customer_id == id)
                    .cloned()
                    .collect()
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Select<By<Vec<Sale>, read::Period>>> for Memory<S> {
    type Ok = Vec<Sale>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Sale>, read::Period>>,
    ) -> Result<Self::Ok, Self::Err> {
        let period = by.into_inner();
        self.0
            .read(|s| {
                s.sales
                    .iter()
                    .filter(|sale| period.contains(sale.sold_at))
                    .cloned()
                    .collect()
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Commit, Insert, Select, Transact, Update},
        DateTime,
    };

    use super::Memory;
    use crate::{
        domain::{
            customer::spec::customer,
            vehicle::{self, spec::vehicle},
            Customer, Vehicle,
        },
        infra::{database, Database},
        read::vehicle::Transitioned,
    };

    #[tokio::test]
    async fn commits_transaction() {
        let db = Memory::new();
        let c = customer();

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Insert(c.clone())).await.unwrap();
        tx.execute(Commit).await.unwrap();

        let found: Option<Customer> =
            db.execute(Select(By::<Option<Customer>, _>::new(c.id))).await.unwrap();
        assert_eq!(found.map(|c| c.email), Some(c.email));
    }

    #[tokio::test]
    async fn discards_dropped_transaction() {
        let db = Memory::new();
        let v = vehicle("Ford", 2020, 15_000);

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Insert(v.clone())).await.unwrap();
        drop(tx);

        let found: Option<Vehicle> =
            db.execute(Select(By::<Option<Vehicle>, _>::new(v.id))).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn rejects_second_commit() {
        let db = Memory::new();

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Commit).await.unwrap();

        let err = tx.execute(Commit).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            database::Error::Memory(super::Error::Committed),
        ));
    }

    #[tokio::test]
    async fn rejects_duplicate_email() {
        let db = Memory::new();
        let first = customer();
        let mut second = customer();
        second.email = first.email.clone();

        db.execute(Insert(first)).await.unwrap();
        let err = db.execute(Insert(second)).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            database::Error::Memory(super::Error::UniqueViolation(_)),
        ));
    }

    #[tokio::test]
    async fn transitions_status_only_from_expected() {
        let db = Memory::new();
        let v = vehicle("Ford", 2020, 15_000);
        db.execute(Insert(v.clone())).await.unwrap();

        let reserve = || {
            Update(vehicle::StatusTransition {
                id: v.id,
                from: vec![vehicle::Status::Available],
                to: vehicle::Status::Reserved,
                at: DateTime::now().coerce(),
            })
        };

        let applied = db.execute(reserve()).await.unwrap();
        assert!(matches!(
            applied,
            Transitioned::Applied(v) if v.status == vehicle::Status::Reserved,
        ));

        let rejected = db.execute(reserve()).await.unwrap();
        assert!(matches!(rejected, Transitioned::Rejected));
    }
}
