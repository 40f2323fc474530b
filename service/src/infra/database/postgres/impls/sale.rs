//! [`Sale`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{customer, Sale},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `sales` table, in the order [`from_row()`] expects.
const COLUMNS: &str = "\
    id, vehicle_id, customer_id, salesperson_id, \
    price, down_payment, financed_amount, financing_term, interest_rate, \
    payment_method, status, notes, \
    sold_at, created_at, updated_at";

/// Builds a [`Sale`] out of the provided `sales` [`Row`].
fn from_row(row: &Row) -> Sale {
    Sale {
        id: row.get("id"),
        vehicle_id: row.get("vehicle_id"),
        customer_id: row.get("customer_id"),
        salesperson_id: row.get("salesperson_id"),
        price: row.get("price"),
        down_payment: row.get("down_payment"),
        financed_amount: row.get("financed_amount"),
        financing_term: row
            .get::<_, Option<i16>>("financing_term")
            .and_then(|t| u16::try_from(t).ok()),
        interest_rate: row.get("interest_rate"),
        payment_method: row.get("payment_method"),
        status: row.get("status"),
        notes: row.get("notes"),
        sold_at: row.get("sold_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C> Database<Select<By<Vec<Sale>, customer::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Sale>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Sale>, customer::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let customer_id: customer::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} FROM sales \
             WHERE customer_id = $1::UUID \
             ORDER BY sold_at, id",
        );
        Ok(self
            .query(sql.as_str(), &[&customer_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<Vec<Sale>, read::Period>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Sale>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Sale>, read::Period>>,
    ) -> Result<Self::Ok, Self::Err> {
        let period: read::Period = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} FROM sales \
             WHERE sold_at > $1::TIMESTAMPTZ AND sold_at < $2::TIMESTAMPTZ \
             ORDER BY sold_at, id",
        );
        Ok(self
            .query(sql.as_str(), &[&period.start(), &period.end()])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Sale>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(sale): Insert<Sale>,
    ) -> Result<Self::Ok, Self::Err> {
        let Sale {
            id,
            vehicle_id,
            customer_id,
            salesperson_id,
            price,
            down_payment,
            financed_amount,
            financing_term,
            interest_rate,
            payment_method,
            status,
            notes,
            sold_at,
            created_at,
            updated_at,
        } = sale;
        let financing_term =
            financing_term.and_then(|t| i16::try_from(t).ok());

        const SQL: &str = "\
            INSERT INTO sales (\
                id, vehicle_id, customer_id, salesperson_id, \
                price, down_payment, financed_amount, \
                financing_term, interest_rate, \
                payment_method, status, notes, \
                sold_at, created_at, updated_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::UUID, \
                $5::NUMERIC, $6::NUMERIC, $7::NUMERIC, \
                $8::INT2, $9::NUMERIC, \
                $10::INT2, $11::INT2, $12::TEXT, \
                $13::TIMESTAMPTZ, $14::TIMESTAMPTZ, $15::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET status = EXCLUDED.status, \
                notes = EXCLUDED.notes, \
                updated_at = EXCLUDED.updated_at";
        self.exec(
            SQL,
            &[
                &id,
                &vehicle_id,
                &customer_id,
                &salesperson_id,
                &price,
                &down_payment,
                &financed_amount,
                &financing_term,
                &interest_rate,
                &payment_method,
                &status,
                &notes,
                &sold_at,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
