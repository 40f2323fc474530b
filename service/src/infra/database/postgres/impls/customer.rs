//! [`Customer`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use postgres_types::Json;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{contact::Email, credit, customer, Customer},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `customers` table, in the order [`from_row()`] expects.
const COLUMNS: &str = "\
    id, first_name, last_name, \
    email, phone, \
    address, city, state, zip_code, \
    born_at, credit_score, preferences, \
    created_at, updated_at";

/// Builds a [`Customer`] out of the provided `customers` [`Row`].
fn from_row(row: &Row) -> Customer {
    Customer {
        id: row.get("id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
        phone: row.get("phone"),
        address: row.get("address"),
        city: row.get("city"),
        state: row.get("state"),
        zip_code: row.get("zip_code"),
        born_at: row.get("born_at"),
        credit_score: row
            .get::<_, Option<i16>>("credit_score")
            .and_then(|s| u16::try_from(s).ok())
            .and_then(credit::Score::new),
        preferences: row
            .get::<_, Json<customer::Preferences>>("preferences")
            .0,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C> Database<Select<By<Option<Customer>, customer::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Customer>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Customer>, customer::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id: customer::Id = by.into_inner();

        let sql = format!("SELECT {COLUMNS} FROM customers WHERE id = $1::UUID");
        Ok(self
            .query_opt(sql.as_str(), &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Option<Customer>, Email>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Customer>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Customer>, Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email: Email = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} FROM customers WHERE email = $1::VARCHAR",
        );
        Ok(self
            .query_opt(sql.as_str(), &[&email])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Vec<Customer>, read::customer::All>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Customer>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Customer>, read::customer::All>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sql =
            format!("SELECT {COLUMNS} FROM customers ORDER BY created_at, id");
        Ok(self
            .query(sql.as_str(), &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Customer>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(customer): Insert<Customer>,
    ) -> Result<Self::Ok, Self::Err> {
        let Customer {
            id,
            first_name,
            last_name,
            email,
            phone,
            address,
            city,
            state,
            zip_code,
            born_at,
            credit_score,
            preferences,
            created_at,
            updated_at,
        } = customer;
        let credit_score = credit_score
            .and_then(|s| i16::try_from(s.value()).ok());

        const SQL: &str = "\
            INSERT INTO customers (\
                id, first_name, last_name, \
                email, phone, \
                address, city, state, zip_code, \
                born_at, credit_score, preferences, \
                created_at, updated_at\
            ) \
            VALUES (\
                $1::UUID, $2::VARCHAR, $3::VARCHAR, \
                $4::VARCHAR, $5::VARCHAR, \
                $6::VARCHAR, $7::VARCHAR, $8::VARCHAR, $9::VARCHAR, \
                $10::TIMESTAMPTZ, $11::INT2, $12::JSONB, \
                $13::TIMESTAMPTZ, $14::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET first_name = EXCLUDED.first_name, \
                last_name = EXCLUDED.last_name, \
                email = EXCLUDED.email, \
                phone = EXCLUDED.phone, \
                address = EXCLUDED.address, \
                city = EXCLUDED.city, \
                state = EXCLUDED.state, \
                zip_code = EXCLUDED.zip_code, \
                born_at = EXCLUDED.born_at, \
                credit_score = EXCLUDED.credit_score, \
                preferences = EXCLUDED.preferences, \
                updated_at = EXCLUDED.updated_at";
        self.exec(
            SQL,
            &[
                &id,
                &first_name,
                &last_name,
                &email,
                &phone,
                &address,
                &city,
                &state,
                &zip_code,
                &born_at,
                &credit_score,
                &Json(&preferences),
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
