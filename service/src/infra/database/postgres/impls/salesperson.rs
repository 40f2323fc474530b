//! [`Salesperson`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{salesperson, Salesperson},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `salespeople` table, in the order [`from_row()`] expects.
const COLUMNS: &str = "\
    id, employee_number, first_name, last_name, \
    email, phone, department, commission_rate, status, \
    hired_at, created_at, updated_at";

/// Builds a [`Salesperson`] out of the provided `salespeople` [`Row`].
fn from_row(row: &Row) -> Salesperson {
    Salesperson {
        id: row.get("id"),
        employee_number: row.get("employee_number"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
        phone: row.get("phone"),
        department: row.get("department"),
        commission_rate: row.get("commission_rate"),
        status: row.get("status"),
        hired_at: row.get("hired_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C> Database<Select<By<Option<Salesperson>, salesperson::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Salesperson>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Salesperson>, salesperson::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id: salesperson::Id = by.into_inner();

        let sql =
            format!("SELECT {COLUMNS} FROM salespeople WHERE id = $1::UUID");
        Ok(self
            .query_opt(sql.as_str(), &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Vec<Salesperson>, read::salesperson::All>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Salesperson>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Salesperson>, read::salesperson::All>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sql = format!(
            "SELECT {COLUMNS} FROM salespeople ORDER BY hired_at, id",
        );
        Ok(self
            .query(sql.as_str(), &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Salesperson>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(salesperson): Insert<Salesperson>,
    ) -> Result<Self::Ok, Self::Err> {
        let Salesperson {
            id,
            employee_number,
            first_name,
            last_name,
            email,
            phone,
            department,
            commission_rate,
            status,
            hired_at,
            created_at,
            updated_at,
        } = salesperson;

        const SQL: &str = "\
            INSERT INTO salespeople (\
                id, employee_number, first_name, last_name, \
                email, phone, department, commission_rate, status, \
                hired_at, created_at, updated_at\
            ) \
            VALUES (\
                $1::UUID, $2::VARCHAR, $3::VARCHAR, $4::VARCHAR, \
                $5::VARCHAR, $6::VARCHAR, $7::VARCHAR, $8::NUMERIC, $9::INT2, \
                $10::TIMESTAMPTZ, $11::TIMESTAMPTZ, $12::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET employee_number = EXCLUDED.employee_number, \
                first_name = EXCLUDED.first_name, \
                last_name = EXCLUDED.last_name, \
                email = EXCLUDED.email, \
                phone = EXCLUDED.phone, \
                department = EXCLUDED.department, \
                commission_rate = EXCLUDED.commission_rate, \
                status = EXCLUDED.status, \
                hired_at = EXCLUDED.hired_at, \
                updated_at = EXCLUDED.updated_at";
        self.exec(
            SQL,
            &[
                &id,
                &employee_number,
                &first_name,
                &last_name,
                &email,
                &phone,
                &department,
                &commission_rate,
                &status,
                &hired_at,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
