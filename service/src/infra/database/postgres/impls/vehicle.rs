//! [`Vehicle`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Insert, Select, Update};
use itertools::Itertools as _;
use tokio_postgres::Row;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{vehicle, Vehicle},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `vehicles` table, in the order [`from_row()`] expects.
const COLUMNS: &str = "\
    id, vin, make, model, year, color, mileage, price, status, \
    engine_type, transmission, fuel_type, \
    created_at, updated_at";

/// Builds a [`Vehicle`] out of the provided `vehicles` [`Row`].
fn from_row(row: &Row) -> Vehicle {
    Vehicle {
        id: row.get("id"),
        vin: row.get("vin"),
        make: row.get("make"),
        model: row.get("model"),
        year: row.get("year"),
        color: row.get("color"),
        mileage: row.get("mileage"),
        price: row.get("price"),
        status: row.get("status"),
        engine_type: row.get("engine_type"),
        transmission: row.get("transmission"),
        fuel_type: row.get("fuel_type"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C, IDs> Database<Select<By<HashMap<vehicle::Id, Vehicle>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[vehicle::Id]>,
{
    type Ok = HashMap<vehicle::Id, Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<vehicle::Id, Vehicle>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[vehicle::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let sql = format!(
            "SELECT {COLUMNS} FROM vehicles WHERE id = ANY($1::UUID[])",
        );
        Ok(self
            .query(sql.as_str(), &[&ids])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .map(|v| (v.id, v))
            .collect())
    }
}

impl<C> Database<Select<By<Option<Vehicle>, vehicle::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<vehicle::Id, Vehicle>, [vehicle::Id; 1]>>,
        Ok = HashMap<vehicle::Id, Vehicle>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Vehicle>, vehicle::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Select<By<Option<Vehicle>, vehicle::Vin>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Vehicle>, vehicle::Vin>>,
    ) -> Result<Self::Ok, Self::Err> {
        let vin: vehicle::Vin = by.into_inner();

        let sql =
            format!("SELECT {COLUMNS} FROM vehicles WHERE vin = $1::VARCHAR");
        Ok(self
            .query_opt(sql.as_str(), &[&vin])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Vec<Vehicle>, read::vehicle::All>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Vehicle>, read::vehicle::All>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sql =
            format!("SELECT {COLUMNS} FROM vehicles ORDER BY created_at, id");
        Ok(self
            .query(sql.as_str(), &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Vehicle>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(vehicle): Insert<Vehicle>,
    ) -> Result<Self::Ok, Self::Err> {
        let Vehicle {
            id,
            vin,
            make,
            model,
            year,
            color,
            mileage,
            price,
            status,
            engine_type,
            transmission,
            fuel_type,
            created_at,
            updated_at,
        } = vehicle;

        const SQL: &str = "\
            INSERT INTO vehicles (\
                id, vin, make, model, year, color, mileage, price, status, \
                engine_type, transmission, fuel_type, \
                created_at, updated_at\
            ) \
            VALUES (\
                $1::UUID, $2::VARCHAR, $3::VARCHAR, $4::VARCHAR, \
                $5::INT2, $6::VARCHAR, $7::INT4, $8::NUMERIC, $9::INT2, \
                $10::VARCHAR, $11::VARCHAR, $12::VARCHAR, \
                $13::TIMESTAMPTZ, $14::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET vin = EXCLUDED.vin, \
                make = EXCLUDED.make, \
                model = EXCLUDED.model, \
                year = EXCLUDED.year, \
                color = EXCLUDED.color, \
                mileage = EXCLUDED.mileage, \
                price = EXCLUDED.price, \
                status = EXCLUDED.status, \
                engine_type = EXCLUDED.engine_type, \
                transmission = EXCLUDED.transmission, \
                fuel_type = EXCLUDED.fuel_type, \
                updated_at = EXCLUDED.updated_at";
        self.exec(
            SQL,
            &[
                &id,
                &vin,
                &make,
                &model,
                &year,
                &color,
                &mileage,
                &price,
                &status,
                &engine_type,
                &transmission,
                &fuel_type,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<vehicle::StatusTransition>> for Postgres<C>
where
    C: Connection,
{
    type Ok = read::vehicle::Transitioned;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(transition): Update<vehicle::StatusTransition>,
    ) -> Result<Self::Ok, Self::Err> {
        let vehicle::StatusTransition { id, from, to, at } = transition;
        let from = from.into_iter().map(|s| i16::from(s.u8())).collect_vec();

        let sql = format!(
            "UPDATE vehicles \
             SET status = $1::INT2, updated_at = $2::TIMESTAMPTZ \
             WHERE id = $3::UUID AND status = ANY($4::INT2[]) \
             RETURNING {COLUMNS}",
        );
        Ok(self
            .query_opt(sql.as_str(), &[&to, &at, &id, &from])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map_or_else(
                || {
                    log::debug!("`Vehicle({id})` status is not in {from:?}");
                    read::vehicle::Transitioned::Rejected
                },
                |row| read::vehicle::Transitioned::Applied(from_row(row)),
            ))
    }
}
