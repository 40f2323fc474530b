//! Application provides a command line interface to the [`Service`].

#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod args;
pub mod config;
pub mod error;

use std::fmt;

use common::Handler;
use serde::Serialize;
use service::{
    command::{
        AddVehicle, CompleteSale, HireSalesperson, RegisterCustomer,
        ReserveVehicle, StartSale,
    },
    domain::vehicle::Preferences,
    infra::Postgres,
    query::{
        self, report, CreditApplication, CustomerProfile, GetVehicle,
        QuoteFinancing, SearchVehicles,
    },
    read,
};
use tracing as log;

pub use self::{
    args::{Args, Command},
    config::Config,
    error::{AsError, Error},
};

/// [`Service`] backed by [`Postgres`].
pub type Service = service::Service<Postgres>;

/// Executes the provided [`Command`] on the provided [`Service`], returning
/// its outcome as JSON.
///
/// # Errors
///
/// Errors if the executed operation fails.
pub async fn run(
    service: &Service,
    command: Command,
) -> Result<serde_json::Value, Error> {
    use Command as C;

    log::debug!("executing `{command:?}`");

    match command {
        C::RegisterCustomer {
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
        } => {
            execute(
                service,
                RegisterCustomer {
                    first_name,
                    last_name,
                    email,
                    phone,
                    address,
                    city,
                    state,
                    zip_code,
                    born_at: born_at.map(|at| at.coerce()),
                    credit_score,
                    preferences: preferences.into_iter().collect(),
                },
            )
            .await
        }
        C::ListCustomers => {
            execute(service, query::customers::List::by(read::customer::All))
                .await
        }
        C::CustomerProfile { id } => {
            execute(service, CustomerProfile { customer_id: id }).await
        }
        C::CreditApplication { customer_id } => {
            execute(service, CreditApplication { customer_id }).await
        }
        C::AddVehicle {
            vin,
            make,
            model,
            year,
            color,
            mileage,
            price,
            engine_type,
            transmission,
            fuel_type,
        } => {
            execute(
                service,
                AddVehicle {
                    vin,
                    make,
                    model,
                    year,
                    color,
                    mileage,
                    price,
                    engine_type,
                    transmission,
                    fuel_type,
                },
            )
            .await
        }
        C::GetVehicle { id } => execute(service, GetVehicle { id }).await,
        C::ListVehicles => {
            execute(service, query::vehicles::List::by(read::vehicle::All))
                .await
        }
        C::SearchVehicles {
            min_price,
            max_price,
            min_year,
            max_year,
            max_mileage,
            makes,
            fuel_types,
        } => {
            let preferences = Preferences {
                min_price,
                max_price,
                min_year,
                max_year,
                max_mileage,
                makes: makes.into_iter().collect(),
                fuel_types: fuel_types.into_iter().collect(),
            };
            execute(service, SearchVehicles(preferences)).await
        }
        C::ReserveVehicle {
            vehicle_id,
            customer_id,
        } => {
            execute(
                service,
                ReserveVehicle {
                    vehicle_id,
                    customer_id,
                },
            )
            .await
        }
        C::HireSalesperson {
            employee_number,
            first_name,
            last_name,
            email,
            phone,
            department,
            commission_rate,
            hired_at,
        } => {
            execute(
                service,
                HireSalesperson {
                    employee_number,
                    first_name,
                    last_name,
                    email,
                    phone,
                    department,
                    commission_rate,
                    hired_at,
                },
            )
            .await
        }
        C::StartSale {
            customer_id,
            vehicle_id,
            salesperson_id,
        } => {
            execute(
                service,
                StartSale {
                    customer_id,
                    vehicle_id,
                    salesperson_id,
                },
            )
            .await
        }
        C::QuoteFinancing {
            vehicle_id,
            customer_id,
            down_payment,
        } => {
            execute(
                service,
                QuoteFinancing {
                    vehicle_id,
                    customer_id,
                    down_payment,
                },
            )
            .await
        }
        C::Sell {
            customer_id,
            vehicle_id,
            salesperson_id,
            payment_method,
            down_payment,
            term,
            notes,
        } => {
            let session = service
                .execute(StartSale {
                    customer_id,
                    vehicle_id,
                    salesperson_id,
                })
                .await
                .map_err(AsError::into_error)?;
            execute(
                service,
                CompleteSale {
                    session,
                    payment_method,
                    down_payment,
                    term,
                    notes,
                },
            )
            .await
        }
        C::SalesReport { start, end } => {
            execute(service, report::Sales { start, end }).await
        }
        C::PerformanceReport { start, end } => {
            execute(service, report::Performance { start, end }).await
        }
        C::InventoryReport => execute(service, report::Inventory).await,
    }
}

/// Executes the provided operation on the provided `handler`, rendering its
/// output as JSON.
async fn execute<H, Op>(
    handler: &H,
    op: Op,
) -> Result<serde_json::Value, Error>
where
    H: Handler<Op>,
    H::Ok: Serialize,
    H::Err: AsError + fmt::Display,
{
    let out = handler.execute(op).await.map_err(AsError::into_error)?;
    serde_json::to_value(out).map_err(AsError::into_error)
}

#[cfg(test)]
mod spec {
    use service::{
        command::AddVehicle,
        domain::{customer, vehicle},
        infra::Memory,
        query, Config, Service,
    };

    use super::execute;

    fn add() -> AddVehicle {
        AddVehicle {
            vin: vehicle::Vin::new("1HGCM82633A004352").unwrap(),
            make: vehicle::Make::new("Honda").unwrap(),
            model: vehicle::Model::new("Accord").unwrap(),
            year: vehicle::Year::new(2021).unwrap(),
            color: vehicle::Color::new("Silver").unwrap(),
            mileage: vehicle::Mileage::new(12_000).unwrap(),
            price: "21500".parse().unwrap(),
            engine_type: None,
            transmission: None,
            fuel_type: vehicle::FuelType::new("Gasoline"),
        }
    }

    #[tokio::test]
    async fn renders_outcome_as_json() {
        let svc = Service::new(Config::default(), Memory::new());

        let json = execute(&svc, add()).await.unwrap();

        assert_eq!(json["vin"], "1HGCM82633A004352");
        assert_eq!(json["status"], "available");
    }

    #[tokio::test]
    async fn renders_failure_with_code() {
        let svc = Service::new(Config::default(), Memory::new());
        _ = execute(&svc, add()).await.unwrap();

        let err = execute(&svc, add()).await.unwrap_err();
        assert_eq!(err.code, "INVALID_STATE");
        assert_eq!(err.exit_status, 3);

        let err = execute(
            &svc,
            query::CustomerProfile {
                customer_id: customer::Id::new(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, "NOT_FOUND");
        assert_eq!(err.exit_status, 2);

        let err = execute(
            &svc,
            query::GetVehicle {
                id: vehicle::Id::new(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, "NOT_FOUND");
        assert_eq!(err.exit_status, 2);
    }
}
