//! [`Command`] definition.

pub mod add_vehicle;
pub mod complete_sale;
pub mod hire_salesperson;
pub mod register_customer;
pub mod reserve_vehicle;
pub mod start_sale;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    add_vehicle::AddVehicle, complete_sale::CompleteSale,
    hire_salesperson::HireSalesperson, register_customer::RegisterCustomer,
    reserve_vehicle::ReserveVehicle, start_sale::StartSale,
};
