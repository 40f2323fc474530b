//! Domain definitions.

pub mod contact;
pub mod credit;
pub mod customer;
pub mod financing;
pub mod sale;
pub mod salesperson;
pub mod session;
pub mod vehicle;

pub use self::{
    credit::CreditDecision, customer::Customer, sale::Sale,
    salesperson::Salesperson, session::SalesSession, vehicle::Vehicle,
};
