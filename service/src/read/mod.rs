//! Read entities definitions.

pub mod customer;
pub mod report;
pub mod salesperson;
pub mod vehicle;

pub use self::report::Period;
