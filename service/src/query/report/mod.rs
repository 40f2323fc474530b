//! Report [`Query`] definitions.
//!
//! [`Query`]: crate::Query

pub mod inventory;
pub mod performance;
pub mod sales;

use common::DateTime;
use derive_more::{Display, Error};

use crate::read::Period;

pub use self::{inventory::Inventory, performance::Performance, sales::Sales};

/// Builds a [`Period`] between the provided moments.
///
/// # Errors
///
/// If the `start` is later than the `end`.
fn period(start: DateTime, end: DateTime) -> Result<Period, InvertedPeriod> {
    Period::new(start, end).ok_or(InvertedPeriod { start, end })
}

/// Error of a report [`Period`] starting after its end.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display(
    "Period start `{}` is later than its end `{}`",
    start.to_rfc3339(),
    end.to_rfc3339(),
)]
pub struct InvertedPeriod {
    /// Requested start of the [`Period`].
    pub start: DateTime,

    /// Requested end of the [`Period`].
    pub end: DateTime,
}
