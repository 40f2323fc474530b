//! [`Vehicle`] read model definitions.

use crate::domain::Vehicle;
#[cfg(doc)]
use crate::domain::vehicle::StatusTransition;

/// Selector of all the [`Vehicle`]s in the inventory order.
#[derive(Clone, Copy, Debug, Default)]
pub struct All;

/// Outcome of applying a [`StatusTransition`].
#[derive(Clone, Debug)]
pub enum Transitioned {
    /// [`StatusTransition`] is applied, holding the updated [`Vehicle`].
    Applied(Vehicle),

    /// [`Vehicle`] doesn't exist or is in none of the expected statuses.
    Rejected,
}
