//! [`Salesperson`] read model definitions.
//!
//! [`Salesperson`]: crate::domain::Salesperson

/// Selector of all the [`Salesperson`]s in the hiring order.
///
/// [`Salesperson`]: crate::domain::Salesperson
#[derive(Clone, Copy, Debug, Default)]
pub struct All;
