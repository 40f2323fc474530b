//! [`Query`] collection related to the multiple [`Customer`]s.

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{domain::Customer, read};

use super::DatabaseQuery;

/// Queries all the [`Customer`]s in the registration order.
pub type List = DatabaseQuery<By<Vec<Customer>, read::customer::All>>;
