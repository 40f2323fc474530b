//! [`Query`] collection related to the multiple [`Salesperson`]s.

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{domain::Salesperson, read};

use super::DatabaseQuery;

/// Queries all the [`Salesperson`]s in the hiring order.
pub type List = DatabaseQuery<By<Vec<Salesperson>, read::salesperson::All>>;
