//! [`Query`] collection related to the multiple [`Vehicle`]s.

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{domain::Vehicle, read};

use super::DatabaseQuery;

/// Queries the whole inventory in the order [`Vehicle`]s were added.
pub type List = DatabaseQuery<By<Vec<Vehicle>, read::vehicle::All>>;
