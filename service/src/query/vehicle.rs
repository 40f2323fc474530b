//! [`Query`] collection related to a single [`Vehicle`].

use common::operations::By;

use crate::domain::{vehicle, Vehicle};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Vehicle`] by its [`vehicle::Id`].
pub type ById = DatabaseQuery<By<Option<Vehicle>, vehicle::Id>>;

/// Queries a [`Vehicle`] by its [`vehicle::Vin`].
pub type ByVin = DatabaseQuery<By<Option<Vehicle>, vehicle::Vin>>;
