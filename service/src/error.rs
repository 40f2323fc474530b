//! Classification of [`Service`] failures.
//!
//! [`Service`]: crate::Service

use derive_more::Display;
use tracerr::Traced;

use crate::infra::database;

/// Kind of a failure, independent of the operation it happened in.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Kind {
    /// Referenced entity doesn't exist.
    #[display("not found")]
    NotFound,

    /// Entity is in a state the operation cannot be applied to.
    #[display("invalid state")]
    InvalidState,

    /// Provided input is malformed or inconsistent.
    #[display("invalid input")]
    InvalidInput,

    /// Storage collaborator failed.
    #[display("storage failure")]
    Storage,
}

/// Classification of an error into a failure [`Kind`].
pub trait Classify {
    /// Returns the [`Kind`] of this failure.
    fn kind(&self) -> Kind;
}

impl<E: Classify> Classify for Traced<E> {
    fn kind(&self) -> Kind {
        self.as_ref().kind()
    }
}

impl Classify for database::Error {
    fn kind(&self) -> Kind {
        Kind::Storage
    }
}
