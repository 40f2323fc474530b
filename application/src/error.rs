//! [`Error`]-related definitions.

use std::{fmt, process::ExitCode};

use derive_more::Error as StdError;
use itertools::Itertools as _;
use service::error::{Classify, Kind};
use tracerr::{Trace, Traced};

/// Command line [`Error`] reported to the operator.
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Error`] code.
    pub code: Code,

    /// Process exit status this [`Error`] ends the run with.
    pub exit_status: u8,

    /// Backtrace of this [`Error`].
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// [`Error`] message.
    pub message: String,
}

impl Error {
    /// Create a new [`Error`] representing an internal failure.
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        Self {
            code: "INTERNAL_ERROR",
            exit_status: 1,
            message: msg.to_string(),
            backtrace: None,
        }
    }

    /// Returns the [`ExitCode`] of this [`Error`].
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            code,
            exit_status: _,
            backtrace,
            message,
        } = self;

        write!(
            f,
            "[{code}]: {message}{}",
            backtrace
                .iter()
                .format_with("\n", |trace, f| f(&format_args!("\n{trace}"))),
        )
    }
}

/// [`Error`] code.
pub type Code = &'static str;

/// Helper trait for converting types into [`Error`]s.
pub trait AsError {
    /// Tries to convert the type into an [`Error`].
    ///
    /// [`None`] is returned if the type cannot be converted into an [`Error`].
    fn try_as_error(&self) -> Option<Error>;

    /// Converts the type into an [`Error`].
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error()
            .unwrap_or_else(|| Error::internal(&self))
    }

    /// Converts the type into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E> AsError for Traced<E>
where
    E: Classify + fmt::Display,
{
    fn try_as_error(&self) -> Option<Error> {
        let (code, exit_status) = match self.as_ref().kind() {
            Kind::NotFound => ("NOT_FOUND", 2),
            Kind::InvalidState => ("INVALID_STATE", 3),
            Kind::InvalidInput => ("INVALID_INPUT", 4),
            Kind::Storage => return None,
        };
        Some(Error {
            code,
            exit_status,
            backtrace: Some(self.trace().clone()),
            message: self.as_ref().to_string(),
        })
    }
}

impl AsError for serde_json::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

#[cfg(test)]
mod spec {
    use derive_more::Display;
    use service::error::{Classify, Kind};

    use super::AsError as _;

    #[derive(Debug, Display)]
    #[display("{_0}")]
    struct Failure(Kind);

    impl Classify for Failure {
        fn kind(&self) -> Kind {
            self.0
        }
    }

    #[test]
    fn maps_kinds_to_codes() {
        for (kind, code) in [
            (Kind::NotFound, "NOT_FOUND"),
            (Kind::InvalidState, "INVALID_STATE"),
            (Kind::InvalidInput, "INVALID_INPUT"),
        ] {
            let err = tracerr::new!(Failure(kind)).into_error();

            assert_eq!(err.code, code);
            assert_eq!(err.message, kind.to_string());
            assert!(err.backtrace.is_some());
        }
    }

    #[test]
    fn hides_storage_failures() {
        let err = tracerr::new!(Failure(Kind::Storage)).into_error();

        assert_eq!(err.code, "INTERNAL_ERROR");
        assert_eq!(err.exit_status, 1);
        assert!(err.backtrace.is_none());
    }
}
