//! Error types and result types for statement compilation and manager creation.
//!
//! Every failure is classified into one of a small number of kinds so callers can
//! tell "fix your query" apart from "this adapter cannot do that" and from
//! "the database could not be reached". Use [`DriverResult<T>`] as the return type
//! for fallible operations.

use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// A boxed error from an external system, kept as the `source` of a failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Represents all possible errors raised by a driver adapter.
#[derive(Error, Debug)]
pub enum DriverError {
    /// The input violates the expected shape or type.
    ///
    /// Always detected locally, before any I/O takes place.
    #[error("Malformed: {0}")]
    Malformed(String),
    /// The input is well formed but asks for something the target database
    /// cannot express. One unsupported clause fails the whole statement.
    #[error("Not supported: {0}")]
    NotSupported(String),
    /// An operation depending on an external system did not succeed.
    /// The underlying cause is available through [`std::error::Error::source`].
    #[error("Failed: {message}")]
    Failed {
        /// A description of what was being attempted.
        message: String,
        /// The error reported by the external system.
        #[source]
        source: BoxError,
    },
    /// The caller passed an argument of the wrong kind (e.g. a `meta` that is
    /// not a dictionary).
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// The classification of a [`DriverError`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Malformed,
    NotSupported,
    Failed,
    InvalidInput,
}

impl DriverError {
    /// Creates a [`DriverError::Malformed`] error.
    pub fn malformed(message: impl Into<String>) -> Self {
        DriverError::Malformed(message.into())
    }

    /// Creates a [`DriverError::NotSupported`] error.
    pub fn not_supported(message: impl Into<String>) -> Self {
        DriverError::NotSupported(message.into())
    }

    /// Creates a [`DriverError::Failed`] error wrapping its cause.
    pub fn failed(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        DriverError::Failed {
            message: message.into(),
            source: source.into(),
        }
    }

    /// Creates a [`DriverError::InvalidInput`] error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        DriverError::InvalidInput(message.into())
    }

    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DriverError::Malformed(_) => ErrorKind::Malformed,
            DriverError::NotSupported(_) => ErrorKind::NotSupported,
            DriverError::Failed { .. } => ErrorKind::Failed,
            DriverError::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }
}

/// A specialized `Result` type for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;

impl From<SerdeJsonError> for DriverError {
    fn from(err: SerdeJsonError) -> Self {
        DriverError::Malformed(err.to_string())
    }
}
