//! The uniform result envelope returned on every exit.
//!
//! A success carries the produced value (a native query or a manager) and a failure
//! carries a [`DriverError`]. Both echo the caller's `meta` untouched, so context
//! such as telemetry ids survives the boundary regardless of the outcome.

use crate::{
    dictionary::Meta,
    error::{DriverError, ErrorKind},
};

/// A successful exit.
#[derive(Debug, Clone, PartialEq)]
pub struct Report<T> {
    /// The produced value.
    pub value: T,
    /// The caller's `meta`, echoed verbatim.
    pub meta: Option<Meta>,
}

impl<T> Report<T> {
    pub fn new(value: T, meta: Option<Meta>) -> Self {
        Self { value, meta }
    }

    pub fn into_parts(self) -> (T, Option<Meta>) {
        (self.value, self.meta)
    }
}

/// A failed exit.
#[derive(Debug)]
pub struct Failure {
    pub error: DriverError,
    /// The caller's `meta`, echoed verbatim.
    pub meta: Option<Meta>,
}

impl Failure {
    pub fn new(error: DriverError, meta: Option<Meta>) -> Self {
        Self { error, meta }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for Failure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// The outcome of an operation: a [`Report`] or a [`Failure`].
pub type Exit<T> = Result<Report<T>, Failure>;

/// Wraps a result into an [`Exit`], attaching `meta` to whichever side it lands on.
pub fn exit<T>(result: Result<T, DriverError>, meta: Option<Meta>) -> Exit<T> {
    match result {
        Ok(value) => Ok(Report::new(value, meta)),
        Err(error) => Err(Failure::new(error, meta)),
    }
}
