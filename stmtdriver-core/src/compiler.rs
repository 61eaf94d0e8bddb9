//! Statement compilation interface.
//!
//! A [`StatementCompiler`] turns a [`Statement`] into an adapter's native query.
//! Compilation is synchronous, deterministic and free of I/O: compiling deeply
//! equal statements always yields equal native queries or the same error
//! classification, so results may be memoized by the caller.
//!
//! Adapters implement [`StatementCompiler::translate`] only. The provided methods
//! validate the statement first, so a statement that is both malformed and
//! unsupported is always reported as [`DriverError::Malformed`].
//!
//! [`DriverError::Malformed`]: crate::error::DriverError::Malformed

use serde_json::Value;

use crate::{
    dictionary::Meta,
    error::DriverResult,
    report::{Exit, exit},
    statement::Statement,
};

pub trait StatementCompiler {
    type NativeQuery;

    /// Translates an already validated statement.
    ///
    /// Implementations report constructs the target database cannot express as
    /// [`DriverError::NotSupported`](crate::error::DriverError::NotSupported) and
    /// must not return partial results.
    fn translate(&self, statement: &Statement) -> DriverResult<Self::NativeQuery>;

    /// Validates and translates a statement.
    fn compile_statement(&self, statement: &Statement) -> DriverResult<Self::NativeQuery> {
        statement.validate()?;
        self.translate(statement)
    }

    /// Compiles a statement, echoing `meta` on every exit.
    fn compile(&self, statement: &Statement, meta: Option<Meta>) -> Exit<Self::NativeQuery> {
        exit(self.compile_statement(statement), meta)
    }

    /// Parses and compiles a JSON statement, echoing `meta` on every exit.
    fn compile_json(&self, statement: &Value, meta: Option<Meta>) -> Exit<Self::NativeQuery> {
        exit(
            Statement::from_json(statement).and_then(|statement| self.compile_statement(&statement)),
            meta,
        )
    }
}
