//! Convenient re-exports of commonly used types from stmtdriver.
//!
//! Import this prelude module to quickly access the most frequently used types
//! and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use stmtdriver::prelude::*;
//! ```
//!
//! This provides access to:
//! - Statements, predicates and their builders
//! - The compiler and manager builder traits
//! - Reports, dictionaries and error types

pub use stmtdriver_core::{
    compiler::StatementCompiler,
    dictionary::{Dictionary, Meta},
    error::{DriverError, DriverResult, ErrorKind},
    manager::{ManagerBuilder, TaggedManager},
    report::{Exit, Failure, Report},
    statement::{
        Criteria, Filter, Modifier, Operator, Predicate, Records, Sort, SortDirection, Statement,
        StatementBuilder, StatementKind,
    },
    visitor::PredicateVisitor,
};
