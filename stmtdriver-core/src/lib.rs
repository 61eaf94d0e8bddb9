//! Database-agnostic core of stmtdriver.
//!
//! This crate defines what a statement is and what an adapter must provide:
//!
//! - **Statement model** ([`statement`]) - Statements, criteria, predicate trees and builders
//! - **JSON parsing** ([`parse`]) - Shape classification of JSON statements
//! - **Validation** ([`validate`]) - Structural invariants of statements
//! - **Value coercion** ([`coerce`]) - Canonical form of dates
//! - **Predicate traversal** ([`visitor`]) - Visitor trait for translating `where` trees
//! - **Compilation** ([`compiler`]) - The statement compiler trait
//! - **Connection managers** ([`manager`]) - Manager builder trait and provenance wrapper
//! - **Reports** ([`report`]) - The result envelope echoing `meta` on every exit
//! - **Error handling** ([`error`]) - The error taxonomy shared by all adapters
//!
//! # Example
//!
//! ```ignore
//! use serde_json::json;
//! use stmtdriver_core::{compiler::StatementCompiler, dictionary::Dictionary};
//!
//! let exit = compiler.compile_json(
//!     &json!({ "using": "people", "criteria": { "where": { "age": { ">": 18 } } } }),
//!     Some(Dictionary::new().with("traceId", "abc")),
//! );
//!
//! match exit {
//!     Ok(report) => println!("{:?}", report.value),
//!     Err(failure) => eprintln!("{} ({:?})", failure, failure.kind()),
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as stmtdriver_core;

pub mod coerce;
pub mod compiler;
pub mod dictionary;
pub mod error;
pub mod manager;
pub mod parse;
pub mod report;
pub mod statement;
pub mod validate;
pub mod visitor;
