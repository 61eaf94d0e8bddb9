//! Main stmtdriver crate providing a unified interface for statement drivers.
//!
//! This crate is the primary entry point for users of stmtdriver. It re-exports
//! the statement model, the compiler and manager traits, and gives access to the
//! database adapters enabled through features.
//!
//! # Features
//!
//! - **Database-agnostic statements** - Describe finds, inserts, updates and destroys once,
//!   as JSON or through builders
//! - **Precise failures** - Every exit is a report echoing the caller's `meta`, with
//!   malformed input, unsupported constructs and connectivity failures told apart
//! - **Adapters** - MongoDB support behind the `mongodb` feature
//!
//! # Quick Start
//!
//! ```ignore
//! use stmtdriver::{prelude::*, mongodb::MongoCompiler};
//!
//! let statement = Statement::find("people")
//!     .filter(Filter::and([Filter::gt("age", 18), Filter::starts_with("name", "A")]))
//!     .sort("age", SortDirection::Desc)
//!     .limit(10)
//!     .build();
//!
//! match MongoCompiler.compile(&statement, Some(Dictionary::new().with("traceId", "abc"))) {
//!     Ok(report) => println!("{:?}", report.value.filter()),
//!     Err(failure) => match failure.kind() {
//!         ErrorKind::Malformed => eprintln!("fix your query: {}", failure),
//!         ErrorKind::NotSupported => eprintln!("MongoDB cannot do that: {}", failure),
//!         _ => eprintln!("{}", failure),
//!     },
//! }
//! ```
//!
//! # Connection managers
//!
//! ```ignore
//! use stmtdriver::{prelude::*, mongodb::{MongoManager, PROVENANCE}};
//!
//! #[tokio::main]
//! async fn main() -> DriverResult<()> {
//!     let manager = MongoManager::builder("mongodb://localhost:27017/app")
//!         .options(Dictionary::new().with("poolSize", 10))
//!         .build()
//!         .await?;
//!
//!     assert!(manager.is_from(PROVENANCE));
//!     Ok(())
//! }
//! ```
//!
//! # Adapters
//!
//! - [`mongodb`] - MongoDB compiler and manager builder (requires `mongodb` feature)

pub mod prelude;

pub use stmtdriver_core::{coerce, compiler, dictionary, error, manager, parse, report, statement, validate, visitor};

// Re-export serde_json for building statements
pub use serde_json;

/// MongoDB adapter.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use stmtdriver_mongodb::{
        ClientConfig, ConnectionString, Method, MongoCompiler, MongoManager, MongoManagerBuilder, NativeQuery,
        PROVENANCE, RECOGNIZED_OPTIONS, ResolvedConnection, compile, create_manager,
    };
}
