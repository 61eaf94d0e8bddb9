//! MongoDB adapter for stmtdriver.
//!
//! This crate compiles statements into MongoDB native queries and builds pooled
//! MongoDB clients from connection strings.
//!
//! To use this adapter, include the `mongodb` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! stmtdriver = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Features
//!
//! - **Statement compilation** - `where` trees, sort, projection, limit and skip become
//!   `find`, `insertOne`, `insertMany`, `updateMany` and `deleteMany` arguments
//! - **Precise failures** - Malformed statements and constructs MongoDB cannot express
//!   are reported separately
//! - **Connection managers** - Connection string parsing, option whitelisting and a
//!   connectivity check before the manager is handed out
//!
//! # Example
//!
//! ```ignore
//! use serde_json::json;
//! use stmtdriver::mongodb::{compile, create_manager};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = create_manager("mongodb://localhost:27017/app", None, None).await?.value;
//!
//!     let query = compile(
//!         &json!({ "using": "people", "criteria": { "where": { "age": { ">": 18 } } } }),
//!         None,
//!     )?
//!     .value;
//!
//!     println!("{} on {}: {}", query.method, query.collection, query.to_json()?);
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as stmtdriver_mongodb;

pub mod compiler;
pub mod connection;
pub mod manager;
pub mod native;
pub mod options;

mod convert;
mod query;

pub use compiler::{MongoCompiler, compile};
pub use connection::ConnectionString;
pub use manager::{MongoManager, MongoManagerBuilder, PROVENANCE, ResolvedConnection, create_manager};
pub use native::{Method, NativeQuery};
pub use options::{ClientConfig, RECOGNIZED_OPTIONS};
