//! The MongoDB statement compiler.

use bson::{Bson, Document, doc};
use serde_json::Value;
use tracing::debug;

use stmtdriver_core::{
    compiler::StatementCompiler,
    error::{DriverError, DriverResult},
    report::{Exit, Failure, exit},
    statement::{Criteria, Records, SortDirection, Statement, StatementKind},
    visitor::PredicateVisitor,
};

use crate::{
    convert::{BsonConverter, dictionary_argument},
    native::{Method, NativeQuery},
    query::{MongoQueryTranslator, mount_opts},
};


/// Compiles statements into [`NativeQuery`] values.
///
/// The compiler holds no state; one instance can be shared freely between threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct MongoCompiler;

impl MongoCompiler {
    pub fn new() -> Self {
        Self
    }
}

impl StatementCompiler for MongoCompiler {
    type NativeQuery = NativeQuery;

    fn translate(&self, statement: &Statement) -> DriverResult<NativeQuery> {
        let criteria = statement.criteria.as_ref();

        let (method, mut query) = match &statement.kind {
            StatementKind::Find => (Method::Find, find_arguments(criteria)?),
            StatementKind::Insert(Records::One(record)) => (
                Method::InsertOne,
                doc! { "document": BsonConverter::record(record)? },
            ),
            StatementKind::Insert(Records::Many(records)) => (
                Method::InsertMany,
                doc! {
                    "documents": records
                        .iter()
                        .map(BsonConverter::record)
                        .collect::<DriverResult<Vec<_>>>()?,
                },
            ),
            StatementKind::Update(values) => {
                let mut query = filter_arguments(statement, criteria)?;
                query.insert("update", doc! { "$set": BsonConverter::record(values)? });
                (Method::UpdateMany, query)
            }
            StatementKind::Destroy => (Method::DeleteMany, filter_arguments(statement, criteria)?),
        };

        if let Some(opts) = criteria.and_then(|criteria| criteria.opts.as_ref()) {
            mount_opts(&mut query, opts);
        }
        if let Some(opts) = &statement.opts {
            mount_opts(&mut query, opts);
        }

        debug!(collection = %statement.using, method = %method, "Compiled statement");

        Ok(NativeQuery {
            collection: statement.using.clone(),
            method,
            query,
        })
    }
}

/// Compiles a JSON statement with a fresh [`MongoCompiler`].
///
/// `meta`, if provided, must be a JSON object; it is echoed on every exit.
pub fn compile(statement: &Value, meta: Option<Value>) -> Exit<NativeQuery> {
    let meta = match dictionary_argument(meta) {
        Ok(meta) => meta,
        Err(error) => return Err(Failure::new(error, None)),
    };

    let result = MongoCompiler
        .compile_json(statement, None)
        .map(|report| report.value)
        .map_err(|failure| failure.error);

    if let Err(error) = &result {
        debug!(error = %error, "Rejected statement");
    }

    exit(result, meta)
}

/// Arguments of a `find`: every clause of the criteria.
fn find_arguments(criteria: Option<&Criteria>) -> DriverResult<Document> {
    let mut query = Document::new();
    let Some(criteria) = criteria else {
        return Ok(query);
    };

    if let Some(filter) = &criteria.filter {
        query.insert("filter", MongoQueryTranslator.visit_predicate(filter)?);
    }

    if let Some(select) = &criteria.select {
        let projection = select
            .iter()
            .map(|attribute| (attribute.clone(), Bson::Int32(1)))
            .collect::<Document>();
        query.insert("projection", projection);
    }

    if let Some(sort) = &criteria.sort {
        let sort = sort
            .iter()
            .map(|entry| {
                let direction = match entry.direction {
                    SortDirection::Asc => 1,
                    SortDirection::Desc => -1,
                };
                (entry.attribute.clone(), Bson::Int32(direction))
            })
            .collect::<Document>();
        query.insert("sort", sort);
    }

    if let Some(limit) = criteria.limit {
        // MongoDB reads a zero limit as "no limit".
        if limit == 0 {
            return Err(DriverError::not_supported(
                "MongoDB cannot limit a `find` to zero records.",
            ));
        }
        query.insert("limit", integer("limit", limit)?);
    }

    if let Some(skip) = criteria.skip {
        query.insert("skip", integer("skip", skip)?);
    }

    Ok(query)
}

/// Arguments of an `updateMany` or `deleteMany`, which only honor `where`.
fn filter_arguments(statement: &Statement, criteria: Option<&Criteria>) -> DriverResult<Document> {
    let mut query = Document::new();
    let Some(criteria) = criteria else {
        return Ok(query);
    };

    let unsupported = [
        ("sort", criteria.sort.is_some()),
        ("limit", criteria.limit.is_some()),
        ("skip", criteria.skip.is_some()),
        ("select", criteria.select.is_some()),
    ];
    if let Some((clause, _)) = unsupported.iter().find(|(_, present)| *present) {
        return Err(DriverError::not_supported(format!(
            "MongoDB `{}` statements do not support `{}`.",
            statement.kind.name(),
            clause
        )));
    }

    if let Some(filter) = &criteria.filter {
        query.insert("filter", MongoQueryTranslator.visit_predicate(filter)?);
    }

    Ok(query)
}

fn integer(clause: &str, value: u64) -> DriverResult<Bson> {
    i64::try_from(value).map(Bson::Int64).map_err(|_| {
        DriverError::not_supported(format!(
            "`{}` of {} exceeds the largest value MongoDB accepts.",
            clause, value
        ))
    })
}
