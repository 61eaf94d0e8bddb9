//! The MongoDB native query produced by the compiler.

use bson::{Bson, Document};
use serde::Serialize;
use serde_json::Value;

use stmtdriver_core::error::{DriverError, DriverResult};


/// The collection method a native query is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Method {
    Find,
    InsertOne,
    InsertMany,
    UpdateMany,
    DeleteMany,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Find => "find",
            Method::InsertOne => "insertOne",
            Method::InsertMany => "insertMany",
            Method::UpdateMany => "updateMany",
            Method::DeleteMany => "deleteMany",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compiled statement in MongoDB's own vocabulary.
///
/// `query` holds the method arguments: `filter`, `projection`, `sort`, `limit` and
/// `skip` for finds, `document` or `documents` for inserts, `filter` and `update` for
/// updates, `filter` for deletes, followed by any mounted `opts`. Absent clauses are
/// absent keys.
///
/// Serializes to JSON as `{"collection": ..., "method": ..., "query": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NativeQuery {
    pub collection: String,
    pub method: Method,
    pub query: Document,
}

impl NativeQuery {
    pub fn filter(&self) -> Option<&Document> {
        self.query.get_document("filter").ok()
    }

    pub fn projection(&self) -> Option<&Document> {
        self.query.get_document("projection").ok()
    }

    pub fn sort(&self) -> Option<&Document> {
        self.query.get_document("sort").ok()
    }

    pub fn limit(&self) -> Option<i64> {
        self.integer("limit")
    }

    pub fn skip(&self) -> Option<i64> {
        self.integer("skip")
    }

    /// The record of an `insertOne`.
    pub fn document(&self) -> Option<&Document> {
        self.query.get_document("document").ok()
    }

    /// The records of an `insertMany`.
    pub fn documents(&self) -> Option<Vec<&Document>> {
        self.query
            .get_array("documents")
            .ok()
            .map(|records| records.iter().filter_map(Bson::as_document).collect())
    }

    /// The update document of an `updateMany`.
    pub fn update(&self) -> Option<&Document> {
        self.query.get_document("update").ok()
    }

    /// Converts the query into plain JSON.
    pub fn to_json(&self) -> DriverResult<Value> {
        serde_json::to_value(self).map_err(|e| {
            DriverError::malformed(format!("Native query is not representable as JSON: {}", e))
        })
    }

    fn integer(&self, key: &str) -> Option<i64> {
        match self.query.get(key)? {
            Bson::Int32(value) => Some(i64::from(*value)),
            Bson::Int64(value) => Some(*value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use serde_json::json;

    #[test]
    fn test_serializes_to_plain_json() {
        let query = NativeQuery {
            collection: "people".to_string(),
            method: Method::InsertMany,
            query: doc! { "documents": [{ "name": "Ann" }, { "name": "Bob" }] },
        };

        assert_eq!(
            query.to_json().unwrap(),
            json!({
                "collection": "people",
                "method": "insertMany",
                "query": { "documents": [{ "name": "Ann" }, { "name": "Bob" }] },
            })
        );
        assert_eq!(query.documents().map(|records| records.len()), Some(2));
        assert_eq!(query.filter(), None);
    }

    #[test]
    fn test_integer_accessors() {
        let query = NativeQuery {
            collection: "people".to_string(),
            method: Method::Find,
            query: doc! { "limit": 10, "skip": 5_000_000_000i64 },
        };

        assert_eq!(query.limit(), Some(10));
        assert_eq!(query.skip(), Some(5_000_000_000));
    }
}
