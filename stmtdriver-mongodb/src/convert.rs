//! JSON to BSON value conversion.
//!
//! Statements carry JSON values, native queries carry BSON. Conversion walks object
//! keys in sorted order, so the produced documents do not depend on how the input
//! map happens to be ordered.

use bson::{Bson, Document};
use serde_json::{Number, Value};

use stmtdriver_core::{
    coerce,
    dictionary::Dictionary,
    error::{DriverError, DriverResult},
};


/// Reads an optional argument that must be a dictionary when present.
pub(crate) fn dictionary_argument(value: Option<Value>) -> DriverResult<Option<Dictionary>> {
    value.map(Dictionary::from_value).transpose()
}

/// Converts JSON values into BSON values.
pub(crate) struct BsonConverter;

impl BsonConverter {
    /// Converts a value, turning every nested date-like into its canonical string.
    ///
    /// Used for predicate values, records and update values. Integers beyond the
    /// `Int64` range are rejected rather than rounded into a `Double`.
    pub(crate) fn canonical(value: &Value) -> DriverResult<Bson> {
        match value {
            _ if coerce::is_date_like(value) => Ok(Bson::String(coerce::canonical_date(value)?)),
            Value::Number(number) if number.is_u64() && number.as_i64().is_none() => {
                Err(DriverError::not_supported(format!(
                    "Integer {} exceeds the largest integer MongoDB stores.",
                    number
                )))
            }
            Value::Array(items) => Ok(Bson::Array(
                items
                    .iter()
                    .map(Self::canonical)
                    .collect::<DriverResult<Vec<_>>>()?,
            )),
            Value::Object(map) => {
                let mut entries = map.iter().collect::<Vec<_>>();
                entries.sort_by(|(a, _), (b, _)| a.cmp(b));

                let mut document = Document::new();
                for (key, value) in entries {
                    document.insert(key.clone(), Self::canonical(value)?);
                }
                Ok(Bson::Document(document))
            }
            scalar => Ok(Self::verbatim(scalar)),
        }
    }

    /// Converts a value as is, without recognizing date-likes.
    ///
    /// Used for adapter `opts`, which are passed through untouched.
    pub(crate) fn verbatim(value: &Value) -> Bson {
        match value {
            Value::Null => Bson::Null,
            Value::Bool(flag) => Bson::Boolean(*flag),
            Value::Number(number) => Self::number(number),
            Value::String(text) => Bson::String(text.clone()),
            Value::Array(items) => Bson::Array(items.iter().map(Self::verbatim).collect()),
            Value::Object(map) => {
                let mut entries = map.iter().collect::<Vec<_>>();
                entries.sort_by(|(a, _), (b, _)| a.cmp(b));

                Bson::Document(
                    entries
                        .into_iter()
                        .map(|(k, v)| (k.clone(), Self::verbatim(v)))
                        .collect(),
                )
            }
        }
    }

    /// Converts a record into a document, canonicalizing dates.
    pub(crate) fn record(record: &Dictionary) -> DriverResult<Document> {
        let mut document = Document::new();
        for (key, value) in record.sorted_entries() {
            document.insert(key.clone(), Self::canonical(value)?);
        }
        Ok(document)
    }

    /// Integers become `Int32` when they fit and `Int64` otherwise; everything else
    /// becomes `Double`.
    fn number(number: &Number) -> Bson {
        match number.as_i64() {
            Some(integer) => i32::try_from(integer)
                .map(Bson::Int32)
                .unwrap_or(Bson::Int64(integer)),
            None => Bson::Double(number.as_f64().unwrap_or(f64::NAN)),
        }
    }
}
