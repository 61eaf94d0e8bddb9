//! Opaque key-value dictionaries used for `meta`, `opts`, records and options.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::ops::Deref;

use crate::error::{DriverError, DriverResult};

/// A free-form JSON object.
///
/// Dictionaries are carried through the compiler and the manager builder without
/// being interpreted, except where a component documents a whitelist of keys it
/// reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dictionary(Map<String, Value>);

/// Caller-provided context echoed back on every exit.
pub type Meta = Dictionary;

impl Dictionary {
    /// Creates an empty dictionary.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Converts a JSON value into a dictionary.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::InvalidInput`] if `value` is not a JSON object.
    pub fn from_value(value: Value) -> DriverResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(DriverError::invalid_input(format!(
                "If provided, a dictionary is expected, but got `{}`.",
                other
            ))),
        }
    }

    /// Inserts a key-value pair, returning the previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Builder-style variant of [`Dictionary::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Returns the entries sorted by key, independent of the map's internal ordering.
    pub fn sorted_entries(&self) -> Vec<(&String, &Value)> {
        let mut entries = self.0.iter().collect::<Vec<_>>();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        entries
    }

    /// Returns the underlying JSON map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the dictionary, returning the underlying JSON map.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl Deref for Dictionary {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Map<String, Value>> for Dictionary {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Dictionary> for Value {
    fn from(dictionary: Dictionary) -> Self {
        Value::Object(dictionary.0)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Dictionary {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
