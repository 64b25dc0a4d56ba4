//! In-memory database value.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The whole database: a mapping from collection name to an ordered
/// sequence of records.
///
/// A `Database` is always read and written as a unit. It is rebuilt from
/// storage on every read; there is no cache shared between callers.
///
/// Collection order and key order inside records are preserved across a
/// read/write round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Database(Map<String, Value>);

impl Database {
    /// Creates an empty database (`{}`).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a stored document.
    ///
    /// Empty or whitespace-only content is read as an empty database.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if the content is not valid JSON and
    /// `InvalidFormat` if the root value is not an object.
    pub fn from_slice(bytes: &[u8]) -> CoreResult<Self> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::new());
        }

        match serde_json::from_slice::<Value>(bytes)? {
            Value::Object(map) => Ok(Self(map)),
            other => Err(CoreError::invalid_format(format!(
                "database root must be an object, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Serializes the database as pretty-printed JSON with 2-space indentation.
    pub fn to_pretty_bytes(&self) -> CoreResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(&self.0)?)
    }

    /// Returns the records of a collection, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` if the stored value is not an array.
    pub fn collection(&self, name: &str) -> CoreResult<Option<&[Value]>> {
        match self.0.get(name) {
            None => Ok(None),
            Some(Value::Array(records)) => Ok(Some(records.as_slice())),
            Some(other) => Err(not_an_array(name, other)),
        }
    }

    /// Returns the records of a collection, creating it empty if absent.
    ///
    /// Creation only affects this in-memory value.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` if the stored value is not an array.
    pub fn collection_or_insert(&mut self, name: &str) -> CoreResult<&mut Vec<Value>> {
        let slot = self
            .0
            .entry(name.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));

        match slot {
            Value::Array(records) => Ok(records),
            other => Err(not_an_array(name, other)),
        }
    }

    /// Sets the records of a collection, keeping its position if it exists.
    pub fn put_collection(&mut self, name: &str, records: Vec<Value>) {
        self.0.insert(name.to_string(), Value::Array(records));
    }

    /// Returns true if a collection with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Returns the collection names in stored order.
    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterates over `(name, value)` pairs in stored order.
    ///
    /// Values are returned raw so that callers checking integrity can see
    /// collections that are not arrays.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Returns the number of collections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no collections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Converts into a JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Database {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn not_an_array(name: &str, value: &Value) -> CoreError {
    CoreError::invalid_format(format!(
        "collection {name:?} must be an array, found {}",
        json_kind(value)
    ))
}

/// Returns the JSON type name of a value, for error messages.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_content_is_empty_database() {
        assert!(Database::from_slice(b"").unwrap().is_empty());
        assert!(Database::from_slice(b"  \n").unwrap().is_empty());
    }

    #[test]
    fn non_object_root_is_invalid() {
        let err = Database::from_slice(b"[1, 2]").unwrap_err();
        assert!(matches!(err, CoreError::InvalidFormat { .. }));
    }

    #[test]
    fn malformed_json_is_serialization_error() {
        let err = Database::from_slice(b"{\"students\": [").unwrap_err();
        assert!(matches!(err, CoreError::Serialization(_)));
    }

    #[test]
    fn collection_lookup() {
        let db = Database::from_slice(br#"{"students": [{"id": "a"}], "bad": 3}"#).unwrap();

        assert_eq!(db.collection("students").unwrap().unwrap().len(), 1);
        assert!(db.collection("missing").unwrap().is_none());
        assert!(db.collection("bad").is_err());
    }

    #[test]
    fn collection_or_insert_creates_in_memory() {
        let mut db = Database::new();
        db.collection_or_insert("grades").unwrap().push(json!({"id": "g1"}));

        assert!(db.contains("grades"));
        assert_eq!(db.collection("grades").unwrap().unwrap()[0]["id"], "g1");
    }

    #[test]
    fn pretty_output_uses_two_spaces() {
        let mut db = Database::new();
        db.put_collection("students", vec![json!({"id": "a"})]);

        let text = String::from_utf8(db.to_pretty_bytes().unwrap()).unwrap();
        assert_eq!(text, "{\n  \"students\": [\n    {\n      \"id\": \"a\"\n    }\n  ]\n}");
    }

    #[test]
    fn key_order_is_preserved() {
        let db = Database::from_slice(br#"{"zeta": [], "alpha": [], "mid": []}"#).unwrap();
        let names: Vec<_> = db.collection_names().collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn put_collection_keeps_position() {
        let mut db = Database::from_slice(br#"{"a": [], "b": [], "c": []}"#).unwrap();
        db.put_collection("a", vec![json!({})]);
        let names: Vec<_> = db.collection_names().collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
