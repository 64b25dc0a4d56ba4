//! Record helpers.
//!
//! A record is an open-ended JSON object. The store only relies on three
//! fields, all of which are assigned by [`crate::Resources`]:
//!
//! - `id` - string identifier, immutable after creation
//! - `createdAt` - ISO-8601 timestamp, fixed at creation
//! - `updatedAt` - ISO-8601 timestamp, refreshed on every modification

mod id;

pub use id::RecordId;

use serde_json::{Map, Value};

/// Field holding the record identifier.
pub const ID_FIELD: &str = "id";
/// Field holding the creation timestamp.
pub const CREATED_AT_FIELD: &str = "createdAt";
/// Field holding the last modification timestamp.
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// A record body.
pub type Record = Map<String, Value>;

/// Returns the string `id` of a record, if it has one.
pub fn record_id(record: &Value) -> Option<&str> {
    record.get(ID_FIELD).and_then(Value::as_str)
}

/// Returns the payload as an object if it is a plain JSON object.
///
/// Arrays, `null` and primitives are rejected.
pub fn as_plain_object(payload: &Value) -> Option<&Record> {
    payload.as_object()
}

/// Returns true if a payload field counts as supplied.
///
/// Missing fields and the falsy values `null`, `false`, `0` and the empty
/// string are treated as absent, so the server default applies.
pub(crate) fn is_supplied(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_id_reads_strings_only() {
        assert_eq!(record_id(&json!({"id": "abc"})), Some("abc"));
        assert_eq!(record_id(&json!({"id": 101})), None);
        assert_eq!(record_id(&json!({"name": "Ada"})), None);
    }

    #[test]
    fn plain_object_check() {
        assert!(as_plain_object(&json!({"a": 1})).is_some());
        assert!(as_plain_object(&json!([1, 2, 3])).is_none());
        assert!(as_plain_object(&Value::Null).is_none());
        assert!(as_plain_object(&json!("text")).is_none());
    }

    #[test]
    fn supplied_values() {
        assert!(is_supplied(Some(&json!("2020-01-01T00:00:00.000Z"))));
        assert!(is_supplied(Some(&json!(1_700_000_000))));
        assert!(is_supplied(Some(&json!(true))));
        assert!(!is_supplied(Some(&json!(0))));
        assert!(!is_supplied(Some(&json!(-0.0))));
        assert!(!is_supplied(Some(&json!(0.0))));
        assert!(!is_supplied(Some(&json!(""))));
        assert!(!is_supplied(Some(&Value::Null)));
        assert!(!is_supplied(Some(&json!(false))));
        assert!(!is_supplied(None));
    }
}
