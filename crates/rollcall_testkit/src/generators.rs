//! Property-based test generators using proptest.
//!
//! Provides strategies for generating collection names, record payloads
//! and sequences of CRUD operations.

use proptest::prelude::*;
use serde_json::{Map, Value};

/// Strategy for generating valid collection names.
pub fn collection_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z][a-zA-Z0-9_]{0,31}").expect("Invalid regex")
}

/// Strategy for generating field names that never collide with the
/// store-managed `id`, `createdAt` and `updatedAt` fields.
pub fn field_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,11}")
        .expect("Invalid regex")
        .prop_filter("Reserved field name", |name| name != "id")
}

/// Strategy for generating JSON leaf values.
pub fn json_scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        prop::string::string_regex("[ -~]{0,24}")
            .expect("Invalid regex")
            .prop_map(Value::String),
    ]
}

/// Strategy for generating nested JSON values up to a small depth.
pub fn json_value_strategy() -> impl Strategy<Value = Value> {
    json_scalar_strategy().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::vec((field_name_strategy(), inner), 0..4)
                .prop_map(|pairs| Value::Object(pairs.into_iter().collect())),
        ]
    })
}

/// Strategy for generating record payloads (always JSON objects).
pub fn record_payload_strategy() -> impl Strategy<Value = Value> {
    prop::collection::vec((field_name_strategy(), json_value_strategy()), 0..6)
        .prop_map(|pairs| Value::Object(pairs.into_iter().collect::<Map<_, _>>()))
}

/// Strategy for generating payloads that must be rejected.
pub fn non_object_payload_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        json_scalar_strategy(),
        prop::collection::vec(json_scalar_strategy(), 0..4).prop_map(Value::Array),
    ]
}

/// A CRUD operation against one collection.
///
/// Updates and deletes pick their target by position among the records
/// that exist when the operation runs, so sequences stay meaningful after
/// shrinking.
#[derive(Debug, Clone)]
pub enum ResourceOperation {
    /// Create a record
    Create {
        /// Payload
        payload: Value,
    },
    /// Merge into an existing record
    Update {
        /// Selects the target record
        target: prop::sample::Index,
        /// Payload
        payload: Value,
    },
    /// Delete an existing record
    Delete {
        /// Selects the target record
        target: prop::sample::Index,
    },
}

/// Strategy for generating resource operations.
pub fn resource_operation_strategy() -> impl Strategy<Value = ResourceOperation> {
    prop_oneof![
        3 => record_payload_strategy().prop_map(|payload| ResourceOperation::Create { payload }),
        2 => (any::<prop::sample::Index>(), record_payload_strategy())
            .prop_map(|(target, payload)| ResourceOperation::Update { target, payload }),
        1 => any::<prop::sample::Index>().prop_map(|target| ResourceOperation::Delete { target }),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<ResourceOperation>> {
    prop::collection::vec(resource_operation_strategy(), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TestStore;
    use rollcall_core::{CoreError, Database, ID_FIELD};

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn collection_name_is_valid(name in collection_name_strategy()) {
            prop_assert!(!name.trim().is_empty());
        }

        #[test]
        fn payload_is_object(payload in record_payload_strategy()) {
            prop_assert!(payload.is_object());
            prop_assert!(payload.get(ID_FIELD).is_none());
        }

        #[test]
        fn non_objects_are_rejected(payload in non_object_payload_strategy()) {
            let test_store = TestStore::memory();
            let err = test_store.resources().create("things", &payload).unwrap_err();
            prop_assert!(matches!(err, CoreError::Validation { .. }), "unexpected error");
            prop_assert!(test_store.read_database().unwrap().is_empty());
        }

        #[test]
        fn database_survives_write_and_read(
            collections in prop::collection::vec(
                (collection_name_strategy(), prop::collection::vec(record_payload_strategy(), 0..4)),
                0..4,
            )
        ) {
            let test_store = TestStore::file();
            let mut db = Database::new();
            for (name, records) in collections {
                db.put_collection(&name, records);
            }

            test_store.write_database(&db).unwrap();
            prop_assert_eq!(test_store.read_database().unwrap(), db);
        }

        #[test]
        fn operations_match_model(ops in operation_sequence_strategy(1, 24)) {
            let test_store = TestStore::memory();
            let resources = test_store.resources();
            let mut model: Vec<Value> = Vec::new();

            for op in ops {
                match op {
                    ResourceOperation::Create { payload } => {
                        model.push(resources.create("things", &payload).unwrap());
                    }
                    ResourceOperation::Update { target, payload } => {
                        if model.is_empty() {
                            continue;
                        }
                        let index = target.index(model.len());
                        let id = model[index][ID_FIELD].as_str().unwrap().to_string();
                        model[index] = resources.update("things", &id, &payload).unwrap();
                        prop_assert_eq!(model[index][ID_FIELD].as_str(), Some(id.as_str()));
                    }
                    ResourceOperation::Delete { target } => {
                        if model.is_empty() {
                            continue;
                        }
                        let index = target.index(model.len());
                        let id = model[index][ID_FIELD].as_str().unwrap().to_string();
                        resources.delete("things", &id).unwrap();
                        model.remove(index);
                    }
                }
            }

            prop_assert_eq!(resources.list("things").unwrap(), model);
        }
    }
}
