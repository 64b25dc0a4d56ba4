//! One collection together with the database it belongs to.

use crate::database::Database;
use crate::error::CoreResult;
use crate::record::record_id;
use serde_json::Value;

/// A collection read from the store, owned together with the rest of the
/// database.
///
/// The records are held apart from the database while the snapshot is
/// alive. [`CollectionSnapshot::into_database`] puts them back in place,
/// keeping the collection's original position.
///
/// A collection that did not exist is materialized as an empty array. That
/// only becomes durable if the database is written back.
#[derive(Debug, Clone)]
pub struct CollectionSnapshot {
    name: String,
    records: Vec<Value>,
    database: Database,
}

impl CollectionSnapshot {
    /// Takes the named collection out of `database`, creating it if absent.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` if the stored value is not an array.
    pub fn take(mut database: Database, name: &str) -> CoreResult<Self> {
        let records = std::mem::take(database.collection_or_insert(name)?);
        Ok(Self {
            name: name.to_string(),
            records,
            database,
        })
    }

    /// Returns the collection name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the records in stored order.
    #[must_use]
    pub fn records(&self) -> &[Value] {
        &self.records
    }

    /// Returns the records for in-place mutation.
    pub fn records_mut(&mut self) -> &mut Vec<Value> {
        &mut self.records
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the collection has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the index of the first record whose `id` equals `id`.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|record| record_id(record) == Some(id))
    }

    /// Returns the first record whose `id` equals `id`.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Value> {
        self.position(id).map(|index| &self.records[index])
    }

    /// Appends a record.
    pub fn push(&mut self, record: Value) {
        self.records.push(record);
    }

    /// Replaces the record at `index`, returning the previous value.
    pub fn replace(&mut self, index: usize, record: Value) -> Value {
        std::mem::replace(&mut self.records[index], record)
    }

    /// Removes and returns the record at `index`, shifting later records.
    pub fn remove(&mut self, index: usize) -> Value {
        self.records.remove(index)
    }

    /// Returns a copy of the full database including this collection's
    /// current records.
    #[must_use]
    pub fn to_database(&self) -> Database {
        let mut database = self.database.clone();
        database.put_collection(&self.name, self.records.clone());
        database
    }

    /// Reassembles the full database.
    #[must_use]
    pub fn into_database(self) -> Database {
        let mut database = self.database;
        database.put_collection(&self.name, self.records);
        database
    }

    /// Consumes the snapshot, returning only the records.
    #[must_use]
    pub fn into_records(self) -> Vec<Value> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Database {
        Database::from_slice(
            br#"{"teachers": [{"id": "t1"}], "students": [{"id": "a"}, {"id": "b"}], "rooms": []}"#,
        )
        .unwrap()
    }

    #[test]
    fn take_existing_collection() {
        let snapshot = CollectionSnapshot::take(sample(), "students").unwrap();
        assert_eq!(snapshot.name(), "students");
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.position("b"), Some(1));
        assert_eq!(snapshot.find("a").unwrap()["id"], "a");
        assert!(snapshot.find("zzz").is_none());
    }

    #[test]
    fn take_missing_collection_is_empty() {
        let snapshot = CollectionSnapshot::take(sample(), "grades").unwrap();
        assert!(snapshot.is_empty());
        assert!(snapshot.into_database().contains("grades"));
    }

    #[test]
    fn take_non_array_fails() {
        let db = Database::from_slice(br#"{"students": {"id": "a"}}"#).unwrap();
        assert!(CollectionSnapshot::take(db, "students").is_err());
    }

    #[test]
    fn into_database_keeps_other_collections_and_order() {
        let mut snapshot = CollectionSnapshot::take(sample(), "students").unwrap();
        snapshot.push(json!({"id": "c"}));
        let removed = snapshot.remove(0);
        assert_eq!(removed["id"], "a");

        let db = snapshot.into_database();
        let names: Vec<_> = db.collection_names().collect();
        assert_eq!(names, vec!["teachers", "students", "rooms"]);

        let ids: Vec<_> = db
            .collection("students")
            .unwrap()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["b", "c"]);
        assert_eq!(db.collection("teachers").unwrap().unwrap().len(), 1);
    }

    #[test]
    fn to_database_does_not_consume() {
        let mut snapshot = CollectionSnapshot::take(sample(), "rooms").unwrap();
        snapshot.push(json!({"id": "r1"}));
        let copy = snapshot.to_database();
        assert_eq!(copy.collection("rooms").unwrap().unwrap().len(), 1);
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn replace_returns_previous() {
        let mut snapshot = CollectionSnapshot::take(sample(), "students").unwrap();
        let old = snapshot.replace(1, json!({"id": "b", "name": "Bao"}));
        assert_eq!(old, json!({"id": "b"}));
        assert_eq!(snapshot.records()[1]["name"], "Bao");
    }
}
