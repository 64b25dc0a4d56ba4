//! Generic CRUD over any collection.

use crate::clock::{Clock, SystemClock};
use crate::collection::CollectionName;
use crate::error::{CoreError, CoreResult};
use crate::record::{
    as_plain_object, is_supplied, record_id, Record, RecordId, CREATED_AT_FIELD, ID_FIELD,
    UPDATED_AT_FIELD,
};
use crate::store::{DocumentStore, Outcome};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Confirmation returned by [`Resources::delete`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    /// Always true.
    pub ok: bool,
    /// Id of the removed record.
    pub deleted: String,
}

impl Deleted {
    fn new(id: impl Into<String>) -> Self {
        Self {
            ok: true,
            deleted: id.into(),
        }
    }
}

/// List, get, create, update and delete for records in any named collection.
///
/// Collections are created implicitly by the first create. Each operation
/// is a single read-modify-write cycle on the [`DocumentStore`]; failed
/// operations write nothing.
#[derive(Clone)]
pub struct Resources {
    store: Arc<DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl Resources {
    /// Creates resources over `store` using the system clock.
    #[must_use]
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Creates resources with an explicit time source.
    #[must_use]
    pub fn with_clock(store: Arc<DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    /// Returns all records in insertion order.
    ///
    /// A collection that was never written lists as empty.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank collection name, or a storage error.
    pub fn list(&self, collection: &str) -> CoreResult<Vec<Value>> {
        let name = CollectionName::parse(collection)?;
        Ok(self.store.get_collection(name.as_str())?.into_records())
    }

    /// Returns the first record whose `id` equals `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if there is no such record.
    pub fn get(&self, collection: &str, id: &str) -> CoreResult<Value> {
        let name = CollectionName::parse(collection)?;
        let snapshot = self.store.get_collection(name.as_str())?;
        snapshot
            .find(id)
            .cloned()
            .ok_or_else(|| CoreError::not_found(name.as_str(), id))
    }

    /// Appends a new record built from `payload`.
    ///
    /// The record gets a fresh id, which replaces any `id` in the payload.
    /// `createdAt` and `updatedAt` keep caller-supplied values and default
    /// to the current time otherwise.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the payload is not a JSON object. Nothing is
    /// read or written in that case.
    pub fn create(&self, collection: &str, payload: &Value) -> CoreResult<Value> {
        self.create_checked(collection, payload, |_| Ok(()))
    }

    /// Like [`Resources::create`], but runs `check` against the existing
    /// records inside the same read-modify-write cycle.
    ///
    /// An error from `check` aborts the create without writing.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a non-object payload, or the error from `check`.
    pub fn create_checked<F>(&self, collection: &str, payload: &Value, check: F) -> CoreResult<Value>
    where
        F: FnOnce(&[Value]) -> CoreResult<()>,
    {
        let name = CollectionName::parse(collection)?;
        let body = require_object(payload)?;

        let record = Value::Object(build_new_record(body, &self.clock.now()));

        self.store.transact_collection(name.as_str(), |records| {
            check(records.records())?;
            records.push(record.clone());
            Ok(Outcome::Commit(()))
        })?;

        tracing::debug!(collection = %name, id = record_id(&record), "created record");
        Ok(record)
    }

    /// Appends one record per payload in a single read-modify-write cycle.
    ///
    /// Each record is built as by [`Resources::create`]. Either every record
    /// is stored or none is.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if any payload is not a JSON object, before
    /// anything is read or written.
    pub fn create_many(&self, collection: &str, payloads: &[Value]) -> CoreResult<Vec<Value>> {
        let name = CollectionName::parse(collection)?;
        let now = self.clock.now();

        let records = payloads
            .iter()
            .enumerate()
            .map(|(index, payload)| {
                as_plain_object(payload)
                    .map(|body| Value::Object(build_new_record(body, &now)))
                    .ok_or_else(|| {
                        CoreError::validation(format!("Payload {index} must be a JSON object"))
                    })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        self.store.transact_collection(name.as_str(), |existing| {
            for record in &records {
                existing.push(record.clone());
            }
            Ok(Outcome::Commit(()))
        })?;

        tracing::debug!(collection = %name, count = records.len(), "created records");
        Ok(records)
    }

    /// Shallow-merges `payload` onto the record with this id.
    ///
    /// `id` and `createdAt` keep their stored values whatever the payload
    /// says; `updatedAt` is set to the current time.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the payload is not a JSON object and
    /// `NotFound` if there is no such record.
    pub fn update(&self, collection: &str, id: &str, payload: &Value) -> CoreResult<Value> {
        self.update_checked(collection, id, payload, |_, _| Ok(()))
    }

    /// Like [`Resources::update`], but runs `check` with the existing
    /// records and the index of the target inside the same cycle.
    ///
    /// # Errors
    ///
    /// Returns `Validation`, `NotFound`, or the error from `check`.
    pub fn update_checked<F>(
        &self,
        collection: &str,
        id: &str,
        payload: &Value,
        check: F,
    ) -> CoreResult<Value>
    where
        F: FnOnce(&[Value], usize) -> CoreResult<()>,
    {
        let name = CollectionName::parse(collection)?;
        let body = require_object(payload)?;
        let now = self.clock.now();

        let merged = self.store.transact_collection(name.as_str(), |records| {
            let index = records
                .position(id)
                .ok_or_else(|| CoreError::not_found(name.as_str(), id))?;
            check(records.records(), index)?;

            let merged = merge_record(&records.records()[index], body, &now);
            records.replace(index, merged.clone());
            Ok(Outcome::Commit(merged))
        })?;

        tracing::debug!(collection = %name, id, "updated record");
        Ok(merged)
    }

    /// Removes the record with this id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if there is no such record.
    pub fn delete(&self, collection: &str, id: &str) -> CoreResult<Deleted> {
        let name = CollectionName::parse(collection)?;

        let removed = self.store.transact_collection(name.as_str(), |records| {
            let index = records
                .position(id)
                .ok_or_else(|| CoreError::not_found(name.as_str(), id))?;
            Ok(Outcome::Commit(records.remove(index)))
        })?;

        tracing::debug!(collection = %name, id, "deleted record");
        Ok(Deleted::new(record_id(&removed).unwrap_or(id)))
    }
}

impl std::fmt::Debug for Resources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resources")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

fn require_object(payload: &Value) -> CoreResult<&Record> {
    as_plain_object(payload).ok_or_else(|| CoreError::validation("Payload must be a JSON object"))
}

fn build_new_record(body: &Record, now: &str) -> Record {
    let mut record = Record::new();
    record.insert(ID_FIELD.to_string(), Value::String(RecordId::new().to_string()));

    for (key, value) in body {
        if key != ID_FIELD {
            record.insert(key.clone(), value.clone());
        }
    }

    for field in [CREATED_AT_FIELD, UPDATED_AT_FIELD] {
        if !is_supplied(body.get(field)) {
            record.insert(field.to_string(), Value::String(now.to_string()));
        }
    }

    record
}

fn merge_record(current: &Value, body: &Record, now: &str) -> Value {
    let mut merged = current.as_object().cloned().unwrap_or_default();

    for (key, value) in body {
        merged.insert(key.clone(), value.clone());
    }

    for field in [ID_FIELD, CREATED_AT_FIELD] {
        match current.get(field) {
            Some(original) => {
                merged.insert(field.to_string(), original.clone());
            }
            None if merged.contains_key(field) => {
                merged = merged.into_iter().filter(|(key, _)| key != field).collect();
            }
            None => {}
        }
    }

    merged.insert(UPDATED_AT_FIELD.to_string(), Value::String(now.to_string()));
    Value::Object(merged)
}
