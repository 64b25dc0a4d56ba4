//! # Rollcall Core
//!
//! JSON document store and record management for Rollcall.
//!
//! This crate provides:
//! - A document store that keeps the whole database in one JSON file
//! - Lazy collections that exist as soon as they are first written
//! - Generic list/get/create/update/delete over any collection
//! - A student directory and report built on top of the generic layer
//!
//! # Data model
//!
//! The database is a JSON object mapping collection names to arrays of
//! records. Records are open-ended JSON objects carrying an `id` and
//! `createdAt`/`updatedAt` timestamps.
//!
//! ```text
//! {
//!   "students": [
//!     { "id": "…", "name": "Ada", "createdAt": "…", "updatedAt": "…" }
//!   ]
//! }
//! ```
//!
//! # Durability
//!
//! Every write serializes the full database and atomically replaces the
//! stored document (write to `<path>.tmp`, sync, rename). There is no
//! in-memory cache; each operation re-reads the document.
//!
//! # Example
//!
//! ```rust
//! use rollcall_core::{DocumentStore, Resources};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let resources = Resources::new(Arc::new(DocumentStore::open_in_memory()));
//! let created = resources.create("grades", &json!({"score": 90})).unwrap();
//! let id = created["id"].as_str().unwrap();
//!
//! assert_eq!(resources.get("grades", id).unwrap()["score"], 90);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Production code MUST NOT use panic!/unwrap()/expect()
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

mod clock;
mod collection;
mod config;
mod database;
mod error;
mod record;
mod report;
mod resource;
mod store;
mod students;

pub use clock::{Clock, FixedClock, SystemClock};
pub use collection::{CollectionName, CollectionSnapshot};
pub use config::{parse_flag, Config, DB_PATH_ENV, DEFAULT_DB_PATH, EXCLUSIVE_WRITES_ENV};
pub use database::{json_kind, Database};
pub use error::{CoreError, CoreResult};
pub use record::{
    as_plain_object, record_id, Record, RecordId, CREATED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD,
};
pub use report::StudentReport;
pub use resource::{Deleted, Resources};
pub use store::{DocumentStore, Outcome};
pub use students::{Student, StudentDirectory, StudentForm, STUDENTS_COLLECTION};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
