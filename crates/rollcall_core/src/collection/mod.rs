//! Collection access.
//!
//! A collection is a named array of records inside the [`Database`](crate::Database).
//! [`CollectionName`] validates names coming from callers and
//! [`CollectionSnapshot`] pairs one collection with the database it was
//! read from, so that a mutation can be written back as a whole.

mod name;
mod snapshot;

pub use name::CollectionName;
pub use snapshot::CollectionSnapshot;
