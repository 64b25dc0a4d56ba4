//! # Rollcall Storage
//!
//! Whole-document storage backends for Rollcall.
//!
//! This crate provides the lowest-level storage abstraction. A backend holds
//! exactly one document as **opaque bytes**: it can load it, replace it as a
//! unit, and report whether it exists yet. It does not know that the bytes
//! are JSON.
//!
//! ## Design Principles
//!
//! - A replace is all-or-nothing: readers see the old bytes or the new bytes
//! - Absence is not an error, it is reported as `None`
//! - Must be `Send + Sync` for sharing across request handlers
//! - The document store owns all format interpretation
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral storage
//! - [`FileBackend`] - For persistent storage with write-then-rename
//!
//! ## Example
//!
//! ```rust
//! use rollcall_storage::{StorageBackend, InMemoryBackend};
//!
//! let backend = InMemoryBackend::new();
//! assert!(backend.load().unwrap().is_none());
//! backend.replace(b"{}").unwrap();
//! assert_eq!(backend.load().unwrap().as_deref(), Some(&b"{}"[..]));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::{StorageBackend, WriteLock};
pub use error::{StorageError, StorageResult};
pub use file::{FileBackend, StagedWrite};
pub use memory::InMemoryBackend;
