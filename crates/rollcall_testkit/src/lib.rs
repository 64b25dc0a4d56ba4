//! # Rollcall Testkit
//!
//! Test utilities for Rollcall.
//!
//! This crate provides:
//! - Test fixtures and store helpers
//! - Property-based test generators using proptest
//! - Crash simulation for interrupted writes
//! - Concurrent writer stress helpers
//!
//! ## Usage
//!
//! ```rust
//! use rollcall_testkit::prelude::*;
//! use serde_json::json;
//!
//! with_temp_store(|store| {
//!     let resources = fixed_resources(store);
//!     resources.create("grades", &json!({"score": 90})).unwrap();
//!     assert_eq!(resources.list("grades").unwrap().len(), 1);
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod crash;
pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::crash::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use crash::*;
pub use fixtures::*;
pub use generators::*;
pub use stress::*;
