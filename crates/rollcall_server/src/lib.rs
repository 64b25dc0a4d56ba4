//! # Rollcall Server
//!
//! HTTP front end for the Rollcall document store.
//!
//! This crate provides:
//! - Generic CRUD endpoints for any collection under `/api`
//! - Student directory endpoints under `/students`
//! - A student report under `/reports/students`
//!
//! # Architecture
//!
//! The server holds one shared [`rollcall_core::DocumentStore`]. Each
//! request performs its own read-modify-write cycle on a blocking thread;
//! nothing is cached between requests.
//!
//! All responses are JSON. Failures are reported as `{ "error": "..." }`
//! with a 400, 404, 409 or 500 status.
//!
//! # Example
//!
//! ```rust
//! use rollcall_core::DocumentStore;
//! use rollcall_server::{router, AppState};
//! use std::sync::Arc;
//!
//! let app = router(AppState::new(Arc::new(DocumentStore::open_in_memory())));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Production code MUST NOT use panic!/unwrap()/expect()
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

mod config;
mod error;
mod handler;
mod server;

pub use config::{ServerConfig, BIND_ADDR_ENV};
pub use error::{ServerError, ServerResult};
pub use handler::{AppState, JsonBody, ReportQuery, SearchQuery};
pub use server::{router, RollcallServer};
