//! vocastory-storage
//!
//! Content-store operations. A small trait seam over the remote store, with
//! an HTTP client for a Sanity-style query/mutate API and an in-memory store
//! with the same all-or-nothing commit semantics.

pub mod connector;
pub mod error;
pub mod http;
pub mod memory;
pub mod store;
pub mod transaction;
