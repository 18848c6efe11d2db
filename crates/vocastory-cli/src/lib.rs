//! vocastory-cli library root.
//!
//! Re-exports the wizard's modules so integration tests can drive a session
//! directly, without going through the terminal front-end.

pub mod config;
pub mod error;
pub mod local_store;
pub mod notice;
pub mod render;
pub mod session;
