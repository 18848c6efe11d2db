//! vocastory-core
//!
//! Pure domain types, draft validation, preview segmentation and the local
//! storage key conventions. No network dependency; this is the shared
//! vocabulary of the wizard.

pub mod error;
pub mod ids;
pub mod models;
pub mod segment;
pub mod storage_keys;
pub mod validation;
