//! Local key-value storage conventions.
//!
//! Pure string constants. These are the only names the wizard ever reads or
//! writes in local storage, and they are read once, when a session loads its
//! defaults.

pub const PROJECT_ID: &str = "project_id";

pub const TOKEN: &str = "token";

pub const DATASET: &str = "dataset";

pub const KEY_WORD: &str = "key_word";
