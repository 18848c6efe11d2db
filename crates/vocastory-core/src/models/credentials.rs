use std::fmt;

use serde::{Deserialize, Serialize};

/// Dataset used when neither local storage nor config names one.
pub const DEFAULT_DATASET: &str = "production";

fn default_dataset() -> String {
    DEFAULT_DATASET.to_string()
}

/// Opaque content-store credentials.
///
/// No format rules apply here. The pair is only known to be good once a
/// probe against the store succeeds with it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub store_id: String,
    pub token: String,
    #[serde(default = "default_dataset")]
    pub dataset: String,
}

impl Credentials {
    pub fn new(store_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            store_id: store_id.into(),
            token: token.into(),
            dataset: default_dataset(),
        }
    }

    pub fn with_dataset(mut self, dataset: impl Into<String>) -> Self {
        self.dataset = dataset.into();
        self
    }

    /// Short, log-safe form of the token.
    pub fn token_hint(&self) -> String {
        redact_token(&self.token)
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new(String::new(), String::new())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("store_id", &self.store_id)
            .field("token", &self.token_hint())
            .field("dataset", &self.dataset)
            .finish()
    }
}

fn redact_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let prefix: String = chars[..4].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{prefix}...{suffix}")
}
