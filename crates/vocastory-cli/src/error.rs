use thiserror::Error;

use vocastory_core::error::CoreError;
use vocastory_core::validation::FieldErrors;
use vocastory_storage::error::StorageError;

use crate::session::Stage;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{action} is not available at the {stage} stage")]
    WrongStage { stage: Stage, action: &'static str },

    #[error("no content store is connected")]
    NotConnected,

    #[error("{} field(s) failed validation", .0.len())]
    Invalid(FieldErrors),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("draft error: {0}")]
    Core(#[from] CoreError),

    #[error("render error: {0}")]
    Render(#[from] tera::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SessionError {
    /// Field errors, if this is a validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            SessionError::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}
