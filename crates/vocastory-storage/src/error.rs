use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("the store rejected the credentials")]
    Unauthorized,

    #[error("store responded with HTTP {status}")]
    Status { status: u16 },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("document already exists: {id}")]
    Conflict { id: String },

    #[error("transaction has no mutations")]
    EmptyTransaction,

    #[error("store id {0:?} is not a valid host label")]
    InvalidStoreId(String),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("commit failed: {0}")]
    Commit(String),

    #[error("background task failed: {0}")]
    Task(String),
}

impl StorageError {
    /// True when retrying with the same credentials cannot succeed.
    pub fn is_auth(&self) -> bool {
        matches!(self, StorageError::Unauthorized)
    }
}

impl From<ureq::Error> for StorageError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::StatusCode(401 | 403) => StorageError::Unauthorized,
            ureq::Error::StatusCode(status) => StorageError::Status { status },
            other => StorageError::Transport(other.to_string()),
        }
    }
}
