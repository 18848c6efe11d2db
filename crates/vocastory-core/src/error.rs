use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid vocabulary line {line}: {text:?}")]
    InvalidVocabularyLine { line: usize, text: String },

    #[error("key phrase occurs {occurrences} times but only {entries} vocabulary entries were given")]
    PairingMismatch { occurrences: usize, entries: usize },
}
