use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::models::vocabulary::{self, VocabularyEntry};

/// The composer's form state.
///
/// `vocabulary` stays raw (newline-delimited `english|vietnamese` lines)
/// until the draft is validated and frozen for preview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryDraft {
    pub key_word: String,
    pub title: String,
    pub content: String,
    pub vocabulary: String,
}

impl StoryDraft {
    /// Start a draft with only the key phrase filled in, as the composer does
    /// when it prepopulates from local storage.
    pub fn with_key_word(key_word: impl Into<String>) -> Self {
        Self {
            key_word: key_word.into(),
            ..Self::default()
        }
    }

    /// Parsed vocabulary entries, in line order.
    pub fn entries(&self) -> Result<Vec<VocabularyEntry>, CoreError> {
        vocabulary::parse_vocabulary(&self.vocabulary)
    }
}

/// Occurrences of `needle` in `haystack`, counted the way splitting on it
/// would: `split(haystack, needle).len() - 1`.
///
/// An empty needle counts as zero occurrences.
pub fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}
