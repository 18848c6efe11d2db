//! Preview segmentation.
//!
//! The content is split on the key phrase and the i-th gap is filled with the
//! i-th vocabulary entry. Pairing is positional only: nothing checks that the
//! entry's term matches the text it replaces.

use serde::Serialize;

use crate::error::CoreError;
use crate::models::draft::StoryDraft;
use crate::models::vocabulary::VocabularyEntry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Segment {
    /// Plain content between two key-phrase occurrences.
    Text(String),
    /// The vocabulary entry standing in for one occurrence.
    Term(VocabularyEntry),
}

impl Segment {
    pub fn is_term(&self) -> bool {
        matches!(self, Segment::Term(_))
    }
}

/// Derive `text0, term0, text1, term1, ..., textN` from a draft.
///
/// The result always starts and ends with a text segment (possibly empty),
/// so it holds `2 * occurrences + 1` segments. Surplus vocabulary lines are
/// ignored; too few is a [`CoreError::PairingMismatch`].
pub fn derive_segments(draft: &StoryDraft) -> Result<Vec<Segment>, CoreError> {
    if draft.key_word.is_empty() {
        return Err(CoreError::MissingField("key_word".to_string()));
    }

    let entries = draft.entries()?;
    let texts: Vec<&str> = draft.content.split(draft.key_word.as_str()).collect();
    let occurrences = texts.len() - 1;

    if entries.len() < occurrences {
        return Err(CoreError::PairingMismatch {
            occurrences,
            entries: entries.len(),
        });
    }

    let mut segments = Vec::with_capacity(texts.len() * 2 - 1);
    let mut entries = entries.into_iter();
    for (i, text) in texts.iter().enumerate() {
        segments.push(Segment::Text((*text).to_string()));
        if i < occurrences
            && let Some(entry) = entries.next()
        {
            segments.push(Segment::Term(entry));
        }
    }

    Ok(segments)
}

/// The vocabulary entries in the order they appear in the segments.
pub fn terms(segments: &[Segment]) -> impl Iterator<Item = &VocabularyEntry> {
    segments.iter().filter_map(|s| match s {
        Segment::Term(entry) => Some(entry),
        Segment::Text(_) => None,
    })
}
