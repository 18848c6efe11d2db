//! Field and cross-field rules for the gate and composer forms.
//!
//! Each rule is a plain predicate. [`validate_draft`] and
//! [`validate_credentials`] run every rule against the whole form and collect
//! the messages per field, so a caller can show all of them at once.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::credentials::Credentials;
use crate::models::draft::{StoryDraft, count_occurrences};
use crate::models::vocabulary::{self, TERM_SEPARATOR};

/// Form field names, as they appear in [`FieldErrors`].
pub mod field {
    pub const STORE_ID: &str = "store_id";
    pub const TOKEN: &str = "token";
    pub const KEY_WORD: &str = "key_word";
    pub const TITLE: &str = "title";
    pub const CONTENT: &str = "content";
    pub const VOCABULARY: &str = "vocabulary";
}

pub mod message {
    pub const STORE_ID_REQUIRED: &str = "store id is required";
    pub const TOKEN_REQUIRED: &str = "token is required";
    pub const KEY_WORD_REQUIRED: &str = "key phrase is required";
    pub const TITLE_REQUIRED: &str = "title is required";
    pub const CONTENT_REQUIRED: &str = "content is required";
    pub const VOCABULARY_REQUIRED: &str = "vocabulary is required";
    pub const VOCABULARY_SYNTAX: &str = "invalid syntax";
    pub const VOCABULARY_EMPTY_TERM: &str = "every line needs a term and a meaning";
    pub const KEY_WORD_NOT_FOUND: &str = "key phrase not found in content";
    pub const COUNT_MISMATCH: &str = "vocabulary count and key-phrase count do not match";
}

/// Violated-rule messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, Vec<&'static str>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: &'static str) {
        self.0.entry(field).or_default().push(message);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with at least one violation.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Messages for one field, in the order the rules ran.
    pub fn get(&self, field: &str) -> &[&'static str] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// The message a form would show under the field.
    pub fn first(&self, field: &str) -> Option<&'static str> {
        self.get(field).first().copied()
    }

    pub fn contains(&self, field: &str, message: &str) -> bool {
        self.get(field).iter().any(|m| *m == message)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[&'static str])> {
        self.0.iter().map(|(f, m)| (*f, m.as_slice()))
    }
}

/// Every vocabulary line splits into exactly two `|`-delimited parts.
pub fn check_vocabulary(raw: &str) -> bool {
    vocabulary::lines(raw).all(|line| line.split(TERM_SEPARATOR).count() == 2)
}

/// Every vocabulary line has a non-blank term and meaning. Lines that fail
/// [`check_vocabulary`] are left to that rule.
pub fn check_vocabulary_terms(raw: &str) -> bool {
    vocabulary::lines(raw).all(|line| {
        let parts: Vec<&str> = line.split(TERM_SEPARATOR).collect();
        parts.len() != 2 || parts.iter().all(|p| !p.trim().is_empty())
    })
}

/// The key phrase appears in the content as a literal substring.
pub fn check_story_key_word(content: &str, key_word: &str) -> bool {
    content.contains(key_word)
}

/// The key phrase occurs exactly once per vocabulary line.
pub fn check_story_vocabulary(content: &str, key_word: &str, raw_vocabulary: &str) -> bool {
    count_occurrences(content, key_word) == vocabulary::lines(raw_vocabulary).count()
}

/// Run every composer rule against the draft.
///
/// Required checks come first for each field. The key-phrase and count rules
/// report on `content`, the syntax rules on `vocabulary`. Cross-field rules
/// are skipped while the key phrase is empty, since the required message
/// already blocks submission.
pub fn validate_draft(draft: &StoryDraft) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if draft.key_word.is_empty() {
        errors.push(field::KEY_WORD, message::KEY_WORD_REQUIRED);
    }
    if draft.title.is_empty() {
        errors.push(field::TITLE, message::TITLE_REQUIRED);
    }

    if draft.content.is_empty() {
        errors.push(field::CONTENT, message::CONTENT_REQUIRED);
    } else if !draft.key_word.is_empty() {
        if !check_story_key_word(&draft.content, &draft.key_word) {
            errors.push(field::CONTENT, message::KEY_WORD_NOT_FOUND);
        }
        if !check_story_vocabulary(&draft.content, &draft.key_word, &draft.vocabulary) {
            errors.push(field::CONTENT, message::COUNT_MISMATCH);
        }
    }

    if draft.vocabulary.is_empty() {
        errors.push(field::VOCABULARY, message::VOCABULARY_REQUIRED);
    } else if !check_vocabulary(&draft.vocabulary) {
        errors.push(field::VOCABULARY, message::VOCABULARY_SYNTAX);
    } else if !check_vocabulary_terms(&draft.vocabulary) {
        errors.push(field::VOCABULARY, message::VOCABULARY_EMPTY_TERM);
    }

    errors
}

/// Required-field check run before a gate submission is allowed.
pub fn validate_credentials(credentials: &Credentials) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if credentials.store_id.is_empty() {
        errors.push(field::STORE_ID, message::STORE_ID_REQUIRED);
    }
    if credentials.token.is_empty() {
        errors.push(field::TOKEN, message::TOKEN_REQUIRED);
    }
    errors
}
