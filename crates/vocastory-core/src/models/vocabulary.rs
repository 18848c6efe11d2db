use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Separator between the english term and its vietnamese meaning.
pub const TERM_SEPARATOR: char = '|';

/// Separator between vocabulary lines.
pub const LINE_SEPARATOR: char = '\n';

/// One `english|vietnamese` pair, trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub en: String,
    pub vi: String,
}

impl VocabularyEntry {
    pub fn new(en: impl Into<String>, vi: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            vi: vi.into(),
        }
    }
}

/// Split a raw vocabulary field into its lines.
///
/// Splits on `\n` only, so an empty field is one empty line and a trailing
/// newline produces a trailing empty line.
pub fn lines(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(LINE_SEPARATOR)
}

/// Parse one line. `line_no` is 1-based and only used for the error.
pub fn parse_line(line_no: usize, line: &str) -> Result<VocabularyEntry, CoreError> {
    let invalid = || CoreError::InvalidVocabularyLine {
        line: line_no,
        text: line.to_string(),
    };

    let mut parts = line.split(TERM_SEPARATOR);
    let (Some(en), Some(vi), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };

    let (en, vi) = (en.trim(), vi.trim());
    if en.is_empty() || vi.is_empty() {
        return Err(invalid());
    }

    Ok(VocabularyEntry::new(en, vi))
}

/// Parse every line of a raw vocabulary field, in order.
pub fn parse_vocabulary(raw: &str) -> Result<Vec<VocabularyEntry>, CoreError> {
    lines(raw)
        .enumerate()
        .map(|(i, line)| parse_line(i + 1, line))
        .collect()
}
