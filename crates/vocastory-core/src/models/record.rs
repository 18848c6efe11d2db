use serde::{Deserialize, Serialize};

use crate::models::vocabulary::VocabularyEntry;

/// Document kinds the wizard writes to the content store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Vocabulary,
    Story,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Vocabulary => "vocabulary",
            RecordKind::Story => "story",
        }
    }
}

/// A vocabulary document, keyed by a freshly generated id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_type")]
    pub kind: RecordKind,
    pub en: String,
    pub vi: String,
}

impl VocabularyRecord {
    pub fn new(id: impl Into<String>, entry: &VocabularyEntry) -> Self {
        Self {
            id: id.into(),
            kind: RecordKind::Vocabulary,
            en: entry.en.clone(),
            vi: entry.vi.clone(),
        }
    }

    pub fn reference(&self) -> Reference {
        Reference::to(&self.id)
    }
}

/// A weak link from one document to another by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "_type")]
    pub kind: String,
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "_ref")]
    pub target: String,
}

impl Reference {
    pub fn to(id: &str) -> Self {
        Self {
            kind: "reference".to_string(),
            key: id.to_string(),
            target: id.to_string(),
        }
    }
}

/// A story document. The store assigns its id on creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryRecord {
    #[serde(rename = "_type")]
    pub kind: RecordKind,
    pub title: String,
    pub content: String,
    pub vocabularies: Vec<Reference>,
}

impl StoryRecord {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        vocabularies: Vec<Reference>,
    ) -> Self {
        Self {
            kind: RecordKind::Story,
            title: title.into(),
            content: content.into(),
            vocabularies,
        }
    }
}
