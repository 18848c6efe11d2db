use serde::Serialize;

/// A transient, session-wide notification. Validation problems never become
/// notices; they stay attached to their fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub at: jiff::Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Failure,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
            at: jiff::Timestamp::now(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Failure,
            message: message.into(),
            at: jiff::Timestamp::now(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.level == NoticeLevel::Failure
    }
}

pub const CREDENTIALS_VERIFIED: &str = "credentials verified";
pub const CREDENTIALS_REJECTED: &str = "credential check failed";
pub const STORY_SAVED: &str = "story saved";
pub const STORY_SAVE_FAILED: &str = "failed to save the story";
