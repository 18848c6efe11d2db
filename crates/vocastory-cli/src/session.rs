//! The wizard session.
//!
//! Three stages, entered strictly in order: the credential gate, the
//! composer, and the preview. A session owns its form state, the frozen
//! draft under preview, and the content-store handle created by the gate.
//!
//! Probe and commit are the only suspending operations. Both take
//! `&mut self`, so a session can never run two of them at once.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use vocastory_core::ids::{IdGenerator, UuidGenerator};
use vocastory_core::models::credentials::Credentials;
use vocastory_core::models::draft::StoryDraft;
use vocastory_core::models::record::{RecordKind, StoryRecord, VocabularyRecord};
use vocastory_core::models::vocabulary::VocabularyEntry;
use vocastory_core::segment::{self, Segment};
use vocastory_core::storage_keys;
use vocastory_core::validation;
use vocastory_storage::connector::StoreConnector;
use vocastory_storage::store::{CommitReceipt, ContentStore};
use vocastory_storage::transaction::Transaction;

use crate::config::AppConfig;
use crate::error::SessionError;
use crate::local_store::KeyValueStore;
use crate::notice::{self, Notice};

pub const APPROVE_PROMPT: &str = "Approve and save this story?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Gate,
    Composer,
    Preview,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Gate => "credential gate",
            Stage::Composer => "composer",
            Stage::Preview => "preview",
        })
    }
}

/// Result of a probe or commit that got as far as the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    /// The store call failed; a failure notice was queued.
    Failed,
    /// The operator said no at the confirmation prompt.
    Declined,
}

/// Blocking yes/no question put to the operator before a commit.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Field values remembered from earlier sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Defaults {
    pub credentials: Credentials,
    pub key_word: String,
}

/// Read every remembered value once, at session start.
pub fn load_defaults(local: &dyn KeyValueStore, config: &AppConfig) -> Defaults {
    let read = |key: &str| local.get(key).unwrap_or_default();
    let dataset = local
        .get(storage_keys::DATASET)
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| config.default_dataset.clone());

    Defaults {
        credentials: Credentials::new(read(storage_keys::PROJECT_ID), read(storage_keys::TOKEN))
            .with_dataset(dataset),
        key_word: read(storage_keys::KEY_WORD),
    }
}

/// A frozen draft and the segments derived from it.
///
/// Segments are computed once, when the preview is built.
#[derive(Debug, Clone)]
pub struct Preview {
    draft: Arc<StoryDraft>,
    segments: Vec<Segment>,
}

impl Preview {
    pub fn new(draft: Arc<StoryDraft>) -> Result<Self, SessionError> {
        let segments = segment::derive_segments(&draft)?;
        Ok(Self { draft, segments })
    }

    pub fn draft(&self) -> &Arc<StoryDraft> {
        &self.draft
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn entries(&self) -> impl Iterator<Item = &VocabularyEntry> {
        segment::terms(&self.segments)
    }
}

pub struct Session {
    stage: Stage,
    credentials: Credentials,
    draft: StoryDraft,
    preview: Option<Preview>,
    client: Option<Arc<dyn ContentStore>>,
    connector: Arc<dyn StoreConnector>,
    local: Arc<dyn KeyValueStore>,
    ids: Arc<dyn IdGenerator>,
    return_delay: Duration,
    notices: Vec<Notice>,
}

impl Session {
    /// Start at the gate, with fields prepopulated from local storage.
    pub fn new(
        connector: Arc<dyn StoreConnector>,
        local: Arc<dyn KeyValueStore>,
        config: &AppConfig,
    ) -> Self {
        let defaults = load_defaults(local.as_ref(), config);
        Self {
            stage: Stage::Gate,
            credentials: defaults.credentials,
            draft: StoryDraft::with_key_word(defaults.key_word),
            preview: None,
            client: None,
            connector,
            local,
            ids: Arc::new(UuidGenerator),
            return_delay: config.return_delay(),
            notices: Vec::new(),
        }
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_return_delay(mut self, delay: Duration) -> Self {
        self.return_delay = delay;
        self
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn draft(&self) -> &StoryDraft {
        &self.draft
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    pub fn client(&self) -> Option<&Arc<dyn ContentStore>> {
        self.client.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    /// Take every notice queued since the last call.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // --- Credential gate ---

    /// Gate fields, editable only while the gate is the active stage.
    pub fn credentials_mut(&mut self) -> Result<&mut Credentials, SessionError> {
        self.require_stage(Stage::Gate, "editing credentials")?;
        Ok(&mut self.credentials)
    }

    /// Whether the gate's submit control would be enabled.
    pub fn can_submit_gate(&self) -> bool {
        self.stage == Stage::Gate && validation::validate_credentials(&self.credentials).is_empty()
    }

    /// Verify the gate's credentials with a read probe.
    ///
    /// On success the new handle replaces any previous one, the credentials
    /// are remembered, and the session moves to the composer. On failure the
    /// handle is cleared and the session stays at the gate.
    pub async fn submit_gate(&mut self) -> Result<Outcome, SessionError> {
        self.require_stage(Stage::Gate, "verifying credentials")?;
        let errors = validation::validate_credentials(&self.credentials);
        if !errors.is_empty() {
            return Err(SessionError::Invalid(errors));
        }

        info!(
            store_id = %self.credentials.store_id,
            dataset = %self.credentials.dataset,
            "verifying content store credentials"
        );

        let probed = match self.connector.connect(&self.credentials) {
            Ok(handle) => {
                let probe = handle.probe().await;
                probe.map(|documents| (handle, documents))
            }
            Err(e) => Err(e),
        };

        match probed {
            Ok((handle, documents)) => {
                info!(store_id = %self.credentials.store_id, documents, "credentials verified");
                self.client = Some(handle);
                self.stage = Stage::Composer;
                self.notices.push(Notice::success(notice::CREDENTIALS_VERIFIED));
                self.remember(storage_keys::PROJECT_ID, &self.credentials.store_id);
                self.remember(storage_keys::TOKEN, &self.credentials.token);
                self.remember(storage_keys::DATASET, &self.credentials.dataset);
                Ok(Outcome::Succeeded)
            }
            Err(e) => {
                warn!(store_id = %self.credentials.store_id, "credential check failed: {e}");
                self.client = None;
                self.notices.push(Notice::failure(notice::CREDENTIALS_REJECTED));
                Ok(Outcome::Failed)
            }
        }
    }

    /// Rewind to the gate. Entered values and the current handle are kept
    /// until the gate is submitted again.
    pub fn reset_to_gate(&mut self) {
        if self.stage != Stage::Gate {
            info!(from = %self.stage, "returning to credential gate");
        }
        self.stage = Stage::Gate;
    }

    // --- Composer ---

    /// Composer fields, editable only while the composer is active.
    pub fn draft_mut(&mut self) -> Result<&mut StoryDraft, SessionError> {
        self.require_stage(Stage::Composer, "editing the story")?;
        Ok(&mut self.draft)
    }

    /// Whether the composer's submit control would be enabled: every field
    /// has something in it. Rule violations still block at submit time.
    pub fn can_submit_composer(&self) -> bool {
        let d = &self.draft;
        self.stage == Stage::Composer
            && ![&d.key_word, &d.title, &d.content, &d.vocabulary]
                .iter()
                .any(|f| f.is_empty())
    }

    /// Validate the draft, freeze it, and move to the preview.
    pub fn submit_composer(&mut self) -> Result<(), SessionError> {
        self.require_stage(Stage::Composer, "previewing the story")?;
        if self.client.is_none() {
            return Err(SessionError::NotConnected);
        }

        let errors = validation::validate_draft(&self.draft);
        if !errors.is_empty() {
            return Err(SessionError::Invalid(errors));
        }

        let preview = match self.preview.take() {
            Some(existing) if **existing.draft() == self.draft => existing,
            _ => Preview::new(Arc::new(self.draft.clone())).inspect_err(|e| {
                warn!("could not build preview from a validated draft: {e}");
            })?,
        };

        self.remember(storage_keys::KEY_WORD, &self.draft.key_word);
        info!(
            key_word = %self.draft.key_word,
            terms = preview.entries().count(),
            "draft frozen for preview"
        );
        self.preview = Some(preview);
        self.stage = Stage::Preview;
        Ok(())
    }

    /// Rewind to the composer with every entered value intact.
    pub fn reset_to_composer(&mut self) -> Result<(), SessionError> {
        if self.stage == Stage::Gate {
            return Err(SessionError::WrongStage {
                stage: self.stage,
                action: "returning to the composer",
            });
        }
        self.stage = Stage::Composer;
        Ok(())
    }

    // --- Preview & commit ---

    /// Ask for confirmation, then save the story and its vocabulary in one
    /// transaction.
    ///
    /// On success the session returns to the composer after the configured
    /// delay, keeping the handle and credentials. Any failure after the
    /// confirmation queues a failure notice and leaves the session at the
    /// preview so the operator can retry.
    pub async fn commit(&mut self, confirm: &dyn Confirm) -> Result<Outcome, SessionError> {
        self.require_stage(Stage::Preview, "saving the story")?;
        let Some(draft) = self.preview.as_ref().map(|p| p.draft().clone()) else {
            return Err(SessionError::WrongStage {
                stage: self.stage,
                action: "saving without a preview",
            });
        };

        if !confirm.confirm(APPROVE_PROMPT) {
            info!("save declined");
            return Ok(Outcome::Declined);
        }

        match self.save(&draft).await {
            Ok((receipt, vocabulary)) => {
                info!(
                    transaction_id = %receipt.transaction_id,
                    vocabulary,
                    title = %draft.title,
                    "story saved"
                );
                self.notices.push(Notice::success(notice::STORY_SAVED));
                if !self.return_delay.is_zero() {
                    tokio::time::sleep(self.return_delay).await;
                }
                self.stage = Stage::Composer;
                Ok(Outcome::Succeeded)
            }
            Err(e) => {
                warn!(title = %draft.title, "saving story failed: {e}");
                self.notices.push(Notice::failure(notice::STORY_SAVE_FAILED));
                Ok(Outcome::Failed)
            }
        }
    }

    async fn save(&self, draft: &StoryDraft) -> Result<(CommitReceipt, usize), SessionError> {
        let client = self.client.as_ref().ok_or(SessionError::NotConnected)?;
        let mut txn = client.begin_transaction();
        let vocabulary_ids = stage_story(&mut txn, draft, self.ids.as_ref())?;
        let receipt = txn.commit().await?;
        Ok((receipt, vocabulary_ids.len()))
    }

    fn require_stage(&self, stage: Stage, action: &'static str) -> Result<(), SessionError> {
        if self.stage == stage {
            Ok(())
        } else {
            Err(SessionError::WrongStage {
                stage: self.stage,
                action,
            })
        }
    }

    fn remember(&self, key: &str, value: &str) {
        if let Err(e) = self.local.set(key, value) {
            warn!(key, "could not write local storage: {e}");
        }
    }
}

/// Queue one vocabulary record per entry and a story referencing them in
/// entry order. Returns the vocabulary ids.
pub fn stage_story(
    txn: &mut Transaction<'_>,
    draft: &StoryDraft,
    ids: &dyn IdGenerator,
) -> Result<Vec<String>, SessionError> {
    let records: Vec<VocabularyRecord> = draft
        .entries()?
        .iter()
        .map(|entry| VocabularyRecord::new(ids.next_id(), entry))
        .collect();

    for record in &records {
        txn.create_if_absent(RecordKind::Vocabulary, &record.id, record)?;
    }

    let story = StoryRecord::new(
        draft.title.clone(),
        draft.content.clone(),
        records.iter().map(VocabularyRecord::reference).collect(),
    );
    txn.create(RecordKind::Story, &story)?;

    Ok(records.into_iter().map(|r| r.id).collect())
}
