//! In-memory content store.
//!
//! [`MemoryBackend`] plays the remote store: it holds the documents and the
//! one credential pair it accepts. [`MemoryContentStore`] is a client handle
//! onto it. Commits stage every mutation on a copy of the documents and swap
//! the copy in only once all of them have applied.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

use vocastory_core::models::credentials::Credentials;

use crate::error::StorageError;
use crate::store::{BoxFuture, CommitReceipt, ContentStore};
use crate::transaction::Mutation;

type Documents = BTreeMap<String, Map<String, Value>>;

#[derive(Default)]
struct BackendState {
    documents: Documents,
    probe_failure: Option<String>,
    /// Fail the next commit after this many mutations have been staged.
    commit_failure_after: Option<usize>,
    commits: usize,
}

pub struct MemoryBackend {
    store_id: String,
    token: String,
    state: Mutex<BackendState>,
}

impl MemoryBackend {
    pub fn new(store_id: impl Into<String>, token: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            store_id: store_id.into(),
            token: token.into(),
            state: Mutex::new(BackendState::default()),
        })
    }

    /// Make every probe fail with a transport error until cleared.
    pub async fn fail_probes(&self, reason: Option<&str>) {
        self.state.lock().await.probe_failure = reason.map(str::to_string);
    }

    /// Make the next commit fail once `after` mutations have been staged.
    pub async fn fail_next_commit_after(&self, after: usize) {
        self.state.lock().await.commit_failure_after = Some(after);
    }

    pub async fn documents_of_kind(&self, kind: &str) -> Vec<Map<String, Value>> {
        self.state
            .lock()
            .await
            .documents
            .values()
            .filter(|doc| doc.get("_type").and_then(Value::as_str) == Some(kind))
            .cloned()
            .collect()
    }

    pub async fn document(&self, id: &str) -> Option<Map<String, Value>> {
        self.state.lock().await.documents.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.documents.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of successful commits so far.
    pub async fn commits(&self) -> usize {
        self.state.lock().await.commits
    }

    fn accepts(&self, credentials: &Credentials) -> bool {
        credentials.store_id == self.store_id && credentials.token == self.token
    }
}

/// A client handle onto a [`MemoryBackend`].
pub struct MemoryContentStore {
    backend: Arc<MemoryBackend>,
    credentials: Credentials,
}

impl MemoryContentStore {
    pub fn new(backend: Arc<MemoryBackend>, credentials: Credentials) -> Self {
        Self {
            backend,
            credentials,
        }
    }

    fn authorize(&self) -> Result<(), StorageError> {
        if self.backend.accepts(&self.credentials) {
            Ok(())
        } else {
            Err(StorageError::Unauthorized)
        }
    }
}

impl ContentStore for MemoryContentStore {
    fn store_id(&self) -> &str {
        &self.credentials.store_id
    }

    fn probe(&self) -> BoxFuture<'_, Result<usize, StorageError>> {
        Box::pin(async move {
            let state = self.backend.state.lock().await;
            if let Some(reason) = &state.probe_failure {
                return Err(StorageError::Transport(reason.clone()));
            }
            self.authorize()?;
            Ok(state
                .documents
                .values()
                .filter(|doc| doc.get("_type").and_then(Value::as_str) == Some("story"))
                .count())
        })
    }

    fn apply(&self, mutations: Vec<Mutation>) -> BoxFuture<'_, Result<CommitReceipt, StorageError>> {
        Box::pin(async move {
            self.authorize()?;
            let mut state = self.backend.state.lock().await;
            let fail_after = state.commit_failure_after.take();

            let mut staged = state.documents.clone();
            let mut document_ids = Vec::with_capacity(mutations.len());
            for (applied, mutation) in mutations.into_iter().enumerate() {
                if fail_after == Some(applied) {
                    warn!(applied, "injected commit failure, discarding staged mutations");
                    return Err(StorageError::Commit("injected failure".to_string()));
                }
                document_ids.push(stage(&mut staged, mutation)?);
            }

            state.documents = staged;
            state.commits += 1;
            Ok(CommitReceipt {
                transaction_id: Uuid::new_v4().to_string(),
                document_ids,
            })
        })
    }
}

fn stage(documents: &mut Documents, mutation: Mutation) -> Result<String, StorageError> {
    let given_id = mutation.id().map(str::to_string);
    match mutation {
        Mutation::CreateIfNotExists(doc) => {
            let id = given_id.ok_or_else(|| {
                StorageError::InvalidDocument("createIfNotExists needs an _id".to_string())
            })?;
            documents.entry(id.clone()).or_insert(doc);
            Ok(id)
        }
        Mutation::Create(mut doc) => {
            let id = match given_id {
                Some(id) if documents.contains_key(&id) => {
                    return Err(StorageError::Conflict { id });
                }
                Some(id) => id,
                None => {
                    let id = Uuid::new_v4().to_string();
                    doc.insert("_id".to_string(), Value::String(id.clone()));
                    id
                }
            };
            documents.insert(id.clone(), doc);
            Ok(id)
        }
    }
}
