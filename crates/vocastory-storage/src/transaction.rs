use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use vocastory_core::models::record::RecordKind;

use crate::error::StorageError;
use crate::store::{CommitReceipt, ContentStore};

/// One write in a transaction, serialized the way the mutate endpoint
/// expects it (`{"createIfNotExists": {...}}`, `{"create": {...}}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mutation {
    /// Create the document unless one with the same `_id` exists.
    CreateIfNotExists(Map<String, Value>),
    /// Create the document unconditionally. Fails the whole transaction if
    /// it carries an `_id` that already exists.
    Create(Map<String, Value>),
}

impl Mutation {
    pub fn document(&self) -> &Map<String, Value> {
        match self {
            Mutation::CreateIfNotExists(doc) | Mutation::Create(doc) => doc,
        }
    }

    /// The `_id` the document carries, if any.
    pub fn id(&self) -> Option<&str> {
        self.document().get("_id").and_then(Value::as_str)
    }
}

/// Buffered writes against one store, sent as a single unit on commit.
///
/// Nothing reaches the store until [`commit`](Transaction::commit), so
/// dropping a transaction discards it.
pub struct Transaction<'a> {
    store: &'a dyn ContentStore,
    mutations: Vec<Mutation>,
}

impl<'a> Transaction<'a> {
    pub fn new(store: &'a dyn ContentStore) -> Self {
        Self {
            store,
            mutations: Vec::new(),
        }
    }

    /// Queue an idempotent create keyed by `id`.
    pub fn create_if_absent<T: Serialize>(
        &mut self,
        kind: RecordKind,
        id: &str,
        fields: &T,
    ) -> Result<&mut Self, StorageError> {
        let mut doc = to_document(fields)?;
        doc.insert("_id".to_string(), Value::String(id.to_string()));
        doc.insert("_type".to_string(), Value::String(kind.as_str().to_string()));
        self.mutations.push(Mutation::CreateIfNotExists(doc));
        Ok(self)
    }

    /// Queue an unconditional create. The store assigns the id unless the
    /// fields carry one.
    pub fn create<T: Serialize>(
        &mut self,
        kind: RecordKind,
        fields: &T,
    ) -> Result<&mut Self, StorageError> {
        let mut doc = to_document(fields)?;
        doc.insert("_type".to_string(), Value::String(kind.as_str().to_string()));
        self.mutations.push(Mutation::Create(doc));
        Ok(self)
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Send every queued mutation as one atomic unit.
    pub async fn commit(self) -> Result<CommitReceipt, StorageError> {
        if self.is_empty() {
            return Err(StorageError::EmptyTransaction);
        }

        let count = self.mutations.len();
        debug!(store_id = self.store.store_id(), mutations = count, "committing transaction");
        let receipt = self.store.apply(self.mutations).await?;
        info!(
            store_id = self.store.store_id(),
            transaction_id = %receipt.transaction_id,
            mutations = count,
            "transaction committed"
        );
        Ok(receipt)
    }
}

fn to_document<T: Serialize>(fields: &T) -> Result<Map<String, Value>, StorageError> {
    match serde_json::to_value(fields)? {
        Value::Object(map) => Ok(map),
        other => Err(StorageError::InvalidDocument(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}
