use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::transaction::{Mutation, Transaction};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// GROQ query used to check that credentials can read from the store.
pub const PROBE_QUERY: &str = r#"*[_type == "story"]"#;

/// What the store reports back for a committed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReceipt {
    pub transaction_id: String,
    /// Ids of every document the transaction touched, in mutation order.
    pub document_ids: Vec<String>,
}

/// A client handle bound to one set of credentials.
///
/// Handles are built by a [`StoreConnector`](crate::connector::StoreConnector)
/// and never mutated afterwards; a new gate submission builds a new handle.
///
/// Methods return boxed futures for dyn compatibility.
pub trait ContentStore: Send + Sync {
    /// The project / store identifier this handle talks to.
    fn store_id(&self) -> &str;

    /// Side-effect free read used to validate credentials.
    /// Returns the number of documents the probe query matched.
    fn probe(&self) -> BoxFuture<'_, Result<usize, StorageError>>;

    /// Apply a batch of mutations as a single all-or-nothing unit.
    ///
    /// Callers normally go through [`Transaction::commit`] instead.
    fn apply(&self, mutations: Vec<Mutation>) -> BoxFuture<'_, Result<CommitReceipt, StorageError>>;
}

impl<'s> dyn ContentStore + 's {
    /// Start buffering mutations against this store.
    pub fn begin_transaction(&self) -> Transaction<'_> {
        Transaction::new(self)
    }
}
