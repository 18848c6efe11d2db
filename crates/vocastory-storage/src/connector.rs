use std::sync::Arc;

use vocastory_core::models::credentials::Credentials;

use crate::error::StorageError;
use crate::http::{HttpContentStore, HttpStoreConfig};
use crate::memory::{MemoryBackend, MemoryContentStore};
use crate::store::ContentStore;

/// Builds a fresh client handle for a credential pair.
///
/// Connecting does no I/O; the gate probes the returned handle to find out
/// whether the credentials actually work.
pub trait StoreConnector: Send + Sync {
    fn connect(&self, credentials: &Credentials) -> Result<Arc<dyn ContentStore>, StorageError>;
}

/// Connects to the hosted store over HTTP.
#[derive(Debug, Clone, Default)]
pub struct HttpConnector {
    config: HttpStoreConfig,
}

impl HttpConnector {
    pub fn new(config: HttpStoreConfig) -> Self {
        Self { config }
    }
}

impl StoreConnector for HttpConnector {
    fn connect(&self, credentials: &Credentials) -> Result<Arc<dyn ContentStore>, StorageError> {
        Ok(Arc::new(HttpContentStore::new(
            credentials.clone(),
            self.config.clone(),
        )?))
    }
}

/// Connects to a shared [`MemoryBackend`].
#[derive(Clone)]
pub struct MemoryConnector {
    backend: Arc<MemoryBackend>,
}

impl MemoryConnector {
    pub fn new(backend: Arc<MemoryBackend>) -> Self {
        Self { backend }
    }
}

impl StoreConnector for MemoryConnector {
    fn connect(&self, credentials: &Credentials) -> Result<Arc<dyn ContentStore>, StorageError> {
        Ok(Arc::new(MemoryContentStore::new(
            self.backend.clone(),
            credentials.clone(),
        )))
    }
}
