//! HTTP client for a Sanity-style content API.
//!
//! Probe is a GROQ query against `/data/query/{dataset}`; a commit is one
//! POST of every mutation to `/data/mutate/{dataset}`, which the store
//! applies as a single transaction. `ureq` is blocking, so each request runs
//! on the blocking pool.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use ureq::Agent;

use vocastory_core::models::credentials::Credentials;

use crate::error::StorageError;
use crate::store::{BoxFuture, CommitReceipt, ContentStore, PROBE_QUERY};
use crate::transaction::Mutation;

pub const DEFAULT_API_HOST: &str = "api.sanity.io";
pub const DEFAULT_API_VERSION: &str = "2021-03-25";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpStoreConfig {
    /// Host the project subdomain is prefixed to, e.g. `api.sanity.io`.
    pub api_host: String,
    /// Dated API version, without the leading `v`.
    pub api_version: String,
    pub timeout: Duration,
    /// Replaces `https://{store_id}.{api_host}` when set, e.g. to reach a
    /// local stand-in for the API.
    pub base_url: Option<String>,
}

impl Default for HttpStoreConfig {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_API_HOST.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
            base_url: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    result: Vec<Value>,
}

#[derive(Debug, Serialize)]
struct MutateRequest<'a> {
    mutations: &'a [Mutation],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MutateResponse {
    transaction_id: String,
    #[serde(default)]
    results: Vec<MutateResult>,
}

#[derive(Debug, Deserialize)]
struct MutateResult {
    id: String,
}

pub struct HttpContentStore {
    credentials: Credentials,
    config: HttpStoreConfig,
    agent: Agent,
}

impl HttpContentStore {
    pub fn new(credentials: Credentials, config: HttpStoreConfig) -> Result<Self, StorageError> {
        if credentials.store_id.is_empty()
            || !credentials
                .store_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(StorageError::InvalidStoreId(credentials.store_id));
        }

        let mut builder = Agent::config_builder().timeout_global(Some(config.timeout));
        if config.base_url.is_some() {
            // An explicit base URL is dialled directly, never through an env proxy.
            builder = builder.proxy(None);
        }
        let agent: Agent = builder.build().into();

        Ok(Self {
            credentials,
            config,
            agent,
        })
    }

    fn data_url(&self, endpoint: &str) -> String {
        let base = match &self.config.base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://{}.{}", self.credentials.store_id, self.config.api_host),
        };
        format!(
            "{base}/v{}/data/{endpoint}/{}",
            self.config.api_version, self.credentials.dataset,
        )
    }

    fn authorization(&self) -> String {
        format!("Bearer {}", self.credentials.token)
    }
}

impl ContentStore for HttpContentStore {
    fn store_id(&self) -> &str {
        &self.credentials.store_id
    }

    fn probe(&self) -> BoxFuture<'_, Result<usize, StorageError>> {
        Box::pin(async move {
            let agent = self.agent.clone();
            let url = self.data_url("query");
            let auth = self.authorization();
            debug!(store_id = %self.credentials.store_id, %url, "probing content store");

            let response: QueryResponse = tokio::task::spawn_blocking(move || {
                let mut resp = agent
                    .get(&url)
                    .header("Authorization", &auth)
                    .query("query", PROBE_QUERY)
                    .call()?;
                Ok::<_, StorageError>(resp.body_mut().read_json::<QueryResponse>()?)
            })
            .await
            .map_err(|e| StorageError::Task(e.to_string()))??;

            info!(
                store_id = %self.credentials.store_id,
                documents = response.result.len(),
                "probe succeeded"
            );
            Ok(response.result.len())
        })
    }

    fn apply(&self, mutations: Vec<Mutation>) -> BoxFuture<'_, Result<CommitReceipt, StorageError>> {
        Box::pin(async move {
            let agent = self.agent.clone();
            let url = format!("{}?returnIds=true", self.data_url("mutate"));
            let auth = self.authorization();
            let body = serde_json::to_value(MutateRequest {
                mutations: &mutations,
            })?;

            let response: MutateResponse = tokio::task::spawn_blocking(move || {
                let mut resp = agent
                    .post(&url)
                    .header("Authorization", &auth)
                    .send_json(&body)?;
                Ok::<_, StorageError>(resp.body_mut().read_json::<MutateResponse>()?)
            })
            .await
            .map_err(|e| StorageError::Task(e.to_string()))??;

            Ok(CommitReceipt {
                transaction_id: response.transaction_id,
                document_ids: response.results.into_iter().map(|r| r.id).collect(),
            })
        })
    }
}
