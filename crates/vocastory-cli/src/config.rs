use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use vocastory_core::models::credentials::DEFAULT_DATASET;
use vocastory_storage::http::{DEFAULT_API_HOST, DEFAULT_API_VERSION, HttpStoreConfig};

/// On-disk schema version written by this build. See [`migrate`].
const CURRENT_VERSION: u32 = 1;

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// 0 for files written before versioning.
    #[serde(default)]
    pub config_version: u32,
    pub api_host: String,
    pub api_version: String,
    /// Dataset used when local storage has none remembered. Added in v1.
    #[serde(default = "default_dataset")]
    pub default_dataset: String,
    /// Pause between a successful save and returning to the composer.
    pub return_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub created_at: jiff::Timestamp,
}

fn default_dataset() -> String {
    DEFAULT_DATASET.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: CURRENT_VERSION,
            api_host: DEFAULT_API_HOST.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            default_dataset: default_dataset(),
            return_delay_ms: 1000,
            request_timeout_secs: 30,
            created_at: jiff::Timestamp::now(),
        }
    }
}

impl AppConfig {
    pub fn http_store_config(&self) -> HttpStoreConfig {
        HttpStoreConfig {
            api_host: self.api_host.clone(),
            api_version: self.api_version.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
            base_url: None,
        }
    }

    pub fn return_delay(&self) -> Duration {
        Duration::from_millis(self.return_delay_ms)
    }
}

/// Platform config directory for the wizard.
pub fn default_config_dir() -> eyre::Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| eyre::eyre!("no config directory found"))?;
    Ok(base.join("com.vocastory.cli"))
}

pub fn has_config(dir: &Path) -> bool {
    dir.join(CONFIG_FILE).exists()
}

/// Load the config from `dir`, or defaults if none has been saved yet.
pub fn load_config(dir: &Path) -> eyre::Result<AppConfig> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(AppConfig::default());
    }

    let raw: serde_json::Value = std::fs::read_to_string(&path)
        .map_err(eyre::Report::from)
        .and_then(|text| Ok(serde_json::from_str(&text)?))
        .map_err(|e| eyre::eyre!("config at {} is unreadable: {e}", path.display()))?;
    let version = raw
        .get("config_version")
        .and_then(serde_json::Value::as_u64)
        .map_or(0, |v| u32::try_from(v).unwrap_or(u32::MAX));

    Ok(serde_json::from_value(migrate(raw, version)?)?)
}

/// Bring a raw config at `version` up to [`CURRENT_VERSION`].
fn migrate(mut raw: serde_json::Value, version: u32) -> eyre::Result<serde_json::Value> {
    if version > CURRENT_VERSION {
        eyre::bail!("config version {version} is newer than supported ({CURRENT_VERSION})");
    }
    let Some(fields) = raw.as_object_mut() else {
        eyre::bail!("config is not a JSON object");
    };

    if version == 0 {
        // Unversioned builds had no dataset setting.
        fields
            .entry("default_dataset")
            .or_insert_with(|| DEFAULT_DATASET.into());
        tracing::info!("config upgraded to v1: default_dataset = {DEFAULT_DATASET}");
    }
    fields.insert("config_version".to_string(), CURRENT_VERSION.into());

    Ok(raw)
}

/// Write `config` into `dir`, stamped with [`CURRENT_VERSION`].
pub fn save_config(dir: &Path, config: &AppConfig) -> eyre::Result<()> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(CONFIG_FILE);
    let current = AppConfig {
        config_version: CURRENT_VERSION,
        ..config.clone()
    };
    crate::local_store::write_private(&path, serde_json::to_string_pretty(&current)?.as_bytes())?;
    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}
