//! Durable per-user key-value storage.
//!
//! Holds the few values that prepopulate the next session (see
//! [`vocastory_core::storage_keys`]). Writes are synchronous and carry no
//! transactional link to the network calls they accompany.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use eyre::Result;

const PREFS_FILE: &str = "prefs.json";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// JSON file of string pairs, rewritten whole on every `set`.
pub struct LocalStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl LocalStore {
    /// Open the store in `dir`. A missing or unreadable file starts empty;
    /// anything but a missing file is logged.
    pub fn open(dir: &Path) -> Self {
        let path = dir.join(PREFS_FILE);
        let values = match read_values(&path) {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!(path = %path.display(), "ignoring unreadable local storage: {e}");
                BTreeMap::new()
            }
        };

        Self {
            path,
            values: Mutex::new(values),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove every remembered value, including the file.
    pub fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            tracing::info!(path = %self.path.display(), "local storage cleared");
        }
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.values
            .lock()
            .map_err(|_| eyre::eyre!("local storage lock poisoned"))
    }
}

fn read_values(path: &Path) -> Result<BTreeMap<String, String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(serde_json::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(e) => Err(e.into()),
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.lock()?;
        values.insert(key.to_string(), value.to_string());

        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(&*values)?;
        write_private(&self.path, json.as_bytes())?;

        tracing::debug!(key, "local storage updated");
        Ok(())
    }
}

/// Process-local store, nothing touches disk.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(pairs: &[(&str, &str)]) -> Self {
        let values = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            values: Mutex::new(values),
        }
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .map_err(|_| eyre::eyre!("local storage lock poisoned"))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Write to a temp file then rename for atomicity. The file may hold a
/// token, so it is made owner-only on Unix before the rename.
pub(crate) fn write_private(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, contents)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
    }

    std::fs::rename(&tmp_path, path)?;
    Ok(())
}
