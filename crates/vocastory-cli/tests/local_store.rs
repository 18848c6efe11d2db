use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use vocastory_cli::config::AppConfig;
use vocastory_cli::local_store::{KeyValueStore, LocalStore, MemoryKeyValueStore};
use vocastory_cli::session::load_defaults;
use vocastory_core::storage_keys;

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Open the store in `dir` and return whatever it logged while doing so.
fn open_with_logs(dir: &Path) -> (LocalStore, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    let store = tracing::subscriber::with_default(subscriber, || LocalStore::open(dir));
    let logs = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
    (store, logs)
}

#[test]
fn values_survive_reopening() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::open(dir.path());
    assert!(store.get(storage_keys::TOKEN).is_none());

    store.set(storage_keys::PROJECT_ID, "proj1").unwrap();
    store.set(storage_keys::TOKEN, "secret").unwrap();

    let reopened = LocalStore::open(dir.path());
    assert_eq!(reopened.get(storage_keys::PROJECT_ID).as_deref(), Some("proj1"));
    assert_eq!(reopened.get(storage_keys::TOKEN).as_deref(), Some("secret"));
}

#[test]
fn clear_forgets_everything() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::open(dir.path());
    store.set(storage_keys::KEY_WORD, "[*]").unwrap();
    assert!(store.path().exists());

    store.clear().unwrap();
    assert!(!store.path().exists());
    assert!(LocalStore::open(dir.path()).get(storage_keys::KEY_WORD).is_none());
}

#[test]
fn corrupt_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("prefs.json"), "not json").unwrap();
    let (store, logs) = open_with_logs(dir.path());
    assert!(store.get(storage_keys::PROJECT_ID).is_none());
    assert!(logs.contains("ignoring unreadable local storage"), "logs: {logs}");
}

#[test]
fn missing_file_starts_empty_quietly() {
    let dir = tempfile::tempdir().unwrap();
    let (store, logs) = open_with_logs(dir.path());
    assert!(store.get(storage_keys::PROJECT_ID).is_none());
    assert!(!logs.contains("ignoring unreadable local storage"), "logs: {logs}");
}

#[test]
fn unreadable_file_starts_empty_and_is_logged() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the file should be fails the read with something
    // other than not-found.
    std::fs::create_dir(dir.path().join("prefs.json")).unwrap();
    let (store, logs) = open_with_logs(dir.path());
    assert!(store.get(storage_keys::PROJECT_ID).is_none());
    assert!(logs.contains("ignoring unreadable local storage"), "logs: {logs}");
}

#[test]
fn defaults_fall_back_to_config_dataset() {
    let local = Arc::new(MemoryKeyValueStore::with(&[(storage_keys::PROJECT_ID, "p")]));
    let mut cfg = AppConfig::default();
    cfg.default_dataset = "staging".to_string();

    let defaults = load_defaults(local.as_ref(), &cfg);
    assert_eq!(defaults.credentials.store_id, "p");
    assert_eq!(defaults.credentials.token, "");
    assert_eq!(defaults.credentials.dataset, "staging");
    assert_eq!(defaults.key_word, "");

    local.set(storage_keys::DATASET, "production").unwrap();
    assert_eq!(load_defaults(local.as_ref(), &cfg).credentials.dataset, "production");
}
