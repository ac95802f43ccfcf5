//! Last-viewed page persistence
//!
//! The last page shown for a document is stored under
//! `flip:last:<name>|<size>` as `{"page": n}` (1-based). Storage problems are
//! logged and swallowed; losing the session must never break viewing.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SESSION_KEY_PREFIX: &str = "flip:last:";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session storage IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session storage encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// String key/value storage, the shape of browser local storage
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String) -> Result<(), SessionError>;
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> Result<(), SessionError> {
        self.entries.lock().insert(key.to_string(), value);
        Ok(())
    }
}

/// Store persisted as a JSON object in a single file
///
/// The file is read once on open and rewritten on every `set`. A missing or
/// unreadable file starts an empty store.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), "Ignoring corrupt session file: {}", e);
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), "Cannot read session file: {}", e);
                BTreeMap::new()
            }
        };

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> Result<(), SessionError> {
        let mut entries = self.entries.lock();
        entries.insert(key.to_string(), value);

        let json = serde_json::to_vec_pretty(&*entries)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Document identity: file name and byte size
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentKey(String);

impl DocumentKey {
    pub fn new(name: &str, size: usize) -> Self {
        Self(format!("{}|{}", name, size))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn storage_key(&self) -> String {
        format!("{}{}", SESSION_KEY_PREFIX, self.0)
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionRecord {
    page: serde_json::Value,
}

/// Saves and restores the last page per document
pub struct SessionStore {
    store: Box<dyn KeyValueStore>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(MemoryStore::new())
    }
}

impl SessionStore {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Record `page` (1-based) as last seen for `key`
    pub fn save(&self, key: &DocumentKey, page: usize) {
        let record = serde_json::json!({ "page": page });
        if let Err(e) = self.store.set(&key.storage_key(), record.to_string()) {
            tracing::warn!(document = %key, "Failed to save session: {}", e);
        }
    }

    /// Last saved page (1-based), if a usable record exists
    ///
    /// Malformed records, zero and non-integer pages all read as absent.
    pub fn restore(&self, key: &DocumentKey) -> Option<usize> {
        let raw = self.store.get(&key.storage_key())?;
        let record: SessionRecord = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!(document = %key, "Ignoring malformed session: {}", e);
                return None;
            }
        };

        record
            .page
            .as_u64()
            .filter(|&page| page > 0)
            .map(|page| page as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_document_key_format() {
        let key = DocumentKey::new("revista.pdf", 20480);
        assert_eq!(key.as_str(), "revista.pdf|20480");
        assert_eq!(key.storage_key(), "flip:last:revista.pdf|20480");
    }

    #[test]
    fn test_save_and_restore() {
        let sessions = SessionStore::default();
        let key = DocumentKey::new("a.pdf", 10);

        assert_eq!(sessions.restore(&key), None);
        sessions.save(&key, 7);
        assert_eq!(sessions.restore(&key), Some(7));

        // Different size, different document
        assert_eq!(sessions.restore(&DocumentKey::new("a.pdf", 11)), None);
    }

    #[test]
    fn test_bad_records_read_as_absent() {
        let key = DocumentKey::new("a.pdf", 10);

        for raw in ["not json", "{}", r#"{"page":0}"#, r#"{"page":"3"}"#, r#"{"page":-2}"#] {
            let store = MemoryStore::new();
            store.set(&key.storage_key(), raw.to_string()).unwrap();
            let sessions = SessionStore::new(store);
            assert_eq!(sessions.restore(&key), None, "{}", raw);
        }
    }

    #[test]
    fn test_file_store_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state").join("session.json");
        let key = DocumentKey::new("b.pdf", 99);

        SessionStore::new(FileStore::open(&path)).save(&key, 4);
        assert!(path.exists());

        let reopened = SessionStore::new(FileStore::open(&path));
        assert_eq!(reopened.restore(&key), Some(4));
    }

    #[test]
    fn test_file_store_ignores_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{{{").unwrap();

        let store = FileStore::open(&path);
        assert_eq!(store.get("anything"), None);
        store.set("k", "v".to_string()).unwrap();
        assert_eq!(FileStore::open(&path).get("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be makes every write fail
        let path = dir.path().join("taken");
        std::fs::create_dir(&path).unwrap();

        let sessions = SessionStore::new(FileStore::open(&path));
        let key = DocumentKey::new("c.pdf", 1);
        sessions.save(&key, 2);
        // The in-memory copy still answers
        assert_eq!(sessions.restore(&key), Some(2));
    }
}
