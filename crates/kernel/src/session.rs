//! Durable session state: access token and the "remember me" flag.
//!
//! Key names and write semantics mirror the deployed client exactly: the
//! token is written on every login, `rememberMe` is written only when the
//! flag is set, and `clear` removes both keys.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;

/// Storage key for the access token.
pub const TOKEN_KEY: &str = "token";
/// Storage key for the remember-me flag.
pub const REMEMBER_KEY: &str = "rememberMe";

/// Minimal key/value storage seam so session logic is testable without
/// touching the filesystem.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
    fn remove(&self, key: &str) -> anyhow::Result<()>;
}

/// In-memory storage used by tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.items.lock().expect("storage lock").get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.items
            .lock()
            .expect("storage lock")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.items.lock().expect("storage lock").remove(key);
        Ok(())
    }
}

/// File-backed storage persisting a flat JSON object at a configured path.
pub struct FileStorage {
    path: PathBuf,
    items: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// Open the storage file, creating parent directories on first write.
    /// A missing or unreadable file starts an empty store rather than
    /// failing: a corrupt session is equivalent to being logged out.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let items = Self::load(&path).unwrap_or_else(|err| {
            tracing::warn!(path = %path.display(), error = %err, "session file unreadable, starting empty");
            HashMap::new()
        });
        Self {
            path,
            items: Mutex::new(items),
        }
    }

    fn load(path: &Path) -> anyhow::Result<HashMap<String, String>> {
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }

    fn persist(&self, items: &HashMap<String, String>) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        let raw = serde_json::to_string_pretty(items).context("failed to encode session state")?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.items.lock().expect("storage lock").get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut items = self.items.lock().expect("storage lock");
        items.insert(key.to_string(), value.to_string());
        self.persist(&items)
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        let mut items = self.items.lock().expect("storage lock");
        items.remove(key);
        self.persist(&items)
    }
}

/// The session store injected into every component that needs credentials.
/// Auth controllers write it; everything else only reads.
pub struct SessionStore {
    storage: Box<dyn Storage>,
}

impl SessionStore {
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Ephemeral store backed by memory only.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStorage::new()))
    }

    /// Durable store backed by a JSON file.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(Box::new(FileStorage::open(path)))
    }

    /// Record a fresh login. The token is always written; the remember
    /// flag is written only when set and is never written as false.
    pub fn set_session(&self, token: &str, remember: bool) -> anyhow::Result<()> {
        self.storage.set(TOKEN_KEY, token)?;
        if remember {
            self.storage.set(REMEMBER_KEY, "true")?;
        }
        Ok(())
    }

    pub fn token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY)
    }

    pub fn remember(&self) -> bool {
        self.storage.get(REMEMBER_KEY).as_deref() == Some("true")
    }

    pub fn clear(&self) -> anyhow::Result<()> {
        self.storage.remove(TOKEN_KEY)?;
        self.storage.remove(REMEMBER_KEY)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_session_writes_token_unconditionally() {
        let store = SessionStore::in_memory();
        store.set_session("abc", false).unwrap();
        assert_eq!(store.token().as_deref(), Some("abc"));
        assert!(!store.remember());
    }

    #[test]
    fn remember_flag_written_only_when_true() {
        let store = SessionStore::in_memory();
        store.set_session("abc", true).unwrap();
        assert!(store.remember());

        // A later login without the flag must not write a false value;
        // the previous flag stays untouched.
        store.set_session("def", false).unwrap();
        assert_eq!(store.token().as_deref(), Some("def"));
        assert!(store.remember());
    }

    #[test]
    fn clear_removes_both_keys() {
        let store = SessionStore::in_memory();
        store.set_session("abc", true).unwrap();
        store.clear().unwrap();
        assert_eq!(store.token(), None);
        assert!(!store.remember());
    }

    #[test]
    fn file_storage_round_trips() {
        let path = std::env::temp_dir().join(format!(
            "bookshelf-session-roundtrip-{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let store = SessionStore::open(&path);
        store.set_session("abc", true).unwrap();
        drop(store);

        let reopened = SessionStore::open(&path);
        assert_eq!(reopened.token().as_deref(), Some("abc"));
        assert!(reopened.remember());

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"token\""));
        assert!(raw.contains("\"rememberMe\""));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn corrupt_session_file_starts_empty() {
        let path = std::env::temp_dir().join(format!(
            "bookshelf-session-corrupt-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "not json").unwrap();

        let store = SessionStore::open(&path);
        assert_eq!(store.token(), None);
        let _ = std::fs::remove_file(&path);
    }
}
