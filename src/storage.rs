//! Session-scoped key/value storage used to carry the sidebar scroll offset
//! across a single navigation.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

/// The subset of the browser `sessionStorage` API the sidebar relies on.
pub trait SessionStorage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: String);
    fn remove_item(&mut self, key: &str);

    /// Reads a key and removes it in one step.
    fn take_item(&mut self, key: &str) -> Option<String> {
        let value = self.get_item(key);
        self.remove_item(key);
        value
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    items: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: String) {
        self.items.insert(key.to_string(), value);
    }

    fn remove_item(&mut self, key: &str) {
        self.items.remove(key);
    }
}

/// Storage backed by a JSON object on disk, so separate invocations of the
/// CLI can share one "session". Every mutation is written through.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    items: BTreeMap<String, String>,
}

impl JsonFileStorage {
    /// Opens the session file, starting empty when it does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let items = if path.exists() {
            let txt = fs::read_to_string(&path)
                .with_context(|| format!("reading session file {}", path.display()))?;
            serde_json::from_str(&txt)
                .with_context(|| format!("session file {} is not a JSON object of strings", path.display()))?
        } else {
            tracing::debug!("session file {} not found, starting empty", path.display());
            BTreeMap::new()
        };
        Ok(Self { path, items })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) {
        let result = serde_json::to_string_pretty(&self.items)
            .map_err(anyhow::Error::from)
            .and_then(|json| fs::write(&self.path, json).map_err(anyhow::Error::from));
        if let Err(err) = result {
            tracing::warn!("could not write session file {}: {}", self.path.display(), err);
        }
    }
}

impl SessionStorage for JsonFileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: String) {
        self.items.insert(key.to_string(), value);
        self.flush();
    }

    fn remove_item(&mut self, key: &str) {
        if self.items.remove(key).is_some() {
            self.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn take_consumes_the_key() {
        let mut storage = MemoryStorage::new();
        storage.set_item("sidebar-scroll", "120".into());
        assert_eq!(storage.take_item("sidebar-scroll").as_deref(), Some("120"));
        assert_eq!(storage.take_item("sidebar-scroll"), None);
        assert!(storage.is_empty());
    }

    #[test]
    fn file_storage_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");

        let mut first = JsonFileStorage::open(&path).unwrap();
        first.set_item("sidebar-scroll", "42".into());
        drop(first);

        let mut second = JsonFileStorage::open(&path).unwrap();
        assert_eq!(second.take_item("sidebar-scroll").as_deref(), Some("42"));

        let third = JsonFileStorage::open(&path).unwrap();
        assert_eq!(third.get_item("sidebar-scroll"), None);
    }

    #[test]
    fn file_storage_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "[1, 2]").unwrap();
        assert!(JsonFileStorage::open(&path).is_err());
    }
}
