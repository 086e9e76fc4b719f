//! File-backed store.
//!
//! Entries live in `$XDG_CONFIG_HOME/erate/store.toml` by default (platform
//! equivalent elsewhere). Every operation re-reads the file so that values
//! written by another process are picked up; the last writer wins.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{KeyValueStore, StoreError, StoreResult};

/// On-disk layout of the store file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Open the store at the default location.
    pub fn open_default() -> StoreResult<Self> {
        Ok(Self::new(Self::default_path()?))
    }

    /// `<config dir>/erate/store.toml`.
    pub fn default_path() -> StoreResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(StoreError::NoConfigDir)?;
        Ok(config_dir.join("erate").join("store.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StoreResult<StoreFile> {
        if !self.path.exists() {
            return Ok(StoreFile::default());
        }

        let content =
            fs::read_to_string(&self.path).map_err(|e| StoreError::read(&self.path, e))?;

        toml::from_str(&content).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, file: &StoreFile) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::write(parent, e))?;
        }

        let content = toml::to_string_pretty(file)?;
        fs::write(&self.path, content).map_err(|e| StoreError::write(&self.path, e))?;
        debug!("Saved {} store entries to {}", file.entries.len(), self.path.display());
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.load()?.entries.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = self.load()?;
        file.entries.insert(key.to_owned(), value.to_owned());
        self.save(&file)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = self.load()?;
        if file.entries.remove(key).is_some() {
            self.save(&file)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("store.toml"));
        assert_eq!(store.get("anything").expect("get"), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_set_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("erate").join("store.toml");
        let store = FileStore::new(&path);

        store.set("k", "v").expect("set should succeed");
        assert!(path.exists());
        assert_eq!(store.get("k").expect("get"), Some("v".to_owned()));
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("store.toml");

        FileStore::new(&path)
            .set("erate-table-rows-per-page", "25")
            .expect("set should succeed");

        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.get("erate-table-rows-per-page").expect("get"),
            Some("25".to_owned())
        );
    }

    #[test]
    fn test_remove_deletes_only_that_key() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("store.toml"));
        store.set("a", "1").expect("set a");
        store.set("b", "2").expect("set b");

        store.remove("a").expect("remove a");
        assert_eq!(store.get("a").expect("get a"), None);
        assert_eq!(store.get("b").expect("get b"), Some("2".to_owned()));
    }

    #[test]
    fn test_corrupt_file_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("store.toml");
        fs::write(&path, "entries = [not valid").expect("write");

        let store = FileStore::new(&path);
        let err = store.get("a").expect_err("corrupt file should fail");
        assert!(matches!(err, StoreError::Parse { .. }));
    }

    #[test]
    fn test_values_with_json_payloads_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("store.toml"));
        let json = r#"{"state":{"accessToken":"a\"b","refreshToken":"r"}}"#;

        store.set("erate-auth", json).expect("set");
        assert_eq!(store.get("erate-auth").expect("get"), Some(json.to_owned()));
    }
}
