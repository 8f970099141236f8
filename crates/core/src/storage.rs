//! Local key-value storage.
//!
//! The app keeps a handful of string values on the device (the session, chat history and
//! the chat counter). [`KeyValueStore`] is the seam; [`FileStore`] keeps everything in one
//! JSON object on disk and [`MemoryStore`] backs tests.

use crate::{CardioError, CardioResult};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// String key-value persistence.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> CardioResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> CardioResult<()>;
    fn remove(&mut self, key: &str) -> CardioResult<()>;
    /// Delete every key this application has stored.
    fn clear(&mut self) -> CardioResult<()>;
}

/// In-memory store; contents are lost when dropped.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> CardioResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> CardioResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> CardioResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> CardioResult<()> {
        self.entries.clear();
        Ok(())
    }
}

/// Store backed by a single JSON object file.
///
/// Every write rewrites the whole file via a temporary sibling and a rename, so a crash
/// mid-write leaves the previous contents intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Opens (without reading) the store at `path`. The parent directory is created on the
    /// first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> CardioResult<BTreeMap<String, String>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(CardioError::StorageRead(e)),
        };

        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&contents).map_err(CardioError::Deserialization)
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> CardioResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(CardioError::StorageDirCreation)?;
        }

        let raw = serde_json::to_string_pretty(entries).map_err(CardioError::Serialization)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw).map_err(CardioError::StorageWrite)?;
        fs::rename(&tmp, &self.path).map_err(CardioError::StorageWrite)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> CardioResult<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> CardioResult<()> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&mut self, key: &str) -> CardioResult<()> {
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }

    fn clear(&mut self) -> CardioResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CardioError::StorageClear(e)),
        }
    }
}
