//! File Store Module
//!
//! Persistent key-value store kept as a single JSON object on disk, with an
//! optional byte quota.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, StorageError};
use crate::storage::KeyValueStore;

// == File Store ==
/// Persistent store scoped to one file path.
///
/// The whole map is held in memory and rewritten on every mutation.
#[derive(Debug)]
pub struct FileStore {
    /// Backing file
    path: PathBuf,
    /// Current contents, sorted so the file is stable across writes
    entries: BTreeMap<String, String>,
    /// Maximum total bytes of keys plus values, None = unlimited
    quota: Option<usize>,
    /// Bytes currently used by keys plus values
    used: usize,
}

impl FileStore {
    // == Constructor ==
    /// Opens the store at `path`, loading existing contents.
    ///
    /// A missing file is an empty store. A file that is not a JSON object of
    /// strings makes the store unavailable.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let entries: BTreeMap<String, String> = match fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                StorageError::Unavailable(format!("{} is not a storage file: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        let used = entries.iter().map(|(k, v)| k.len() + v.len()).sum();
        debug!("Opened file store {} with {} entries", path.display(), entries.len());

        Ok(Self {
            path,
            entries,
            quota: None,
            used,
        })
    }

    /// Limits the total size of keys plus values to `bytes`.
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes currently used by keys plus values.
    pub fn used_bytes(&self) -> usize {
        self.used
    }

    // == Persist ==
    /// Writes the map to a sibling temp file, then renames it over the target.
    fn persist(&self) -> Result<()> {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, serde_json::to_vec_pretty(&self.entries)?)?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        let previous_size = self.entries.get(key).map_or(0, |v| key.len() + v.len());
        let needed = self.used - previous_size + key.len() + value.len();

        if let Some(quota) = self.quota {
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }

        let previous = self.entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.persist() {
            // Roll back so memory matches disk
            match previous {
                Some(old) => self.entries.insert(key.to_string(), old),
                None => self.entries.remove(key),
            };
            return Err(e);
        }

        self.used = needed;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        if let Some(old) = self.entries.remove(key) {
            if let Err(e) = self.persist() {
                self.entries.insert(key.to_string(), old);
                return Err(e);
            }
            self.used -= key.len() + old.len();
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        let previous = std::mem::take(&mut self.entries);
        if let Err(e) = self.persist() {
            self.entries = previous;
            return Err(e);
        }
        self.used = 0;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }
}
