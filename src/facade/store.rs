//! Storage Facade Module
//!
//! Plain JSON facade: values are stored as their JSON encoding, failures are
//! reported as `false` or `None`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{CallOptions, StorageConfig};
use crate::facade::select_backend;
use crate::storage::{KeyValueStore, MemoryStore};

// == Storage Facade ==
/// JSON get/set over a backing store chosen at construction.
#[derive(Debug)]
pub struct StorageFacade {
    /// Persistent store, or the volatile fallback
    storage: Box<dyn KeyValueStore>,
    /// Instance defaults merged under per-call options
    config: StorageConfig,
    /// True when the fallback was selected
    volatile: bool,
}

impl StorageFacade {
    // == Constructor ==
    /// Creates a facade over `persistent`, probing it once with a trial read.
    ///
    /// If the probe fails the facade runs on a fresh `MemoryStore` instead.
    pub fn new<S>(persistent: S) -> Self
    where
        S: KeyValueStore + 'static,
    {
        Self::with_config(persistent, StorageConfig::default())
    }

    pub fn with_config<S>(persistent: S, config: StorageConfig) -> Self
    where
        S: KeyValueStore + 'static,
    {
        let (storage, volatile) = select_backend(persistent);
        Self {
            storage,
            config,
            volatile,
        }
    }

    /// Creates a facade from the result of opening a persistent store.
    ///
    /// An open error counts as inaccessible storage.
    pub fn with_fallback<S>(opened: crate::error::Result<S>) -> Self
    where
        S: KeyValueStore + 'static,
    {
        match opened {
            Ok(persistent) => Self::new(persistent),
            Err(e) => {
                warn!("Persistent storage unavailable, falling back to memory: {}", e);
                Self::volatile(StorageConfig::default())
            }
        }
    }

    /// Creates a facade that only ever uses volatile storage.
    pub fn volatile(config: StorageConfig) -> Self {
        Self {
            storage: Box::new(MemoryStore::new()),
            config,
            volatile: true,
        }
    }

    /// Returns true if the facade fell back to volatile storage.
    pub fn is_volatile(&self) -> bool {
        self.volatile
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    // == Set ==
    /// Stores the JSON encoding of `value` under `key`.
    ///
    /// Returns false if encoding or the write failed (quota exceeded included).
    pub fn set<T>(&mut self, key: &str, value: &T, options: &CallOptions) -> bool
    where
        T: Serialize + ?Sized,
    {
        let config = self.config.merged(options);
        if config.expire_at.is_some() {
            debug!("Expiry is not applied by the plain facade for key '{}'", key);
        }

        let text = match serde_json::to_string(value) {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to encode value for key '{}': {}", key, e);
                return false;
            }
        };

        match self.storage.set_item(key, &text) {
            Ok(()) => {
                debug!("Stored key '{}' ({} bytes)", key, text.len());
                true
            }
            Err(e) => {
                warn!("Failed to store key '{}': {}", key, e);
                false
            }
        }
    }

    // == Get ==
    /// Retrieves and decodes the value stored under `key`.
    ///
    /// Absent, empty and undecodable entries all yield None. No option changes
    /// how the plain facade reads.
    pub fn get<T>(&self, key: &str, _options: &CallOptions) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let text = match self.storage.get_item(key) {
            Ok(Some(text)) if !text.is_empty() => text,
            Ok(_) => {
                debug!("Key '{}' not found", key);
                return None;
            }
            Err(e) => {
                warn!("Failed to read key '{}': {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("Stored data for key '{}' is not valid JSON: {}", key, e);
                None
            }
        }
    }

    // == Remove ==
    /// Removes `key`. Failures are logged only.
    pub fn remove(&mut self, key: &str) {
        if let Err(e) = self.storage.remove_item(key) {
            warn!("Failed to remove key '{}': {}", key, e);
        }
    }

    // == Clear ==
    /// Removes every entry in the backing store.
    pub fn clear(&mut self) {
        if let Err(e) = self.storage.clear() {
            warn!("Failed to clear storage: {}", e);
        }
    }

    // == Flush ==
    /// Removes every key one by one when `force` is set; otherwise does nothing.
    ///
    /// Keys that fail to delete are skipped.
    pub fn flush(&mut self, force: bool) {
        if !force {
            return;
        }

        let keys = match self.storage.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Failed to list keys for flush: {}", e);
                return;
            }
        };

        let mut removed = 0;
        for key in keys {
            match self.storage.remove_item(&key) {
                Ok(()) => removed += 1,
                Err(e) => warn!("Flush skipped key '{}': {}", key, e),
            }
        }
        debug!("Flush removed {} entries", removed);
    }
}
