//! Expiring Facade Module
//!
//! JSON facade that wraps each value in an [`Envelope`] carrying an absolute
//! expiry, and evicts expired entries when they are read.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{CallOptions, StorageConfig};
use crate::error::{Result, StorageError};
use crate::facade::{select_backend, Clock, Envelope, SystemClock};
use crate::storage::{KeyValueStore, MemoryStore};

/// Status reported for a successful write.
pub const STATUS_OK: u16 = 200;
/// Status reported for a failed write.
pub const STATUS_FAILED: u16 = 400;

// == Set Outcome ==
/// Structured result of [`ExpiringFacade::set`], also handed to callbacks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetOutcome {
    pub message: String,
    pub status: u16,
    /// The stored value on success, None on failure
    pub value: Option<Value>,
}

impl SetOutcome {
    fn stored(key: &str, value: Value) -> Self {
        Self {
            message: format!("Key '{}' set successfully", key),
            status: STATUS_OK,
            value: Some(value),
        }
    }

    fn failed(key: &str, error: &StorageError) -> Self {
        Self {
            message: format!("Failed to set key '{}': {}", key, error),
            status: STATUS_FAILED,
            value: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

// == Expiring Facade ==
/// JSON get/set with lazy expiry.
///
/// Expiry is only checked on read. An expired entry that is never read keeps
/// its space until it is removed or the store is cleared.
#[derive(Debug)]
pub struct ExpiringFacade {
    storage: Box<dyn KeyValueStore>,
    /// Instance defaults, including the default expiry
    config: StorageConfig,
    clock: Box<dyn Clock>,
    volatile: bool,
}

impl ExpiringFacade {
    // == Constructor ==
    /// Creates a facade over `persistent` using wall clock time.
    ///
    /// The store is probed once with a trial read; if that fails the facade
    /// runs on a fresh `MemoryStore`.
    pub fn new<S>(persistent: S, config: StorageConfig) -> Self
    where
        S: KeyValueStore + 'static,
    {
        Self::with_clock(persistent, config, SystemClock)
    }

    /// Creates a facade with an explicit time source.
    pub fn with_clock<S, C>(persistent: S, config: StorageConfig, clock: C) -> Self
    where
        S: KeyValueStore + 'static,
        C: Clock + 'static,
    {
        let (storage, volatile) = select_backend(persistent);
        Self {
            storage,
            config,
            clock: Box::new(clock),
            volatile,
        }
    }

    /// Creates a facade that only ever uses volatile storage.
    pub fn volatile(config: StorageConfig) -> Self {
        Self {
            storage: Box::new(MemoryStore::new()),
            config,
            clock: Box::new(SystemClock),
            volatile: true,
        }
    }

    pub fn is_volatile(&self) -> bool {
        self.volatile
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    // == Set ==
    /// Stores `value` under `key` with the effective expiry.
    ///
    /// The expiry comes from `options` if given, otherwise from the instance
    /// config. Failures are reported in the returned outcome with status 400.
    pub fn set<T>(&mut self, key: &str, value: &T, options: &CallOptions) -> SetOutcome
    where
        T: Serialize + ?Sized,
    {
        match self.try_set(key, value, options) {
            Ok(stored) => {
                debug!("Stored key '{}'", key);
                SetOutcome::stored(key, stored)
            }
            Err(e) => {
                warn!("Failed to store key '{}': {}", key, e);
                SetOutcome::failed(key, &e)
            }
        }
    }

    /// Like [`set`](Self::set), then hands the outcome to `callback`.
    pub fn set_with_callback<T, F>(
        &mut self,
        key: &str,
        value: &T,
        options: &CallOptions,
        callback: F,
    ) -> SetOutcome
    where
        T: Serialize + ?Sized,
        F: FnOnce(&SetOutcome),
    {
        let outcome = self.set(key, value, options);
        callback(&outcome);
        outcome
    }

    fn try_set<T>(&mut self, key: &str, value: &T, options: &CallOptions) -> Result<Value>
    where
        T: Serialize + ?Sized,
    {
        let config = self.config.merged(options);
        let value = serde_json::to_value(value)?;
        let envelope = Envelope::new(
            &value,
            self.clock.now_ms(),
            config.expire_at.map(|e| e.as_millis()),
        );

        let text = serde_json::to_string(&envelope)?;
        self.storage.set_item(key, &text)?;
        Ok(value)
    }

    // == Get ==
    /// Retrieves the value under `key` if it is present and not expired.
    ///
    /// An expired entry is removed before returning None. Absent, corrupt and
    /// wrongly-typed entries also yield None.
    pub fn get<T>(&mut self, key: &str, _options: &CallOptions) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let envelope = self.live_envelope(key)?;

        match serde_json::from_value(envelope.value) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("Stored value for key '{}' has an unexpected shape: {}", key, e);
                None
            }
        }
    }

    // == Time To Live ==
    /// Returns the remaining lifetime of `key`.
    ///
    /// None if the key is absent, unreadable, expired (it is evicted) or has
    /// no expiry.
    pub fn ttl_remaining(&mut self, key: &str) -> Option<Duration> {
        let envelope = self.live_envelope(key)?;
        envelope
            .remaining_ms(self.clock.now_ms())
            .map(Duration::from_millis)
    }

    /// Reads the envelope under `key`, evicting it if it has expired.
    fn live_envelope(&mut self, key: &str) -> Option<Envelope<Value>> {
        let text = match self.storage.get_item(key) {
            Ok(Some(text)) => text,
            Ok(None) => {
                debug!("Key '{}' not found", key);
                return None;
            }
            Err(e) => {
                warn!("Failed to read key '{}': {}", key, e);
                return None;
            }
        };

        let envelope: Envelope<Value> = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(e) => {
                debug!("Stored data for key '{}' is not an envelope: {}", key, e);
                return None;
            }
        };

        if envelope.is_expired_at(self.clock.now_ms()) {
            debug!("Key '{}' expired, evicting", key);
            if let Err(e) = self.storage.remove_item(key) {
                warn!("Failed to evict expired key '{}': {}", key, e);
            }
            return None;
        }

        Some(envelope)
    }

    // == Remove ==
    /// Removes `key`.
    pub fn remove(&mut self, key: &str) -> Result<()> {
        self.storage.remove_item(key).map_err(|e| {
            warn!("Failed to remove key '{}': {}", key, e);
            e
        })
    }

    /// Removes `key`, then calls `callback` with the error on failure or
    /// None on success.
    pub fn remove_with_callback<F>(&mut self, key: &str, callback: F) -> Result<()>
    where
        F: FnOnce(Option<&StorageError>),
    {
        let result = self.remove(key);
        callback(result.as_ref().err());
        result
    }

    // == Clear ==
    /// Removes every entry, expired or not.
    pub fn clear(&mut self) {
        if let Err(e) = self.storage.clear() {
            warn!("Failed to clear storage: {}", e);
        }
    }
}
