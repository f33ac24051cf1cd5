//! Functional Adapter
//!
//! Stateless store/retrieve operations directly against a persistent store.
//! No fallback and no expiry; every outcome other than a decoded value is a
//! human-readable status string.
//!
//! The status strings are returned as-is, so a stored value that equals one of
//! them cannot be told apart from that status by the caller.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::error::{Result, StorageError};
use crate::storage::KeyValueStore;

/// Returned by [`retrieve`] when the key holds nothing.
pub const NO_DATA_FOUND: &str = "No data found in local storage";
/// Returned by [`retrieve`] when the stored text is not valid JSON.
pub const PARSE_FAILED: &str = "Failed to parse the data from local storage";
/// Returned by either operation when the store itself fails.
pub const ACCESS_ERROR: &str = "Error accessing local storage";

// == Reply ==
/// Result of [`retrieve`]: either the decoded value or a status string.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    Data(T),
    Status(String),
}

impl<T> Reply<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            Reply::Data(value) => Some(value),
            Reply::Status(_) => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Reply::Data(value) => Some(value),
            Reply::Status(_) => None,
        }
    }

    pub fn status(&self) -> Option<&str> {
        match self {
            Reply::Data(_) => None,
            Reply::Status(message) => Some(message),
        }
    }
}

// == Store ==
/// Stores the JSON encoding of `value` under `key`.
///
/// Returns `"<key> stored in local storage!"` on success, [`ACCESS_ERROR`]
/// otherwise.
pub fn store<S, T>(storage: &mut S, key: &str, value: &T) -> String
where
    S: KeyValueStore + ?Sized,
    T: Serialize + ?Sized,
{
    let written = serde_json::to_string(value)
        .map_err(StorageError::from)
        .and_then(|text| storage.set_item(key, &text));

    match written {
        Ok(()) => {
            debug!("Stored key '{}'", key);
            format!("{} stored in local storage!", key)
        }
        Err(e) => access_error(&e),
    }
}

// == Retrieve ==
/// Reads and decodes the value under `key`.
///
/// Yields [`NO_DATA_FOUND`] for absent or empty entries, [`PARSE_FAILED`] for
/// text that does not decode, and [`ACCESS_ERROR`] if the read itself fails.
pub fn retrieve<S, T>(storage: &S, key: &str) -> Reply<T>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    let text = match read(storage, key) {
        Ok(Some(text)) => text,
        Ok(None) => return Reply::Status(NO_DATA_FOUND.to_string()),
        Err(e) => return Reply::Status(access_error(&e)),
    };

    match serde_json::from_str(&text) {
        Ok(value) => Reply::Data(value),
        Err(e) => {
            error!("Failed to parse the data from local storage: {}", e);
            Reply::Status(PARSE_FAILED.to_string())
        }
    }
}

fn read<S>(storage: &S, key: &str) -> Result<Option<String>>
where
    S: KeyValueStore + ?Sized,
{
    Ok(storage.get_item(key)?.filter(|text| !text.is_empty()))
}

/// Logs `e` by kind and returns the access error status.
fn access_error(e: &StorageError) -> String {
    if e.is_quota_exceeded() {
        warn!("Storage is full, please clear some space!");
    } else {
        error!("Error accessing local storage: {}", e);
    }
    ACCESS_ERROR.to_string()
}
