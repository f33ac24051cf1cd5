//! Storage Module
//!
//! The string-valued backing store contract and its two implementations:
//! a volatile in-process map and a persistent JSON file.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::Result;

// == Key Value Store ==
/// Map-like backing store holding string values under string keys.
///
/// Mirrors the host storage contract: every operation may fail, e.g. when the
/// store is inaccessible or a write exceeds its quota.
pub trait KeyValueStore: std::fmt::Debug {
    /// Returns the text stored under `key`, or None if absent.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove_item(&mut self, key: &str) -> Result<()>;

    /// Removes every entry.
    fn clear(&mut self) -> Result<()>;

    /// Lists the keys currently stored, in no particular order.
    fn keys(&self) -> Result<Vec<String>>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }

    fn clear(&mut self) -> Result<()> {
        (**self).clear()
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }
}
