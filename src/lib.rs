//! LSC Storage - A lightweight key-value storage facade
//!
//! Stores JSON values under string keys with optional expiry, falling back to
//! volatile in-memory storage when persistent storage cannot be accessed.

pub mod adapter;
pub mod config;
pub mod error;
pub mod facade;
pub mod storage;

pub use adapter::Reply;
pub use config::{CallOptions, ExpireAt, FileStoreConfig, StorageConfig};
pub use error::{Result, StorageError};
pub use facade::{ExpiringFacade, SetOutcome, StorageFacade};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
