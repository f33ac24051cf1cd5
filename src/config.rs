//! Configuration Module
//!
//! Facade configuration, the enumerated expiry durations and per-call overrides.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

// == Expire At ==
/// Expiry durations accepted by the expiring facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpireAt {
    OneMinute,
    TwoMinutes,
    ThreeMinutes,
    FourMinutes,
    FiveMinutes,
    TenMinutes,
    FifteenMinutes,
    TwentyMinutes,
}

impl ExpireAt {
    /// All recognized durations, shortest first.
    pub const ALL: [ExpireAt; 8] = [
        ExpireAt::OneMinute,
        ExpireAt::TwoMinutes,
        ExpireAt::ThreeMinutes,
        ExpireAt::FourMinutes,
        ExpireAt::FiveMinutes,
        ExpireAt::TenMinutes,
        ExpireAt::FifteenMinutes,
        ExpireAt::TwentyMinutes,
    ];

    /// Parses a duration label such as `"5m"`.
    ///
    /// Unrecognized labels yield `None`, which callers treat as "no expiry".
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|expire_at| expire_at.label() == label.trim())
    }

    /// Length of the duration in whole minutes.
    pub fn minutes(self) -> u64 {
        match self {
            ExpireAt::OneMinute => 1,
            ExpireAt::TwoMinutes => 2,
            ExpireAt::ThreeMinutes => 3,
            ExpireAt::FourMinutes => 4,
            ExpireAt::FiveMinutes => 5,
            ExpireAt::TenMinutes => 10,
            ExpireAt::FifteenMinutes => 15,
            ExpireAt::TwentyMinutes => 20,
        }
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_secs(self.minutes() * 60)
    }

    pub fn as_millis(self) -> u64 {
        self.minutes() * 60_000
    }

    /// The label form, e.g. `"10m"`.
    pub fn label(self) -> &'static str {
        match self {
            ExpireAt::OneMinute => "1m",
            ExpireAt::TwoMinutes => "2m",
            ExpireAt::ThreeMinutes => "3m",
            ExpireAt::FourMinutes => "4m",
            ExpireAt::FiveMinutes => "5m",
            ExpireAt::TenMinutes => "10m",
            ExpireAt::FifteenMinutes => "15m",
            ExpireAt::TwentyMinutes => "20m",
        }
    }
}

impl fmt::Display for ExpireAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a label is not one of the recognized durations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unrecognized expiry duration: {0}")]
pub struct UnknownExpireAt(pub String);

impl FromStr for ExpireAt {
    type Err = UnknownExpireAt;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownExpireAt(s.to_string()))
    }
}

// == Storage Config ==
/// Per-instance facade configuration.
///
/// `encrypt`, `decrypt` and `secret` are carried for API compatibility only.
/// No read or write path consults them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageConfig {
    /// Default expiry for writes, None = entries never expire
    pub expire_at: Option<ExpireAt>,
    pub encrypt: bool,
    pub decrypt: bool,
    pub secret: Option<String>,
}

impl StorageConfig {
    /// Creates a config with the given default expiry.
    pub fn with_expire_at(expire_at: ExpireAt) -> Self {
        Self {
            expire_at: Some(expire_at),
            ..Self::default()
        }
    }

    /// Loads the configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `LSC_EXPIRE_AT` - Default expiry label, e.g. `5m` (default: none)
    /// - `LSC_ENCRYPT` - `true`/`false` (default: false)
    /// - `LSC_DECRYPT` - `true`/`false` (default: false)
    /// - `LSC_SECRET` - Secret string (default: none)
    pub fn from_env() -> Self {
        Self {
            expire_at: env::var("LSC_EXPIRE_AT")
                .ok()
                .and_then(|v| ExpireAt::parse(&v)),
            encrypt: env::var("LSC_ENCRYPT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            decrypt: env::var("LSC_DECRYPT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            secret: env::var("LSC_SECRET").ok().filter(|v| !v.is_empty()),
        }
    }

    /// Applies per-call overrides on top of this config.
    ///
    /// Shallow merge: every field set on `options` wins, the rest is kept.
    pub fn merged(&self, options: &CallOptions) -> StorageConfig {
        StorageConfig {
            expire_at: options.expire_at.unwrap_or(self.expire_at),
            encrypt: options.encrypt.unwrap_or(self.encrypt),
            decrypt: options.decrypt.unwrap_or(self.decrypt),
            secret: options.secret.clone().or_else(|| self.secret.clone()),
        }
    }
}

// == Call Options ==
/// Overrides for a single facade call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOptions {
    expire_at: Option<Option<ExpireAt>>,
    encrypt: Option<bool>,
    decrypt: Option<bool>,
    secret: Option<String>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expire this write after `expire_at`.
    pub fn expire_at(mut self, expire_at: ExpireAt) -> Self {
        self.expire_at = Some(Some(expire_at));
        self
    }

    /// Override the configured expiry from a label.
    ///
    /// An unrecognized label disables expiry for this call.
    pub fn expire_label(mut self, label: &str) -> Self {
        self.expire_at = Some(ExpireAt::parse(label));
        self
    }

    /// Never expire this write, whatever the configured default.
    pub fn no_expiry(mut self) -> Self {
        self.expire_at = Some(None);
        self
    }

    pub fn encrypt(mut self, encrypt: bool) -> Self {
        self.encrypt = Some(encrypt);
        self
    }

    pub fn decrypt(mut self, decrypt: bool) -> Self {
        self.decrypt = Some(decrypt);
        self
    }

    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }
}

// == File Store Config ==
/// Location and size limit of the persistent file store used by the `lsc` binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStoreConfig {
    /// Path of the JSON storage file
    pub path: PathBuf,
    /// Byte quota for keys plus values
    pub quota_bytes: usize,
}

impl FileStoreConfig {
    /// Default quota, matching the usual per-origin browser limit.
    pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

    /// Loads the file store settings from environment variables.
    ///
    /// # Environment Variables
    /// - `LSC_STORAGE_PATH` - Storage file path (default: lsc-storage.json)
    /// - `LSC_QUOTA_BYTES` - Byte quota (default: 5 MiB)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            path: env::var("LSC_STORAGE_PATH")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.path),
            quota_bytes: env::var("LSC_QUOTA_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.quota_bytes),
        }
    }
}

impl Default for FileStoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("lsc-storage.json"),
            quota_bytes: Self::DEFAULT_QUOTA_BYTES,
        }
    }
}
