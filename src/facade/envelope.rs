//! Envelope Module
//!
//! The wrapper persisted by the expiring facade in place of the raw value.

use serde::{Deserialize, Deserializer, Serialize};

// == Envelope ==
/// A stored value together with its absolute expiry.
///
/// Persisted as `{"value": ..., "expiresAt": <ms> | null}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// The stored value
    pub value: T,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    #[serde(
        rename = "expiresAt",
        default,
        deserialize_with = "deserialize_expires_at"
    )]
    pub expires_at: Option<u64>,
}

impl<T> Envelope<T> {
    // == Constructor ==
    /// Wraps `value`, expiring `ttl_ms` after `now_ms` when a TTL is given.
    pub fn new(value: T, now_ms: u64, ttl_ms: Option<u64>) -> Self {
        Self {
            value,
            expires_at: ttl_ms.map(|ttl| now_ms.saturating_add(ttl)),
        }
    }

    // == Is Expired ==
    /// Checks if the envelope has expired at `now_ms`.
    ///
    /// Expiry fires only once `now_ms` is strictly past `expires_at`; an
    /// envelope without expiry never expires.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        match self.expires_at {
            Some(expires) => now_ms > expires,
            None => false,
        }
    }

    /// Returns remaining lifetime in milliseconds, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(0)` if the envelope has expired
    /// - `Some(remaining_ms)` if it has an expiry that hasn't passed
    /// - `None` if it never expires
    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        self.expires_at
            .map(|expires| expires.saturating_sub(now_ms))
    }
}

/// Reads `expiresAt`, treating a zero timestamp like `null`.
fn deserialize_expires_at<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.filter(|&ms| ms != 0))
}
