//! Cache Entry Module
//!
//! Defines the unit stored in the cache: value, expiration policy and the
//! timestamps the policy is evaluated against.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::cache::ExpirationPolicy;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// Raw key the entry was stored under
    pub key: String,
    /// Namespace the entry belongs to
    pub namespace: String,
    /// The stored value
    pub value: V,
    /// When the entry stops being live
    pub policy: ExpirationPolicy,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last successful read (creation time until the first read)
    pub last_access: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry stamped with `now`.
    ///
    /// # Arguments
    /// * `key` - Raw key
    /// * `namespace` - Namespace of the key
    /// * `value` - The value to store
    /// * `policy` - Expiration policy
    /// * `now` - Creation and initial access time
    pub fn new(
        key: impl Into<String>,
        namespace: impl Into<String>,
        value: V,
        policy: ExpirationPolicy,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            key: key.into(),
            namespace: namespace.into(),
            value,
            policy,
            created_at: now,
            last_access: now,
        }
    }

    // == Is Expired ==
    /// Checks if the entry is logically expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.policy.is_expired(self.last_access, now)
    }

    /// Checks if the entry is still live at `now`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired(now)
    }

    // == Touch ==
    /// Records a successful read at `now`.
    ///
    /// Only sliding entries care; for them this pushes the deadline forward.
    /// A `now` older than the recorded access never moves it back.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if self.policy.is_sliding() {
            self.last_access = self.last_access.max(now);
        }
    }

    // == Time To Live ==
    /// Returns how long until the entry expires.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` if the deadline has passed
    /// - `Some(remaining)` for clock-based policies that have not expired
    /// - `None` for dependency and never-expiring policies
    pub fn ttl_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.policy
            .deadline(self.last_access)
            .map(|deadline| (deadline - now).to_std().unwrap_or(Duration::ZERO))
    }
}
