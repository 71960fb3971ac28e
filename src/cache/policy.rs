//! Expiration Policy Module
//!
//! Describes when a cache entry stops being live.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::cache::signal::ExpirationSignal;

// == Expiration Policy ==
/// When an entry becomes invalid.
#[derive(Debug, Clone)]
pub enum ExpirationPolicy {
    /// Expires at a fixed point in time.
    Absolute(DateTime<Utc>),
    /// Expires once the window passes without a successful read.
    Sliding(Duration),
    /// Expires when the external signal fires.
    Dependency(Arc<dyn ExpirationSignal>),
    /// Never expires; the entry leaves only by explicit removal.
    Never,
}

impl ExpirationPolicy {
    // == Constructors ==
    /// Absolute expiration `ttl` from now.
    ///
    /// A `ttl` too large to represent yields [`ExpirationPolicy::Never`].
    pub fn expires_in(ttl: Duration) -> Self {
        match deadline_after(Utc::now(), ttl) {
            Some(at) => Self::Absolute(at),
            None => Self::Never,
        }
    }

    /// Dependency expiration driven by `signal`.
    pub fn dependency(signal: impl ExpirationSignal + 'static) -> Self {
        Self::Dependency(Arc::new(signal))
    }

    // == Is Expired ==
    /// Checks the policy against `now`.
    ///
    /// `last_access` only matters for [`ExpirationPolicy::Sliding`]. Both
    /// clock-based variants treat the boundary as expired: an entry whose
    /// deadline equals `now` is already gone.
    pub fn is_expired(&self, last_access: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            Self::Absolute(at) => now >= *at,
            Self::Sliding(window) => match deadline_after(last_access, *window) {
                Some(deadline) => now >= deadline,
                None => false,
            },
            Self::Dependency(signal) => signal.has_expired(),
            Self::Never => false,
        }
    }

    // == Deadline ==
    /// The instant the entry expires, if the policy is clock based.
    pub fn deadline(&self, last_access: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Absolute(at) => Some(*at),
            Self::Sliding(window) => deadline_after(last_access, *window),
            Self::Dependency(_) | Self::Never => None,
        }
    }

    /// Whether a successful read pushes the deadline forward.
    pub fn is_sliding(&self) -> bool {
        matches!(self, Self::Sliding(_))
    }
}

/// `start + window`, or `None` when it does not fit in a `DateTime`.
fn deadline_after(start: DateTime<Utc>, window: Duration) -> Option<DateTime<Utc>> {
    TimeDelta::from_std(window)
        .ok()
        .and_then(|delta| start.checked_add_signed(delta))
}
