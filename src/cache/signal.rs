//! Expiration Signal Module
//!
//! External objects that decide on their own whether an entry has expired.
//! The store and sweeper only ever ask [`ExpirationSignal::has_expired`], so
//! new triggers plug in without touching either.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

// == Expiration Signal ==
/// A one-method capability reporting whether a dependency has fired.
///
/// `has_expired` is called while the cache holds a lock on the entry's
/// shard, so implementations must not call back into the cache.
pub trait ExpirationSignal: Send + Sync + fmt::Debug {
    /// Returns `true` once the signal has fired or elapsed.
    fn has_expired(&self) -> bool;
}

// == Countdown Dependency ==
/// Fires once `duration` has elapsed since construction.
#[derive(Debug, Clone, Copy)]
pub struct CountdownDependency {
    started: Instant,
    duration: Duration,
}

impl CountdownDependency {
    /// Starts counting down `duration` from now.
    pub fn new(duration: Duration) -> Self {
        Self {
            started: Instant::now(),
            duration,
        }
    }

    /// Time left before the countdown fires, zero once it has.
    pub fn remaining(&self) -> Duration {
        self.duration.saturating_sub(self.started.elapsed())
    }
}

impl ExpirationSignal for CountdownDependency {
    fn has_expired(&self) -> bool {
        self.started.elapsed() >= self.duration
    }
}

// == Manual Dependency ==
/// Fires when the application calls [`ManualDependency::trigger`].
///
/// Share it through an `Arc` to invalidate an entry from elsewhere, e.g. when
/// a backing record changes.
#[derive(Debug, Default)]
pub struct ManualDependency {
    fired: AtomicBool,
}

impl ManualDependency {
    /// Creates an untriggered signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the dependency as changed. Irreversible.
    pub fn trigger(&self) {
        self.fired.store(true, Ordering::Release);
    }
}

impl ExpirationSignal for ManualDependency {
    fn has_expired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_countdown_fires_after_duration() {
        let countdown = CountdownDependency::new(Duration::from_millis(50));
        assert!(!countdown.has_expired());

        sleep(Duration::from_millis(80));

        assert!(countdown.has_expired());
        assert_eq!(countdown.remaining(), Duration::ZERO);
    }

    #[test]
    fn test_zero_countdown_is_expired_immediately() {
        let countdown = CountdownDependency::new(Duration::ZERO);
        assert!(countdown.has_expired());
    }

    #[test]
    fn test_manual_dependency_trigger() {
        let signal = ManualDependency::new();
        assert!(!signal.has_expired());

        signal.trigger();
        assert!(signal.has_expired());

        // stays fired
        signal.trigger();
        assert!(signal.has_expired());
    }
}
