//! Configuration Module
//!
//! Options recognised by the cache, with defaults, environment loading and
//! the validation run once at construction.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{ExpirationPolicy, KeyProvider, XxKeyProvider};
use crate::error::{CacheError, Result};

/// Delay before the first sweep.
pub const DEFAULT_FIRST_SWEEP: Duration = Duration::from_secs(30);

/// Interval between subsequent sweeps.
pub const DEFAULT_SUCCEEDING_SWEEP: Duration = Duration::from_secs(120);

/// Sliding window applied by `set` when there is no live entry to inherit from.
pub const DEFAULT_SLIDING_WINDOW: Duration = Duration::from_secs(20 * 60);

/// Cache configuration.
#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// Strategy hashing `(key, namespace)` into store ids; required
    pub key_provider: Option<Arc<dyn KeyProvider>>,
    /// Whether the background sweeper runs at all
    pub enable_cleanup: bool,
    /// Delay before the first sweep
    pub first_sweep: Duration,
    /// Interval between subsequent sweeps
    pub succeeding_sweep: Duration,
    /// Policy used by `set` when no live entry exists for the key
    pub default_policy: ExpirationPolicy,
}

impl CacheOptions {
    /// Creates a new CacheOptions by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_ENABLE_CLEANUP` - `true`/`false` (default: true)
    /// - `CACHE_FIRST_SWEEP_SECS` - Seconds before the first sweep (default: 30)
    /// - `CACHE_SUCCEEDING_SWEEP_SECS` - Seconds between sweeps (default: 120)
    ///
    /// Unset or unparsable variables keep their default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enable_cleanup: env::var("CACHE_ENABLE_CLEANUP")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.enable_cleanup),
            first_sweep: env::var("CACHE_FIRST_SWEEP_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.first_sweep),
            succeeding_sweep: env::var("CACHE_SUCCEEDING_SWEEP_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.succeeding_sweep),
            ..defaults
        }
    }

    // == Builders ==
    /// Sets the key hashing strategy.
    pub fn with_key_provider(mut self, provider: impl KeyProvider + 'static) -> Self {
        self.key_provider = Some(Arc::new(provider));
        self
    }

    /// Removes the key provider. Construction will then fail validation.
    pub fn without_key_provider(mut self) -> Self {
        self.key_provider = None;
        self
    }

    /// Turns the background sweeper on or off.
    pub fn with_cleanup(mut self, enable: bool) -> Self {
        self.enable_cleanup = enable;
        self
    }

    /// Sets the delay before the first sweep.
    pub fn with_first_sweep(mut self, delay: Duration) -> Self {
        self.first_sweep = delay;
        self
    }

    /// Sets the interval between subsequent sweeps.
    pub fn with_succeeding_sweep(mut self, interval: Duration) -> Self {
        self.succeeding_sweep = interval;
        self
    }

    /// Sets the policy `set` falls back to when no live entry exists.
    pub fn with_default_policy(mut self, policy: ExpirationPolicy) -> Self {
        self.default_policy = policy;
        self
    }

    // == Validate ==
    /// Checks the options, returning the key provider on success.
    pub fn validate(&self) -> Result<Arc<dyn KeyProvider>> {
        let provider = self
            .key_provider
            .clone()
            .ok_or_else(|| CacheError::invalid_config("key_provider", "a key provider is required"))?;

        // a zero interval would re-run the sweep in a tight loop
        if self.enable_cleanup && self.succeeding_sweep.is_zero() {
            return Err(CacheError::invalid_config(
                "succeeding_sweep",
                "interval must be greater than zero when cleanup is enabled",
            ));
        }

        Ok(provider)
    }
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            key_provider: Some(Arc::new(XxKeyProvider::default())),
            enable_cleanup: true,
            first_sweep: DEFAULT_FIRST_SWEEP,
            succeeding_sweep: DEFAULT_SUCCEEDING_SWEEP,
            default_policy: ExpirationPolicy::Sliding(DEFAULT_SLIDING_WINDOW),
        }
    }
}
