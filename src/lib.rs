//! Expiry Cache - A thread-safe in-process expiring cache
//!
//! Entries expire at a fixed time, after a sliding idle window, or when an
//! external signal fires. Expired entries disappear from reads immediately
//! and are physically reclaimed by a background sweep.

pub mod cache;
pub mod config;
pub mod error;
pub mod global;
pub mod tasks;

pub use cache::{
    CacheEntry, CacheKey, CacheStats, CountdownDependency, ExpirationPolicy, ExpirationSignal,
    ExpiringCache, KeyProvider, ManualDependency, XxKeyProvider, DEFAULT_NAMESPACE,
};
pub use config::CacheOptions;
pub use error::{CacheError, Result};
pub use tasks::SweepState;
