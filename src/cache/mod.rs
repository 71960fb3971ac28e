//! Cache Module
//!
//! In-memory key/value caching with absolute, sliding and dependency-driven
//! expiration.

mod engine;
mod entry;
mod key;
mod policy;
mod signal;
mod stats;
mod store;


// Re-export public types
pub use engine::ExpiringCache;
pub use entry::CacheEntry;
pub use key::{CacheKey, KeyProvider, XxKeyProvider, DEFAULT_NAMESPACE};
pub use policy::ExpirationPolicy;
pub use signal::{CountdownDependency, ExpirationSignal, ManualDependency};
pub use stats::{CacheStats, StatsCounter};
pub use store::Store;
