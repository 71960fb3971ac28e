//! Process-wide Default Cache
//!
//! Convenience for application entry points that want one shared cache
//! without threading a handle through. Library code should take an
//! [`ExpiringCache`] by reference instead; nothing in this crate uses the
//! global itself.

use std::any::Any;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::warn;

use crate::cache::{CacheKey, ExpiringCache};
use crate::config::CacheOptions;

/// Type-erased value stored in the default cache.
pub type SharedValue = Arc<dyn Any + Send + Sync>;

static DEFAULT_CACHE: Lazy<ExpiringCache<SharedValue>> = Lazy::new(build_default_cache);

fn build_default_cache() -> ExpiringCache<SharedValue> {
    match ExpiringCache::new(CacheOptions::from_env()) {
        Ok(cache) => cache,
        Err(e) => {
            warn!(error = %e, "Default cache options rejected, falling back to lazy expiration only");
            ExpiringCache::lazy()
        }
    }
}

/// The process-wide cache, built from the environment on first access.
pub fn default_cache() -> &'static ExpiringCache<SharedValue> {
    &DEFAULT_CACHE
}

/// Reads `key` from the default cache and downcasts it to `T`.
///
/// Returns `None` when the key is missing, expired, or holds another type.
pub fn get_as<'a, T>(key: impl Into<CacheKey<'a>>) -> Option<Arc<T>>
where
    T: Any + Send + Sync,
{
    default_cache().get(key)?.downcast::<T>().ok()
}
