//! Key Hashing Module
//!
//! Maps an application key and its namespace onto the dense `u64` id the
//! store is keyed by.

use std::fmt;
use std::hash::Hasher;

use twox_hash::XxHash64;

/// Namespace used when the caller does not name one.
pub const DEFAULT_NAMESPACE: &str = "global";

/// Never occurs in UTF-8, so `key ++ SEP ++ namespace` is unambiguous.
const NAMESPACE_SEPARATOR: u8 = 0xFF;

// == Cache Key ==
/// A raw key qualified by its namespace.
///
/// Plain `&str` converts into a key in [`DEFAULT_NAMESPACE`]; a
/// `(key, namespace)` tuple converts into a namespaced key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey<'a> {
    /// Application supplied key
    pub key: &'a str,
    /// Logical partition the key lives in
    pub namespace: &'a str,
}

impl<'a> CacheKey<'a> {
    /// Creates a key in the default namespace.
    pub fn new(key: &'a str) -> Self {
        Self {
            key,
            namespace: DEFAULT_NAMESPACE,
        }
    }

    /// Creates a key in the given namespace.
    pub fn namespaced(key: &'a str, namespace: &'a str) -> Self {
        Self { key, namespace }
    }
}

impl<'a> From<&'a str> for CacheKey<'a> {
    fn from(key: &'a str) -> Self {
        Self::new(key)
    }
}

impl<'a> From<&'a String> for CacheKey<'a> {
    fn from(key: &'a String) -> Self {
        Self::new(key.as_str())
    }
}

impl<'a> From<(&'a str, &'a str)> for CacheKey<'a> {
    fn from((key, namespace): (&'a str, &'a str)) -> Self {
        Self::namespaced(key, namespace)
    }
}

impl fmt::Display for CacheKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.key)
    }
}

// == Key Provider ==
/// Strategy turning a `(key, namespace)` pair into the store's physical id.
///
/// Implementations must be pure: the same pair always yields the same id
/// for the lifetime of the cache.
pub trait KeyProvider: Send + Sync + fmt::Debug {
    /// Hashes `key` within `namespace`.
    fn hash(&self, key: &str, namespace: &str) -> u64;
}

/// Default [`KeyProvider`] backed by XxHash64.
#[derive(Debug, Clone, Copy, Default)]
pub struct XxKeyProvider {
    seed: u64,
}

impl XxKeyProvider {
    /// Creates a provider with a custom seed.
    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }
}

impl KeyProvider for XxKeyProvider {
    fn hash(&self, key: &str, namespace: &str) -> u64 {
        let mut hasher = XxHash64::with_seed(self.seed);
        hasher.write(key.as_bytes());
        hasher.write(&[NAMESPACE_SEPARATOR]);
        hasher.write(namespace.as_bytes());
        hasher.finish()
    }
}
