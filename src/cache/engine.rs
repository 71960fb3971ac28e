//! Expiring Cache Module
//!
//! The public cache: hashes keys, builds entries, and delegates to the store.
//! Owns the background sweeper and stops it on shutdown or drop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, info, trace};

use crate::cache::{
    CacheEntry, CacheKey, CacheStats, ExpirationPolicy, KeyProvider, StatsCounter, Store,
    XxKeyProvider, DEFAULT_NAMESPACE,
};
use crate::config::CacheOptions;
use crate::error::Result;
use crate::tasks::{sweep_once, SweepState, Sweeper};

// == Expiring Cache ==
/// Thread-safe key/value cache with per-entry expiration policies.
///
/// Reads never return an expired entry, even before the sweeper has
/// physically removed it. Share it between threads through an `Arc`.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use expiry_cache::{CacheOptions, ExpirationPolicy, ExpiringCache};
///
/// let cache = ExpiringCache::new(CacheOptions::default().with_cleanup(false)).unwrap();
/// assert!(cache.add("user:1", 42, ExpirationPolicy::Sliding(Duration::from_secs(60))));
/// assert!(!cache.add("user:1", 7, ExpirationPolicy::Never));
/// assert_eq!(cache.get("user:1"), Some(42));
/// ```
#[derive(Debug)]
pub struct ExpiringCache<V> {
    store: Arc<Store<V>>,
    key_provider: Arc<dyn KeyProvider>,
    default_policy: ExpirationPolicy,
    stats: Arc<StatsCounter>,
    sweeper: Mutex<Option<Sweeper>>,
    closed: AtomicBool,
}

impl<V> ExpiringCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Validates `options` and builds the cache, starting the sweeper when
    /// cleanup is enabled.
    ///
    /// # Errors
    /// - [`CacheError::InvalidConfig`](crate::CacheError::InvalidConfig) naming the bad option
    /// - [`CacheError::Scheduler`](crate::CacheError::Scheduler) if the sweeper cannot start
    pub fn new(options: CacheOptions) -> Result<Self> {
        let key_provider = options.validate()?;
        let store = Arc::new(Store::new());
        let stats = Arc::new(StatsCounter::new());

        let sweeper = if options.enable_cleanup {
            Some(Sweeper::spawn(
                store.clone(),
                stats.clone(),
                options.first_sweep,
                options.succeeding_sweep,
            )?)
        } else {
            info!("Expiration sweeper disabled, expired entries are only hidden");
            None
        };

        Ok(Self {
            store,
            key_provider,
            default_policy: options.default_policy,
            stats,
            sweeper: Mutex::new(sweeper),
            closed: AtomicBool::new(false),
        })
    }

    /// Builds a cache with default options and no sweeper.
    ///
    /// Expired entries are hidden from reads but only reclaimed by
    /// [`sweep_now`](Self::sweep_now) or by a later write to the same key.
    pub fn lazy() -> Self {
        let options = CacheOptions::default();
        Self {
            store: Arc::new(Store::new()),
            key_provider: Arc::new(XxKeyProvider::default()),
            default_policy: options.default_policy,
            stats: Arc::new(StatsCounter::new()),
            sweeper: Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    // == Add ==
    /// Stores `value` only if no live entry exists for `key`.
    ///
    /// Returns `true` if this call established the value. Under any amount of
    /// contention on one key exactly one concurrent caller wins.
    pub fn add<'a>(&self, key: impl Into<CacheKey<'a>>, value: V, policy: ExpirationPolicy) -> bool {
        let key = key.into();
        let now = Utc::now();
        let entry = CacheEntry::new(key.key, key.namespace, value, policy, now);

        let won = self.store.try_insert(self.id(key), entry, now);
        self.stats.record_insert(won);
        if !won {
            trace!(%key, "Add rejected, live entry already present");
        }
        won
    }

    // == Get ==
    /// Returns the value for `key` if it is live.
    ///
    /// A successful read of a sliding entry restarts its window.
    pub fn get<'a>(&self, key: impl Into<CacheKey<'a>>) -> Option<V> {
        self.get_entry(key).map(|entry| entry.value)
    }

    /// Returns a copy of the whole live entry for `key`.
    pub fn get_entry<'a>(&self, key: impl Into<CacheKey<'a>>) -> Option<CacheEntry<V>> {
        let hit = self.store.try_get(self.id(key.into()), Utc::now());
        match hit {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        hit
    }

    // == Set ==
    /// Overwrites the value for `key`, keeping the current expiration policy.
    ///
    /// When no live entry exists the configured default policy is used. The
    /// replacement is a fresh entry: creation and access times restart.
    pub fn set<'a>(&self, key: impl Into<CacheKey<'a>>, value: V) {
        let key = key.into();
        let now = Utc::now();
        self.store.upsert_with(self.id(key), now, |current| {
            let policy = current
                .map(|entry| entry.policy.clone())
                .unwrap_or_else(|| self.default_policy.clone());
            CacheEntry::new(key.key, key.namespace, value, policy, now)
        });
    }

    /// Overwrites the value and policy for `key` unconditionally.
    pub fn set_with_policy<'a>(
        &self,
        key: impl Into<CacheKey<'a>>,
        value: V,
        policy: ExpirationPolicy,
    ) {
        let key = key.into();
        let entry = CacheEntry::new(key.key, key.namespace, value, policy, Utc::now());
        self.store.upsert(self.id(key), entry);
    }

    // == Remove ==
    /// Removes `key`. Returns whether an entry was physically present.
    pub fn remove<'a>(&self, key: impl Into<CacheKey<'a>>) -> bool {
        self.store.remove(self.id(key.into()))
    }

    /// Removes every entry in every namespace.
    pub fn remove_all(&self) {
        self.store.remove_all();
        debug!("Removed all cache entries");
    }

    // == Contains ==
    /// Checks whether `key` has a live entry.
    ///
    /// Does not count as a read: sliding windows are left untouched.
    pub fn contains<'a>(&self, key: impl Into<CacheKey<'a>>) -> bool {
        self.store.contains_live(self.id(key.into()), Utc::now())
    }

    // == Entries ==
    /// Snapshot of every physically present entry, keyed by store id.
    ///
    /// Unlike the read operations this includes entries that have expired but
    /// not yet been swept.
    pub fn entries(&self) -> Vec<(u64, CacheEntry<V>)> {
        self.store.snapshot()
    }
}

impl<V> ExpiringCache<V> {
    /// Store id for `key` under the configured key provider.
    pub fn id(&self, key: CacheKey<'_>) -> u64 {
        self.key_provider.hash(key.key, key.namespace)
    }

    // == Count ==
    /// Number of live entries in `namespace`.
    ///
    /// `None` means the default namespace, not every namespace; use
    /// [`count_all`](Self::count_all) for the total.
    pub fn count(&self, namespace: Option<&str>) -> usize {
        let namespace = namespace.unwrap_or(DEFAULT_NAMESPACE);
        self.store.count_live(Some(namespace), Utc::now())
    }

    /// Number of live entries across every namespace.
    pub fn count_all(&self) -> usize {
        self.store.count_live(None, Utc::now())
    }

    /// Number of physically present entries, expired ones included.
    pub fn physical_len(&self) -> usize {
        self.store.len()
    }

    // == Sweep ==
    /// Runs one sweep on the calling thread and returns how many entries it
    /// removed.
    pub fn sweep_now(&self) -> usize {
        sweep_once(&self.store, &self.stats)
    }

    /// Current state of the background sweeper.
    pub fn sweep_state(&self) -> SweepState {
        if self.closed.load(Ordering::Acquire) {
            return SweepState::Stopped;
        }
        match self.sweeper.lock().as_ref() {
            Some(sweeper) if sweeper.is_running() => SweepState::Running,
            Some(_) => SweepState::Stopped,
            None => SweepState::Idle,
        }
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.count_all(), self.physical_len())
    }

    // == Shutdown ==
    /// Stops the sweeper. No sweep starts after this returns; one already
    /// running is allowed to finish first.
    ///
    /// The cache stays usable with lazy expiration only. Idempotent, and
    /// called automatically on drop.
    pub fn shutdown(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let sweeper = self.sweeper.lock().take();
        if let Some(mut sweeper) = sweeper {
            sweeper.stop();
            info!("Expiring cache shut down");
        }
    }
}

impl<V> Drop for ExpiringCache<V> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
