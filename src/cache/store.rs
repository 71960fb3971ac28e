//! Cache Store Module
//!
//! Concurrent map from hashed id to [`CacheEntry`]. Every per-id operation
//! runs under that id's shard lock, so inserts on the same id are
//! linearizable and entries on other shards are never blocked.

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::cache::CacheEntry;

// == Store ==
/// Authoritative id → entry mapping shared by callers and the sweeper.
#[derive(Debug)]
pub struct Store<V> {
    entries: DashMap<u64, CacheEntry<V>>,
}

impl<V> Default for Store<V> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<V> Store<V> {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Try Insert ==
    /// Inserts `entry` unless `id` already maps to a live entry.
    ///
    /// An expired occupant is replaced in place. Returns whether `entry` was
    /// stored.
    pub fn try_insert(&self, id: u64, entry: CacheEntry<V>, now: DateTime<Utc>) -> bool {
        match self.entries.entry(id) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_live(now) {
                    return false;
                }
                occupied.insert(entry);
                true
            }
            Entry::Vacant(vacant) => {
                vacant.insert(entry);
                true
            }
        }
    }

    // == Upsert ==
    /// Stores `entry` unconditionally, returning whatever was there before.
    pub fn upsert(&self, id: u64, entry: CacheEntry<V>) -> Option<CacheEntry<V>> {
        self.entries.insert(id, entry)
    }

    /// Stores the entry `build` derives from the current live occupant.
    ///
    /// `build` sees `None` when `id` is vacant or holds an expired entry. It
    /// runs under the shard lock and must not touch the store.
    pub fn upsert_with<F>(&self, id: u64, now: DateTime<Utc>, build: F)
    where
        F: FnOnce(Option<&CacheEntry<V>>) -> CacheEntry<V>,
    {
        match self.entries.entry(id) {
            Entry::Occupied(mut occupied) => {
                let next = {
                    let current = occupied.get();
                    build(current.is_live(now).then_some(current))
                };
                occupied.insert(next);
            }
            Entry::Vacant(vacant) => {
                vacant.insert(build(None));
            }
        }
    }

    // == Contains Live ==
    /// Checks whether `id` maps to a live entry without counting as a read.
    pub fn contains_live(&self, id: u64, now: DateTime<Utc>) -> bool {
        self.entries
            .get(&id)
            .is_some_and(|entry| entry.is_live(now))
    }

    // == Remove ==
    /// Physically removes `id`. Returns whether anything was there.
    pub fn remove(&self, id: u64) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Removes `id` only if its entry is expired at `now`.
    ///
    /// The check and the removal happen under one lock, so an entry that a
    /// concurrent writer just replaced with a live one survives.
    pub fn remove_if_expired(&self, id: u64, now: DateTime<Utc>) -> bool {
        self.entries
            .remove_if(&id, |_, entry| entry.is_expired(now))
            .is_some()
    }

    // == Remove All ==
    /// Clears every entry. Each id is either fully present or fully gone.
    pub fn remove_all(&self) {
        self.entries.clear();
    }

    // == Count Live ==
    /// Counts live entries, restricted to `namespace` when given.
    pub fn count_live(&self, namespace: Option<&str>, now: DateTime<Utc>) -> usize {
        self.entries
            .iter()
            .filter(|entry| namespace.map_or(true, |ns| entry.namespace == ns))
            .filter(|entry| entry.is_live(now))
            .count()
    }

    // == Expired Ids ==
    /// Ids of every entry expired at `now`.
    ///
    /// Shards are read-locked one at a time while scanning.
    pub fn expired_ids(&self, now: DateTime<Utc>) -> Vec<u64> {
        self.entries
            .iter()
            .filter(|entry| entry.is_expired(now))
            .map(|entry| *entry.key())
            .collect()
    }

    // == Evict Expired ==
    /// Physically removes every entry expired at `now`.
    ///
    /// Returns the number of entries removed.
    pub fn evict_expired(&self, now: DateTime<Utc>) -> usize {
        self.expired_ids(now)
            .into_iter()
            .filter(|id| self.remove_if_expired(*id, now))
            .count()
    }

    // == Length ==
    /// Number of physically present entries, live or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if nothing is physically stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone> Store<V> {
    // == Try Get ==
    /// Returns a copy of the live entry at `id`.
    ///
    /// A sliding entry is touched before it is returned. Expired entries are
    /// reported as absent but left for the sweeper.
    pub fn try_get(&self, id: u64, now: DateTime<Utc>) -> Option<CacheEntry<V>> {
        {
            let entry = self.entries.get(&id)?;
            if entry.is_expired(now) {
                return None;
            }
            if !entry.policy.is_sliding() {
                return Some(entry.clone());
            }
        }

        // Sliding hit: take the write lock and check again before touching
        let mut entry = self.entries.get_mut(&id)?;
        if entry.is_expired(now) {
            return None;
        }
        entry.touch(now);
        Some(entry.clone())
    }

    // == Snapshot ==
    /// Copies every physically present entry, expired ones included.
    ///
    /// Concurrent writes may or may not show up.
    pub fn snapshot(&self) -> Vec<(u64, CacheEntry<V>)> {
        self.entries
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }
}
