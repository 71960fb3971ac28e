//! Concurrency Tests
//!
//! Many threads hammering one cache: single-winner adds, distinct-key
//! inserts, and writers racing the background sweeper.

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use expiry_cache::{CacheOptions, ExpirationPolicy, ExpiringCache};

// == Helper Functions ==

fn lazy_cache() -> ExpiringCache<usize> {
    ExpiringCache::new(CacheOptions::default().with_cleanup(false)).unwrap()
}

fn far_future() -> ExpirationPolicy {
    ExpirationPolicy::Absolute(Utc::now() + TimeDelta::days(365))
}

// == Single Winner ==

#[test_log::test]
fn test_concurrent_adds_on_same_key_have_one_winner() {
    const THREADS: usize = 100;
    const CALLS_PER_THREAD: usize = 10;

    let cache = lazy_cache();
    let barrier = Barrier::new(THREADS);

    let winners: Vec<usize> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let cache = &cache;
                let barrier = &barrier;
                s.spawn(move || {
                    barrier.wait();
                    (0..CALLS_PER_THREAD)
                        .map(|i| t * CALLS_PER_THREAD + i)
                        .filter(|value| cache.add("hot", *value, far_future()))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });

    assert_eq!(winners.len(), 1, "exactly one add must win");
    assert_eq!(cache.get("hot"), Some(winners[0]));
    assert_eq!(cache.count(None), 1);

    let stats = cache.stats();
    assert_eq!(stats.inserts, 1);
    assert_eq!(stats.rejected_inserts, (THREADS * CALLS_PER_THREAD - 1) as u64);

    assert!(cache.remove("hot"));
    assert_eq!(cache.count(None), 0);
}

#[test_log::test]
fn test_concurrent_adds_on_expired_key_have_one_winner() {
    const THREADS: usize = 64;

    let cache = lazy_cache();
    cache.add("stale", usize::MAX, ExpirationPolicy::Absolute(Utc::now()));
    let barrier = Barrier::new(THREADS);

    let wins: usize = thread::scope(|s| {
        (0..THREADS)
            .map(|t| {
                let cache = &cache;
                let barrier = &barrier;
                s.spawn(move || {
                    barrier.wait();
                    cache.add("stale", t, far_future()) as usize
                })
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap())
            .sum()
    });

    assert_eq!(wins, 1);
    assert_ne!(cache.get("stale"), Some(usize::MAX));
}

// == Distinct Keys ==

#[test_log::test]
fn test_concurrent_distinct_keys_are_all_stored() {
    const THREADS: usize = 50;
    const KEYS_PER_THREAD: usize = 20;

    let cache = lazy_cache();

    thread::scope(|s| {
        for t in 0..THREADS {
            let cache = &cache;
            s.spawn(move || {
                for i in 0..KEYS_PER_THREAD {
                    let value = t * KEYS_PER_THREAD + i;
                    assert!(cache.add(&format!("key-{value}"), value, far_future()));
                }
            });
        }
    });

    assert_eq!(cache.count(None), THREADS * KEYS_PER_THREAD);
    for value in 0..THREADS * KEYS_PER_THREAD {
        assert_eq!(cache.get(&format!("key-{value}")), Some(value));
    }
}

#[test_log::test]
fn test_concurrent_set_last_writer_visible() {
    const THREADS: usize = 32;

    let cache = lazy_cache();
    thread::scope(|s| {
        for t in 0..THREADS {
            let cache = &cache;
            s.spawn(move || {
                for _ in 0..100 {
                    cache.set("shared", t);
                }
            });
        }
    });

    let value = cache.get("shared").unwrap();
    assert!(value < THREADS);
    assert_eq!(cache.physical_len(), 1);
}

// == Sweeper Races ==

#[test_log::test]
fn test_writers_race_sweeper_without_losing_live_entries() {
    let options = CacheOptions::default()
        .with_first_sweep(Duration::from_millis(5))
        .with_succeeding_sweep(Duration::from_millis(5));
    let cache: Arc<ExpiringCache<usize>> = Arc::new(ExpiringCache::new(options).unwrap());

    thread::scope(|s| {
        for t in 0..8 {
            let cache = &cache;
            s.spawn(move || {
                for i in 0..500 {
                    // short-lived churn the sweeper keeps reclaiming
                    cache.set_with_policy(
                        ("churn", "race"),
                        i,
                        ExpirationPolicy::expires_in(Duration::from_millis(1)),
                    );
                    cache.add(&format!("keep-{t}-{i}"), i, ExpirationPolicy::Never);
                }
            });
        }
    });

    thread::sleep(Duration::from_millis(50));

    assert_eq!(cache.count(None), 8 * 500);
    for t in 0..8 {
        for i in 0..500 {
            assert_eq!(cache.get(&format!("keep-{t}-{i}")), Some(i));
        }
    }
    assert!(cache.stats().sweeps > 0);
}

#[test_log::test]
fn test_remove_all_during_reads() {
    let cache = lazy_cache();
    for i in 0..1_000 {
        cache.add(&format!("k{i}"), i, ExpirationPolicy::Never);
    }

    thread::scope(|s| {
        for _ in 0..4 {
            let cache = &cache;
            s.spawn(move || {
                for i in 0..1_000 {
                    // each key is either fully present or fully absent
                    if let Some(value) = cache.get(&format!("k{i}")) {
                        assert_eq!(value, i);
                    }
                }
            });
        }
        s.spawn(|| cache.remove_all());
    });

    assert_eq!(cache.count(None), 0);
}
