//! Expiration Sweep Task
//!
//! Background task that periodically removes expired entries from the store.
//!
//! The timer runs on a current-thread tokio runtime owned by a dedicated OS
//! thread, so a cache can be built and dropped outside any async context.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::cache::{StatsCounter, Store};
use crate::error::{CacheError, Result};

const SWEEPER_THREAD_NAME: &str = "expiry-cache-sweeper";

// == Sweep State ==
/// Lifecycle of a cache's sweep scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepState {
    /// Cleanup disabled; expired entries are only hidden, never reclaimed
    Idle,
    /// Periodic sweeps are armed
    Running,
    /// The owning cache was shut down
    Stopped,
}

// == Sweep Once ==
/// Runs one sweep over `store`, returning the number of entries removed.
///
/// Each expired id is re-checked and removed under its own shard lock, so
/// readers are only ever held up for a single entry.
pub fn sweep_once<V>(store: &Store<V>, stats: &StatsCounter) -> usize {
    let removed = store.evict_expired(Utc::now());
    stats.record_sweep(removed);

    if removed > 0 {
        info!(removed, remaining = store.len(), "Sweep removed expired entries");
    } else {
        debug!(remaining = store.len(), "Sweep found no expired entries");
    }
    removed
}

// == Sweeper ==
/// Handle to a running sweep scheduler.
///
/// Dropping the handle stops the scheduler: the in-flight sweep, if any,
/// finishes and no further sweep is armed.
#[derive(Debug)]
pub struct Sweeper {
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Sweeper {
    // == Spawn ==
    /// Starts sweeping `store`: first after `first_sweep`, then every
    /// `succeeding_sweep` measured from the end of the previous sweep.
    ///
    /// # Errors
    /// [`CacheError::Scheduler`] if the runtime or thread cannot be created.
    pub fn spawn<V>(
        store: Arc<Store<V>>,
        stats: Arc<StatsCounter>,
        first_sweep: Duration,
        succeeding_sweep: Duration,
    ) -> Result<Self>
    where
        V: Send + Sync + 'static,
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|e| CacheError::Scheduler(format!("failed to build timer runtime: {e}")))?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let handle = thread::Builder::new()
            .name(SWEEPER_THREAD_NAME.to_string())
            .spawn(move || {
                runtime.block_on(run_sweeps(
                    store,
                    stats,
                    first_sweep,
                    succeeding_sweep,
                    shutdown_rx,
                ))
            })
            .map_err(|e| CacheError::Scheduler(format!("failed to spawn sweeper thread: {e}")))?;

        Ok(Self {
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    // == Stop ==
    /// Cancels future sweeps and waits for the current one to finish.
    ///
    /// Safe to call more than once.
    pub fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            // the receiver is gone only if the loop already exited
            let _ = shutdown.send(());
        }

        if let Some(handle) = self.handle.take() {
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                warn!("Sweeper thread panicked before shutdown");
            }
        }
    }

    /// Returns true while the scheduler thread is alive.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_sweeps<V>(
    store: Arc<Store<V>>,
    stats: Arc<StatsCounter>,
    first_sweep: Duration,
    succeeding_sweep: Duration,
    mut shutdown: oneshot::Receiver<()>,
) {
    info!(
        first_sweep_ms = first_sweep.as_millis() as u64,
        succeeding_sweep_ms = succeeding_sweep.as_millis() as u64,
        "Starting expiration sweeper"
    );

    let mut delay = first_sweep;
    loop {
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = &mut shutdown => break,
        }

        sweep_once(&store, &stats);
        delay = succeeding_sweep;
    }

    info!("Expiration sweeper stopped");
}
