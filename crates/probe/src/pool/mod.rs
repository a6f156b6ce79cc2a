//! A fixed-size pool of probes sharing one work queue.
//!
//! The [`Pool`] owns the queue, the aggregate [`Counters`], the
//! [`CompletionTracker`], and one cancellation scope per started cycle from
//! which every probe derives its own. Probes are built once, when the pool is
//! created; stopping and restarting the pool reuses them, identities
//! included.

mod config;

pub use config::*;

use crate::{
    CancelScope, CompletionTracker, Counters, PoolStats, Probe, Result, Runner, WorkQueue,
};
#[cfg(feature = "tracing")]
use crate::log::Dispatch;
use parking_lot::Mutex;
use portable_atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A bounded pool of worker threads.
///
/// Units of work are submitted with [`Pool::submit`] and picked up by
/// whichever probe is idle; completion order is unspecified. The pool is
/// `Sync`, so it can be shared behind an [`Arc`] by several producers.
///
/// # Example
/// ```
/// use probe::{Pool, PoolConfig};
/// use std::sync::mpsc;
///
/// let pool = Pool::new(PoolConfig::new().size(4)).unwrap();
/// let (tx, rx) = mpsc::channel();
/// for i in 0..4 {
///     let tx = tx.clone();
///     pool.submit(move || tx.send(i).unwrap());
/// }
/// let mut results: Vec<_> = rx.iter().take(4).collect();
/// results.sort();
/// assert_eq!(results, vec![0, 1, 2, 3]);
///
/// pool.stop(true);
/// assert_eq!(pool.running_count(), 0);
/// ```
pub struct Pool {
    queue: WorkQueue,
    counters: Arc<Counters>,
    tracker: CompletionTracker,
    parent: CancelScope,
    /// Scope of the current (or last) started cycle. Held while starting or
    /// stopping.
    scope: Mutex<CancelScope>,
    started: AtomicBool,
    probes: Vec<Probe>,
    #[cfg(feature = "tracing")]
    sink: Dispatch,
}

impl Pool {
    /// Creates a pool and starts all of its probes.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfig`](crate::Error::InvalidConfig) if the size is
    ///   zero.
    /// - [`Error::RandSource`](crate::Error::RandSource) if a probe identity
    ///   could not be drawn.
    /// - [`Error::Spawn`](crate::Error::Spawn) if a probe thread could not be
    ///   spawned.
    ///
    /// On error, probes created so far are stopped and dropped.
    pub fn new(config: PoolConfig) -> Result<Self> {
        let size = config.resolve_size()?;
        let queue = WorkQueue::bounded(config.resolve_buffer_size());
        let counters = config.resolve_counters();
        let tracker = config.resolve_tracker();
        let parent = config.resolve_cancel();
        let scope = parent.child();

        let probe_config = config
            .probe_config()
            .queue(queue.clone())
            .cancel(scope.clone())
            .counters(counters.clone())
            .tracker(tracker.clone());
        let probes = (0..size)
            .map(|_| Probe::new(probe_config.clone()))
            .collect::<Result<Vec<_>>>()?;

        let pool = Self {
            queue,
            counters,
            tracker,
            parent,
            scope: Mutex::new(scope),
            started: AtomicBool::new(true),
            probes,
            #[cfg(feature = "tracing")]
            sink: config.resolve_sink(),
        };
        #[cfg(feature = "tracing")]
        pool.in_sink(|| tracing::info!(size, "started pool"));
        Ok(pool)
    }

    /// Starts the pool after a [`Pool::stop`]. Does nothing if the pool is
    /// already started.
    ///
    /// Every existing probe is restarted under a fresh pool scope; no probes
    /// are created or replaced.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spawn`](crate::Error::Spawn) if a probe thread could
    /// not be spawned. Probes restarted before the failure are stopped again
    /// and the pool stays stopped.
    pub fn start(&self) -> Result<()> {
        let mut current = self.scope.lock();
        if self.is_started() {
            #[cfg(feature = "tracing")]
            self.in_sink(|| {
                tracing::info!("received start request, but pool is already started")
            });
            return Ok(());
        }
        #[cfg(feature = "tracing")]
        self.in_sink(|| tracing::info!("starting pool"));

        let scope = self.parent.child();
        for probe in &self.probes {
            if let Err(e) = probe.start_under(scope.clone()) {
                scope.cancel();
                return Err(e);
            }
        }
        *current = scope;
        self.started.store(true, Ordering::Release);
        Ok(())
    }

    /// Stops every probe. Does nothing if the pool is not started.
    ///
    /// With `wait` set, blocks until every probe loop has exited, including
    /// any unit of work still executing. There is no timeout.
    ///
    /// Units still waiting in the queue are not dropped; they are picked up
    /// once the pool is started again.
    pub fn stop(&self, wait: bool) {
        let current = self.scope.lock();
        if !self.is_started() {
            #[cfg(feature = "tracing")]
            self.in_sink(|| tracing::info!("received stop request, but pool is not started"));
            return;
        }
        #[cfg(feature = "tracing")]
        self.in_sink(|| tracing::info!(wait, "stopping pool"));

        current.cancel();
        if wait {
            self.tracker.wait();
        }
        self.started.store(false, Ordering::Release);
    }

    /// Submits a unit of work, blocking while the queue is full.
    pub fn submit<F>(&self, unit: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.queue.submit(unit);
    }

    /// Submits an already boxed unit of work, blocking while the queue is
    /// full.
    pub fn submit_boxed(&self, runner: Runner) {
        self.queue.submit_boxed(runner);
    }

    /// Number of probes waiting for work.
    pub fn idle_count(&self) -> usize {
        self.counters.idle()
    }

    /// Number of probes whose loop is active.
    pub fn running_count(&self) -> usize {
        self.counters.running()
    }

    /// `true` between a start and the next stop.
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Number of probes. Fixed for the life of the pool.
    pub fn size(&self) -> usize {
        self.probes.len()
    }

    /// The pool's probes, in construction order.
    pub fn probes(&self) -> &[Probe] {
        &self.probes
    }

    /// Point-in-time snapshot of the pool.
    pub fn stats(&self) -> PoolStats {
        let running = self.counters.running();
        let idle = self.counters.idle();
        PoolStats {
            size: self.size(),
            started: self.is_started(),
            running,
            idle,
            busy: running.saturating_sub(idle),
            panicked: self.counters.panicked(),
            queued: self.queue.len(),
        }
    }

    #[cfg(feature = "tracing")]
    fn in_sink(&self, f: impl FnOnce()) {
        tracing::dispatcher::with_default(&self.sink, f);
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        self.scope.get_mut().cancel();
    }
}

impl core::fmt::Debug for Pool {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Pool")
            .field("size", &self.size())
            .field("started", &self.is_started())
            .field("running", &self.running_count())
            .field("idle", &self.idle_count())
            .finish_non_exhaustive()
    }
}
