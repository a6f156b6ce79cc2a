//! State shared by every probe bound to the same pool.
//!
//! [`Counters`] aggregates running/idle state across probes, and
//! [`CompletionTracker`] lets an owner block until every probe loop it has
//! started has exited. Both are cheap to clone via [`Arc`] and may be shared
//! by probes from several pools.

use crossbeam_utils::CachePadded;
use parking_lot::{Condvar, Mutex};
use portable_atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Aggregate probe counters.
///
/// Every probe bound to a `Counters` instance adjusts it as its loop starts,
/// picks up work, finishes work, and exits. Reads are point-in-time
/// snapshots.
#[derive(Debug, Default)]
pub struct Counters {
    running: CachePadded<AtomicUsize>,
    idle: CachePadded<AtomicUsize>,
    panicked: AtomicUsize,
}

impl Counters {
    /// Creates a zeroed, shareable instance.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of probes whose loop is active.
    pub fn running(&self) -> usize {
        self.running.load(Ordering::Acquire)
    }

    /// Number of active probes not currently executing a unit of work.
    pub fn idle(&self) -> usize {
        self.idle.load(Ordering::Acquire)
    }

    /// Number of units of work that panicked.
    pub fn panicked(&self) -> usize {
        self.panicked.load(Ordering::Acquire)
    }

    pub(crate) fn loop_started(&self) {
        self.running.fetch_add(1, Ordering::AcqRel);
        self.idle.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn loop_exited(&self) {
        self.idle.fetch_sub(1, Ordering::AcqRel);
        self.running.fetch_sub(1, Ordering::AcqRel);
    }

    pub(crate) fn work_started(&self) {
        self.idle.fetch_sub(1, Ordering::AcqRel);
    }

    pub(crate) fn work_finished(&self) {
        self.idle.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn work_panicked(&self) {
        self.panicked.fetch_add(1, Ordering::AcqRel);
    }
}

/// Tracks probe loops that have started but not yet exited.
///
/// Each started loop holds a ticket for its lifetime.
/// [`CompletionTracker::wait`] blocks until no ticket is outstanding. Any
/// number of threads may wait at once; each returns only once the count of
/// outstanding tickets has dropped to zero.
#[derive(Clone, Debug, Default)]
pub struct CompletionTracker {
    inner: Arc<Pending>,
}

#[derive(Debug, Default)]
struct Pending {
    count: Mutex<usize>,
    drained: Condvar,
}

/// Registration of one running loop. Dropping it marks the loop done.
#[derive(Debug)]
pub(crate) struct Ticket {
    pending: Arc<Pending>,
}

impl CompletionTracker {
    /// Creates a tracker with no outstanding loops.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one pending loop.
    pub(crate) fn register(&self) -> Ticket {
        *self.inner.count.lock() += 1;
        Ticket {
            pending: self.inner.clone(),
        }
    }

    /// Number of registered loops that have not exited yet.
    pub fn pending(&self) -> usize {
        *self.inner.count.lock()
    }

    /// Blocks until every registered loop has exited.
    ///
    /// Loops registered while waiting are waited for as well.
    pub fn wait(&self) {
        let mut count = self.inner.count.lock();
        while *count > 0 {
            self.inner.drained.wait(&mut count);
        }
    }
}

impl Drop for Ticket {
    fn drop(&mut self) {
        let mut count = self.pending.count.lock();
        *count -= 1;
        if *count == 0 {
            self.pending.drained.notify_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn counters_bracket_work() {
        let counters = Counters::new();
        counters.loop_started();
        counters.loop_started();
        assert_eq!((counters.running(), counters.idle()), (2, 2));

        counters.work_started();
        assert_eq!((counters.running(), counters.idle()), (2, 1));
        counters.work_finished();
        counters.loop_exited();
        assert_eq!((counters.running(), counters.idle()), (1, 1));
        assert_eq!(counters.panicked(), 0);
    }

    #[test]
    fn tracker_waits_for_registered_tickets() {
        let tracker = CompletionTracker::new();
        let tickets: Vec<_> = (0..4).map(|_| tracker.register()).collect();
        let released = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = tickets
            .into_iter()
            .map(|ticket| {
                let released = released.clone();
                thread::spawn(move || {
                    thread::sleep(Duration::from_millis(10));
                    released.fetch_add(1, Ordering::AcqRel);
                    drop(ticket);
                })
            })
            .collect();

        tracker.wait();
        assert_eq!(released.load(Ordering::Acquire), 4);
        assert_eq!(tracker.pending(), 0);
        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn concurrent_waiters_all_block_until_drained() {
        let tracker = CompletionTracker::new();
        let ticket = tracker.register();
        let released = Arc::new(AtomicUsize::new(0));

        let waiters: Vec<_> = (0..2)
            .map(|_| {
                let tracker = tracker.clone();
                let released = released.clone();
                thread::spawn(move || {
                    tracker.wait();
                    released.load(Ordering::Acquire)
                })
            })
            .collect();

        thread::sleep(Duration::from_millis(50));
        assert!(waiters.iter().all(|w| !w.is_finished()));
        released.store(1, Ordering::Release);
        drop(ticket);

        for waiter in waiters {
            assert_eq!(waiter.join().unwrap(), 1);
        }
    }

    #[test]
    fn wait_without_tickets_returns() {
        let tracker = CompletionTracker::new();
        let ticket = tracker.register();
        drop(ticket);
        tracker.wait();
        tracker.wait();
        assert_eq!(tracker.pending(), 0);
    }
}
