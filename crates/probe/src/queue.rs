use crossbeam_channel::{Receiver, Sender};

/// A unit of work: an opaque, argument-less closure run at most once.
pub type Runner = Box<dyn FnOnce() + Send + 'static>;

/// Bounded multi-producer, multi-consumer queue of [`Runner`]s.
///
/// Every probe bound to the same queue competes for its units; each unit is
/// delivered to exactly one of them. A capacity of `0` makes the queue a
/// rendezvous point: [`WorkQueue::submit`] returns only once a probe has
/// taken the unit.
#[derive(Clone, Debug)]
pub struct WorkQueue {
    tx: Sender<Runner>,
    rx: Receiver<Runner>,
}

impl WorkQueue {
    /// Creates a queue holding at most `capacity` pending units.
    pub fn bounded(capacity: usize) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        Self { tx, rx }
    }

    /// Enqueues a unit of work, blocking while the queue is full.
    pub fn submit<F>(&self, unit: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit_boxed(Box::new(unit));
    }

    /// Enqueues an already boxed unit of work, blocking while the queue is full.
    pub fn submit_boxed(&self, runner: Runner) {
        // `self.rx` keeps the channel connected, so `send` cannot fail.
        let _ = self.tx.send(runner);
    }

    /// Number of units waiting to be picked up.
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    /// `true` if no unit is waiting.
    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    /// Maximum number of pending units.
    pub fn capacity(&self) -> usize {
        self.tx.capacity().unwrap_or(usize::MAX)
    }

    pub(crate) fn receiver(&self) -> &Receiver<Runner> {
        &self.rx
    }
}
