use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use portable_atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use core::fmt;

/// A hierarchical, cooperative cancellation signal.
///
/// Cancelling a scope cancels every scope derived from it with
/// [`CancelScope::child`], transitively. Cancelling a child never affects its
/// parent. Clones share the same underlying state.
///
/// Blocking code observes cancellation through [`CancelScope::cancelled`],
/// which returns a channel receiver that disconnects once the scope is
/// cancelled. That makes a scope usable as one arm of a
/// [`crossbeam_channel::select!`].
///
/// # Example
/// ```
/// use probe::CancelScope;
///
/// let root = CancelScope::new();
/// let child = root.child();
///
/// root.cancel();
/// assert!(child.is_cancelled());
/// assert!(child.cancelled().recv().is_err());
/// ```
#[derive(Clone)]
pub struct CancelScope {
    inner: Arc<Inner>,
}

struct Inner {
    cancelled: AtomicBool,
    /// Dropped on cancellation, which disconnects `signal`.
    trigger: Mutex<Option<Sender<()>>>,
    signal: Receiver<()>,
    children: Mutex<Vec<Weak<Inner>>>,
}

impl CancelScope {
    /// Creates a new root scope that is only cancelled explicitly.
    pub fn new() -> Self {
        let (trigger, signal) = crossbeam_channel::bounded(0);
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                trigger: Mutex::new(Some(trigger)),
                signal,
                children: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Derives a child scope. A child of an already cancelled scope is
    /// returned cancelled.
    pub fn child(&self) -> Self {
        let child = Self::new();
        let mut children = self.inner.children.lock();
        // Checked under the children lock: `cancel` flips the flag before it
        // drains the list, so a child is either drained or sees the flag.
        if self.is_cancelled() {
            drop(children);
            child.cancel();
            return child;
        }
        children.retain(|c| c.strong_count() > 0);
        children.push(Arc::downgrade(&child.inner));
        child
    }

    /// Cancels this scope and all of its descendants. Idempotent.
    pub fn cancel(&self) {
        Self::cancel_inner(&self.inner);
    }

    fn cancel_inner(inner: &Inner) {
        if inner.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        inner.trigger.lock().take();
        let children = core::mem::take(&mut *inner.children.lock());
        for child in children.iter().filter_map(Weak::upgrade) {
            Self::cancel_inner(&child);
        }
    }

    /// Returns `true` once this scope (or any ancestor) has been cancelled.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Returns a receiver that disconnects when this scope is cancelled. It
    /// never yields a value.
    #[inline]
    pub fn cancelled(&self) -> &Receiver<()> {
        &self.inner.signal
    }
}

impl Default for CancelScope {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CancelScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelScope")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
