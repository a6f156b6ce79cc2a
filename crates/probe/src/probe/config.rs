use crate::{CancelScope, CompletionTracker, Counters, RandSource, ThreadRandom, WorkQueue};
#[cfg(feature = "tracing")]
use crate::log::Dispatch;
use core::fmt;
use std::sync::Arc;

/// Configuration for a standalone [`Probe`](crate::Probe).
///
/// Every field is optional. Unset fields fall back to fresh, unshared
/// defaults: a rendezvous work queue, a never-cancelled root scope, zeroed
/// counters, a new completion tracker, [`ThreadRandom`] for the identity, and
/// a logging sink that discards everything.
///
/// Sharing a queue, counters, or tracker between several probes is how a
/// [`Pool`](crate::Pool) is built; the same wiring is available here for
/// custom compositions.
#[derive(Clone, Default)]
pub struct ProbeConfig {
    queue: Option<WorkQueue>,
    cancel: Option<CancelScope>,
    counters: Option<Arc<Counters>>,
    tracker: Option<CompletionTracker>,
    rand: Option<Arc<dyn RandSource>>,
    #[cfg(feature = "tracing")]
    sink: Option<Dispatch>,
}

impl ProbeConfig {
    /// An empty configuration; every field falls back to its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the probe pulls work from.
    pub fn queue(mut self, queue: WorkQueue) -> Self {
        self.queue = Some(queue);
        self
    }

    /// Parent scope every run of the probe derives its own scope from.
    pub fn cancel(mut self, scope: CancelScope) -> Self {
        self.cancel = Some(scope);
        self
    }

    /// Counters adjusted as the probe starts, works, and exits.
    pub fn counters(mut self, counters: Arc<Counters>) -> Self {
        self.counters = Some(counters);
        self
    }

    /// Tracker each run registers with until its loop exits.
    pub fn tracker(mut self, tracker: CompletionTracker) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// Random source used to draw the probe identity.
    pub fn rand(mut self, rand: Arc<dyn RandSource>) -> Self {
        self.rand = Some(rand);
        self
    }

    /// Logging sink the probe thread runs under.
    #[cfg(feature = "tracing")]
    pub fn sink(mut self, sink: Dispatch) -> Self {
        self.sink = Some(sink);
        self
    }

    pub(crate) fn resolve_queue(&self) -> WorkQueue {
        self.queue.clone().unwrap_or_else(|| WorkQueue::bounded(0))
    }

    pub(crate) fn resolve_cancel(&self) -> CancelScope {
        self.cancel.clone().unwrap_or_default()
    }

    pub(crate) fn resolve_counters(&self) -> Arc<Counters> {
        self.counters.clone().unwrap_or_else(Counters::new)
    }

    pub(crate) fn resolve_tracker(&self) -> CompletionTracker {
        self.tracker.clone().unwrap_or_default()
    }

    pub(crate) fn resolve_rand(&self) -> Arc<dyn RandSource> {
        self.rand.clone().unwrap_or_else(|| Arc::new(ThreadRandom))
    }

    #[cfg(feature = "tracing")]
    pub(crate) fn resolve_sink(&self) -> Dispatch {
        crate::log::resolve(self.sink.as_ref())
    }
}

impl fmt::Debug for ProbeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeConfig")
            .field("queue", &self.queue)
            .field("cancel", &self.cancel)
            .field("counters", &self.counters)
            .field("tracker", &self.tracker.is_some())
            .field("rand", &self.rand.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_fresh() {
        let config = ProbeConfig::new();
        let queue = config.resolve_queue();
        assert_eq!(queue.capacity(), 0);
        assert!(!config.resolve_cancel().is_cancelled());

        let a = config.resolve_counters();
        let b = config.resolve_counters();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.running(), 0);
    }

    #[test]
    fn configured_values_are_shared() {
        let counters = Counters::new();
        let scope = CancelScope::new();
        let config = ProbeConfig::new()
            .counters(counters.clone())
            .cancel(scope.clone())
            .queue(WorkQueue::bounded(3));

        assert!(Arc::ptr_eq(&config.resolve_counters(), &counters));
        assert_eq!(config.resolve_queue().capacity(), 3);
        scope.cancel();
        assert!(config.resolve_cancel().is_cancelled());
    }
}
