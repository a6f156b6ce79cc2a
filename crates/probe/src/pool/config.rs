use crate::{
    CancelScope, CompletionTracker, Counters, Error, ProbeConfig, RandSource, Result, ThreadRandom,
};
#[cfg(feature = "tracing")]
use crate::log::Dispatch;
use core::fmt;
use std::sync::Arc;

/// Number of probes in a pool when no size is configured.
pub const DEFAULT_POOL_SIZE: usize = 8;

/// Capacity of the shared work queue when none is configured.
pub const DEFAULT_BUFFER_SIZE: usize = 64;

/// Configuration for a new [`Pool`](crate::Pool).
///
/// Unset fields fall back to:
///
/// | Field         | Default                                  |
/// |---------------|------------------------------------------|
/// | `size`        | [`DEFAULT_POOL_SIZE`]                    |
/// | `buffer_size` | [`DEFAULT_BUFFER_SIZE`]                  |
/// | `cancel`      | a root scope that is never cancelled     |
/// | `counters`    | fresh zeroed [`Counters`]                |
/// | `tracker`     | fresh [`CompletionTracker`]              |
/// | `rand`        | [`ThreadRandom`]                         |
/// | `sink`        | a dispatcher that discards everything    |
///
/// An explicit `buffer_size` of `0` is honored and makes submission a
/// rendezvous with an idle probe.
#[derive(Clone, Default)]
pub struct PoolConfig {
    size: Option<usize>,
    buffer_size: Option<usize>,
    cancel: Option<CancelScope>,
    counters: Option<Arc<Counters>>,
    tracker: Option<CompletionTracker>,
    rand: Option<Arc<dyn RandSource>>,
    #[cfg(feature = "tracing")]
    sink: Option<Dispatch>,
}

impl PoolConfig {
    /// An empty configuration; every field falls back to its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of probes. Must be greater than zero.
    pub fn size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    /// Capacity of the shared work queue.
    pub fn buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = Some(buffer_size);
        self
    }

    /// Parent scope. Cancelling it stops the pool's probes.
    pub fn cancel(mut self, scope: CancelScope) -> Self {
        self.cancel = Some(scope);
        self
    }

    /// Counters to aggregate into, e.g. to share them between pools.
    pub fn counters(mut self, counters: Arc<Counters>) -> Self {
        self.counters = Some(counters);
        self
    }

    /// Completion tracker `stop(true)` waits on. A tracker shared between
    /// pools makes each pool's `stop(true)` wait for all of them.
    pub fn tracker(mut self, tracker: CompletionTracker) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// Random source for probe identities.
    pub fn rand(mut self, rand: Arc<dyn RandSource>) -> Self {
        self.rand = Some(rand);
        self
    }

    /// Logging sink for the pool and its probe threads.
    #[cfg(feature = "tracing")]
    pub fn sink(mut self, sink: Dispatch) -> Self {
        self.sink = Some(sink);
        self
    }

    pub(crate) fn resolve_size(&self) -> Result<usize> {
        match self.size {
            None => Ok(DEFAULT_POOL_SIZE),
            Some(0) => Err(Error::InvalidConfig {
                reason: "pool size must be greater than 0".into(),
            }),
            Some(size) => Ok(size),
        }
    }

    pub(crate) fn resolve_buffer_size(&self) -> usize {
        self.buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE)
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

    #[cfg(feature = "tracing")]
    pub(crate) fn resolve_sink(&self) -> Dispatch {
        crate::log::resolve(self.sink.as_ref())
    }

    /// Probe configuration carrying the pool-wide random source and sink.
    /// Queue, scope, counters, and tracker are bound by the pool itself.
    pub(crate) fn probe_config(&self) -> ProbeConfig {
        let config = ProbeConfig::new().rand(
            self.rand
                .clone()
                .unwrap_or_else(|| Arc::new(ThreadRandom)),
        );
        #[cfg(feature = "tracing")]
        let config = config.sink(self.resolve_sink());
        config
    }
}

impl fmt::Debug for PoolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolConfig")
            .field("size", &self.size)
            .field("buffer_size", &self.buffer_size)
            .field("cancel", &self.cancel)
            .field("counters", &self.counters)
            .finish_non_exhaustive()
    }
}
