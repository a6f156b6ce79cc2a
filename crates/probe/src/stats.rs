/// Point-in-time snapshot of a [`Pool`](crate::Pool).
///
/// Fields are read independently, so a snapshot taken while probes are
/// changing state may not be internally consistent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolStats {
    /// Number of probes in the pool.
    pub size: usize,
    /// Whether the pool is started.
    pub started: bool,
    /// Probes with an active loop.
    pub running: usize,
    /// Active probes waiting for work.
    pub idle: usize,
    /// Active probes executing a unit of work.
    pub busy: usize,
    /// Units of work that panicked since the counters were created.
    pub panicked: usize,
    /// Units waiting in the queue.
    pub queued: usize,
}
