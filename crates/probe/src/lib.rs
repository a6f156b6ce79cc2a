//! # probe
//!
//! A bounded pool of worker threads ("probes") that pull units of work from one
//! shared queue.
//!
//! - [`Probe`]: a single restartable receive-execute loop on its own thread.
//! - [`Pool`]: a fixed set of probes sharing a [`WorkQueue`], aggregate
//!   [`Counters`], and a [`CompletionTracker`], with pool-wide start/stop.
//! - [`CancelScope`]: hierarchical cancellation. Stopping a pool cancels its
//!   scope, which cancels every probe's own scope.
//!
//! Units of work are opaque closures run at most once. The pool never
//! inspects, retries, or reports their results; a panicking unit is caught,
//! counted in [`Counters::panicked`], and the probe carries on.
//!
//! ## Features
//!
//! - `tracing` (default): lifecycle events through [`tracing`], routed to a
//!   per-pool [`Dispatch`] sink when one is configured.
//! - `serde`: `Serialize`/`Deserialize` for [`PoolStats`].
//!
//! ## Example
//!
//! ```
//! use probe::{Pool, PoolConfig};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let pool = Pool::new(PoolConfig::new().size(4).buffer_size(16)).unwrap();
//! let hits = Arc::new(AtomicUsize::new(0));
//! for _ in 0..100 {
//!     let hits = hits.clone();
//!     pool.submit(move || {
//!         hits.fetch_add(1, Ordering::Relaxed);
//!     });
//! }
//!
//! pool.stop(true);
//! assert_eq!(pool.running_count(), 0);
//! ```

mod cancel;
mod error;
mod id;
#[cfg(feature = "tracing")]
mod log;
mod pool;
mod probe;
mod queue;
mod rand;
mod stats;
mod sync;

pub use crate::cancel::*;
pub use crate::error::*;
pub use crate::id::*;
#[cfg(feature = "tracing")]
pub use crate::log::{Dispatch, noop_dispatch};
pub use crate::pool::*;
pub use crate::probe::*;
pub use crate::queue::*;
pub use crate::rand::*;
pub use crate::stats::*;
pub use crate::sync::*;
