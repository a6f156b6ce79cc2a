//! A single restartable worker.
//!
//! A [`Probe`] runs one receive-execute loop on its own OS thread. The loop
//! waits for either cancellation of its scope or a unit of work from its
//! queue, runs units one at a time, and keeps its own flags and the shared
//! [`Counters`] in step with what it is doing.
//!
//! Stopping a probe ends the current loop but keeps the probe value, its
//! identity, and its bindings; [`Probe::start`] launches a fresh loop with a
//! fresh scope and exit signal.

mod config;

pub use config::*;

use crate::sync::Ticket;
use crate::{CancelScope, CompletionTracker, Counters, ProbeId, Result, Runner, WorkQueue};
#[cfg(feature = "tracing")]
use crate::log::Dispatch;
use crossbeam_channel::{Receiver, Sender, select};
use parking_lot::{Mutex, MutexGuard};
use portable_atomic::{AtomicBool, Ordering};
#[cfg(feature = "tracing")]
use std::any::Any;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

/// A worker that executes units of work from a shared [`WorkQueue`].
///
/// The loop is started on construction. `running` reports whether a loop is
/// active; `idle` reports whether it is active and waiting for work. A
/// stopped probe is never idle.
///
/// Dropping a probe cancels its current loop without waiting for it.
pub struct Probe {
    id: ProbeId,
    flags: Arc<Flags>,
    queue: WorkQueue,
    counters: Arc<Counters>,
    tracker: CompletionTracker,
    lifecycle: Mutex<Lifecycle>,
    #[cfg(feature = "tracing")]
    sink: Dispatch,
}

#[derive(Default)]
struct Flags {
    running: AtomicBool,
    idle: AtomicBool,
}

struct Lifecycle {
    parent: CancelScope,
    /// Most recent run. Kept after the loop exits.
    run: Option<Run>,
}

struct Run {
    scope: CancelScope,
    exited: Receiver<()>,
}

impl Probe {
    /// Creates a probe and starts its loop.
    ///
    /// # Errors
    ///
    /// - [`Error::RandSource`](crate::Error::RandSource) if no identity could
    ///   be drawn. No probe is returned.
    /// - [`Error::Spawn`](crate::Error::Spawn) if the loop thread could not
    ///   be spawned.
    pub fn new(config: ProbeConfig) -> Result<Self> {
        let rand = config.resolve_rand();
        #[cfg(feature = "tracing")]
        let sink = config.resolve_sink();
        #[cfg(feature = "tracing")]
        let id = tracing::dispatcher::with_default(&sink, || ProbeId::generate(rand.as_ref()))?;
        #[cfg(not(feature = "tracing"))]
        let id = ProbeId::generate(rand.as_ref())?;

        let probe = Self {
            id,
            flags: Arc::new(Flags::default()),
            queue: config.resolve_queue(),
            counters: config.resolve_counters(),
            tracker: config.resolve_tracker(),
            lifecycle: Mutex::new(Lifecycle {
                parent: config.resolve_cancel(),
                run: None,
            }),
            #[cfg(feature = "tracing")]
            sink,
        };
        probe.start()?;
        Ok(probe)
    }

    /// Identity drawn at construction. Stable across restarts.
    pub fn id(&self) -> &ProbeId {
        &self.id
    }

    /// `true` while the loop is active.
    pub fn running(&self) -> bool {
        self.flags.running.load(Ordering::Acquire)
    }

    /// `true` while the loop is active and not executing a unit of work.
    pub fn idle(&self) -> bool {
        self.flags.idle.load(Ordering::Acquire)
    }

    /// The queue this probe pulls from. Units submitted here may be picked up
    /// by any probe bound to the same queue.
    pub fn queue(&self) -> &WorkQueue {
        &self.queue
    }

    /// Starts the loop. Does nothing if it is already running.
    ///
    /// If a stop was requested but the previous loop has not exited yet (it
    /// may be finishing a unit of work), this blocks until it has, then starts
    /// a new loop.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spawn`](crate::Error::Spawn) if the loop thread could
    /// not be spawned; the probe is left stopped.
    pub fn start(&self) -> Result<()> {
        let lifecycle = self.lifecycle.lock();
        self.launch(lifecycle)
    }

    /// Rebinds the parent scope, then starts the loop.
    pub(crate) fn start_under(&self, parent: CancelScope) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock();
        lifecycle.parent = parent;
        self.launch(lifecycle)
    }

    fn launch(&self, mut lifecycle: MutexGuard<'_, Lifecycle>) -> Result<()> {
        while self.running() {
            let exited = match &lifecycle.run {
                Some(run) if run.scope.is_cancelled() => run.exited.clone(),
                _ => return Ok(()),
            };
            MutexGuard::unlocked(&mut lifecycle, || {
                let _ = exited.recv();
            });
        }

        let scope = lifecycle.parent.child();
        let (exit, exited) = crossbeam_channel::bounded(0);
        self.flags.running.store(true, Ordering::Release);
        self.flags.idle.store(true, Ordering::Release);
        self.counters.loop_started();

        let worker = Worker {
            id: self.id.clone(),
            flags: self.flags.clone(),
            queue: self.queue.clone(),
            counters: self.counters.clone(),
            scope: scope.clone(),
            _ticket: self.tracker.register(),
            _exit: exit,
        };
        #[cfg(feature = "tracing")]
        let sink = self.sink.clone();

        // On failure the closure is dropped, and with it the worker, which
        // undoes the bookkeeping above.
        thread::Builder::new()
            .name(format!("probe-{}", self.id))
            .spawn(move || {
                #[cfg(feature = "tracing")]
                tracing::dispatcher::with_default(&sink, || worker.run());
                #[cfg(not(feature = "tracing"))]
                worker.run();
            })?;

        lifecycle.run = Some(Run { scope, exited });
        Ok(())
    }

    /// Stops the loop. Does nothing if it is not running.
    ///
    /// With `wait` set, blocks until the loop has exited, which includes
    /// finishing any unit of work it is executing. Otherwise returns
    /// immediately and the loop exits on its own.
    pub fn stop(&self, wait: bool) {
        let exited = {
            let lifecycle = self.lifecycle.lock();
            if !self.running() {
                return;
            }
            let Some(run) = &lifecycle.run else {
                return;
            };
            run.scope.cancel();
            run.exited.clone()
        };
        if wait {
            let _ = exited.recv();
        }
    }

    #[cfg(test)]
    fn exit_signal(&self) -> Option<Receiver<()>> {
        self.lifecycle.lock().run.as_ref().map(|run| run.exited.clone())
    }
}

impl Drop for Probe {
    fn drop(&mut self) {
        if let Some(run) = &self.lifecycle.get_mut().run {
            run.scope.cancel();
        }
    }
}

impl core::fmt::Debug for Probe {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Probe")
            .field("id", &self.id)
            .field("running", &self.running())
            .field("idle", &self.idle())
            .finish_non_exhaustive()
    }
}

/// State moved onto the loop thread for one run.
///
/// Dropping it is the only way a run ends, so the exit bookkeeping lives in
/// [`Drop`] and also covers a failed spawn.
struct Worker {
    id: ProbeId,
    flags: Arc<Flags>,
    queue: WorkQueue,
    counters: Arc<Counters>,
    scope: CancelScope,
    _ticket: Ticket,
    /// Dropped last; disconnecting it is the exit signal.
    _exit: Sender<()>,
}

impl Worker {
    fn run(self) {
        #[cfg(feature = "tracing")]
        tracing::debug!(probe = %self.id, "starting event loop");

        loop {
            select! {
                recv(self.scope.cancelled()) -> _ => break,
                recv(self.queue.receiver()) -> msg => match msg {
                    Ok(runner) => self.execute(runner),
                    Err(_) => break,
                },
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(probe = %self.id, "shutting down");
    }

    fn execute(&self, runner: Runner) {
        self.flags.idle.store(false, Ordering::Release);
        self.counters.work_started();

        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(runner)) {
            self.counters.work_panicked();
            #[cfg(feature = "tracing")]
            tracing::error!(
                probe = %self.id,
                panic = panic_message(payload.as_ref()),
                "unit of work panicked"
            );
            // The payload's destructor is user code too and may panic again.
            if let Err(nested) = panic::catch_unwind(AssertUnwindSafe(move || drop(payload))) {
                mem::forget(nested);
            }
        }

        self.counters.work_finished();
        self.flags.idle.store(true, Ordering::Release);
    }
}

impl Drop for Worker {
    // A stopped probe is never idle: the flag and the idle counter both drop
    // with the loop so `idle` implies `running`.
    fn drop(&mut self) {
        self.flags.idle.store(false, Ordering::Release);
        // Counters first: a restart that observes `running == false` must not
        // double count this run.
        self.counters.loop_exited();
        self.flags.running.store(false, Ordering::Release);
    }
}

#[cfg(feature = "tracing")]
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "non-string panic payload"
    }
}
