//! Logging sink resolution.
//!
//! Probes and pools log through [`tracing`]. A configuration may carry its own
//! [`Dispatch`]; every probe thread then runs under that dispatcher instead of
//! the process-wide default. When no sink is configured the crate falls back
//! to [`noop_dispatch`], which discards everything.

pub use tracing::Dispatch;
use tracing::subscriber::NoSubscriber;

/// Returns a dispatcher that drops every span and event.
pub fn noop_dispatch() -> Dispatch {
    Dispatch::new(NoSubscriber::default())
}

/// Resolves an optional sink, falling back to [`noop_dispatch`].
pub(crate) fn resolve(sink: Option<&Dispatch>) -> Dispatch {
    sink.cloned().unwrap_or_else(noop_dispatch)
}
