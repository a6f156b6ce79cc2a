//! Log output for the stress driver.
//!
//! Installs a `fmt` subscriber filtered by `RUST_LOG` (default `info`) as the
//! global default and hands back the same dispatcher, so the pool and its
//! probe threads log to it as well.

use probe::Dispatch;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, registry};

pub fn init_telemetry() -> anyhow::Result<Dispatch> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = registry()
        .with(filter)
        .with(fmt::layer().with_thread_names(true));

    let dispatch = Dispatch::new(subscriber);
    tracing::dispatcher::set_global_default(dispatch.clone())?;
    Ok(dispatch)
}
