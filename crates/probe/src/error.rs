//! Error types for probe and pool construction.
//!
//! Only construction and (re)starting can fail. Calling `start` or `stop` in a
//! state where they have nothing to do is not an error, and failures inside a
//! submitted unit of work are never surfaced here.
//!
//! ## Error Cases
//! - `RandSource`: the random source backing probe identities could not be
//!   read. This is treated as fatal for the probe being constructed.
//! - `InvalidConfig`: a configuration value was rejected before anything was
//!   allocated.
//! - `Spawn`: the operating system refused to spawn a probe thread.

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Unified error type for the `probe` crate.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The random source used for probe identities failed.
    #[error("Random source error: {reason}")]
    RandSource { reason: String },

    /// A configuration value is out of range.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Spawning the thread that runs a probe loop failed.
    #[error("Failed to spawn probe thread: {0}")]
    Spawn(#[from] std::io::Error),
}
