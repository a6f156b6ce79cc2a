use crate::{RandSource, Result};
use rand::{RngCore, rng};

/// A `RandSource` that uses the thread-local RNG (`rand::rng()`).
///
/// This RNG is fast, cryptographically secure (ChaCha-based), and
/// automatically reseeded periodically. It never reports a failure.
///
/// This type does **not** store the RNG itself; it accesses the calling
/// thread's generator on each call, so it may be shared freely across
/// threads.
#[derive(Default, Clone, Copy, Debug)]
pub struct ThreadRandom;

impl RandSource for ThreadRandom {
    fn fill(&self, buf: &mut [u8]) -> Result<()> {
        rng().fill_bytes(buf);
        Ok(())
    }
}
