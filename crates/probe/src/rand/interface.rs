use crate::Result;

/// A source of random bytes used to derive probe identities.
///
/// This abstraction lets callers plug in the operating system's entropy, the
/// thread-local RNG, or a fixed source in tests. Sources may fail; a failure
/// is treated as fatal for whatever identity was being generated.
///
/// # Example
/// ```
/// use probe::{ProbeId, RandSource};
///
/// struct Zeroes;
/// impl RandSource for Zeroes {
///     fn fill(&self, buf: &mut [u8]) -> probe::Result<()> {
///         buf.fill(0);
///         Ok(())
///     }
/// }
///
/// assert_eq!(ProbeId::generate(&Zeroes).unwrap().as_str(), "000000");
/// ```
pub trait RandSource: Send + Sync {
    /// Fills `buf` entirely with random bytes.
    fn fill(&self, buf: &mut [u8]) -> Result<()>;
}
