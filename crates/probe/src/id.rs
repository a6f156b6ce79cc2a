use crate::{RandSource, Result};
use core::fmt;

/// Number of random bytes read per identity.
const ID_BYTES: usize = 6;

/// Number of hex characters kept from the encoded bytes.
const ID_LEN: usize = 6;

/// Short, opaque identity of a [`Probe`](crate::Probe).
///
/// Assigned once when the probe is constructed and never changed, including
/// across stop/start cycles.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProbeId(String);

impl ProbeId {
    /// Draws a new identity from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RandSource`](crate::Error::RandSource) if the source
    /// cannot be read. There is no retry: a broken random source is not a
    /// transient condition.
    pub fn generate(source: &dyn RandSource) -> Result<Self> {
        let mut buf = [0_u8; ID_BYTES];
        if let Err(e) = source.fill(&mut buf) {
            #[cfg(feature = "tracing")]
            tracing::error!(error = %e, "failed to generate probe id");
            return Err(e);
        }
        let mut encoded = hex::encode(buf);
        encoded.truncate(ID_LEN);
        Ok(Self(encoded))
    }

    /// The identity as a six character hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProbeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, ThreadRandom};

    struct Zeroes;

    impl RandSource for Zeroes {
        fn fill(&self, buf: &mut [u8]) -> Result<()> {
            buf.fill(0);
            Ok(())
        }
    }

    struct Broken;

    impl RandSource for Broken {
        fn fill(&self, _buf: &mut [u8]) -> Result<()> {
            Err(Error::RandSource {
                reason: "entropy unavailable".into(),
            })
        }
    }

    #[test]
    fn zero_source_yields_fixed_id() {
        let id = ProbeId::generate(&Zeroes).unwrap();
        assert_eq!(id.as_str(), "000000");
        assert_eq!(id.to_string(), "000000");
    }

    #[test]
    fn broken_source_is_fatal() {
        let err = ProbeId::generate(&Broken).unwrap_err();
        assert!(matches!(err, Error::RandSource { .. }));
    }

    #[test]
    fn ids_are_short_hex() {
        let id = ProbeId::generate(&ThreadRandom).unwrap();
        assert_eq!(id.as_str().len(), ID_LEN);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }
}
