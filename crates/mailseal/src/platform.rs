//! Entropy source and platform capability probe.

use mailseal_crypto::CryptoError;

/// Source of nonce randomness. The service probes it once at construction;
/// a failing probe marks the platform as unsupported.
pub trait RandomSource: Send + Sync {
    fn fill(&self, buf: &mut [u8]) -> Result<(), CryptoError>;
}

/// OS / browser CSPRNG via `getrandom`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill(&self, buf: &mut [u8]) -> Result<(), CryptoError> {
        getrandom::getrandom(buf).map_err(|e| CryptoError::RngFailed(e.to_string()))
    }
}

/// True if `source` can currently produce random bytes.
pub fn probe(source: &dyn RandomSource) -> bool {
    let mut buf = [0u8; 1];
    source.fill(&mut buf).is_ok()
}
