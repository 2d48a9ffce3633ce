//! Secure randomness
//!
//! Every random byte used by the wallet comes through [`EntropySource`].
//! There is no fallback to a non-cryptographic generator: if the OS source
//! fails, callers get [`EntropyError::Unavailable`].

use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;
use zeroize::Zeroizing;

#[derive(Error, Debug)]
pub enum EntropyError {
    #[error("Secure entropy unavailable: {0}")]
    Unavailable(String),
}

/// A cryptographically secure source of random bytes.
pub trait EntropySource: Send {
    /// Fill `dest` entirely or fail.
    fn try_fill(&mut self, dest: &mut [u8]) -> Result<(), EntropyError>;

    /// Draw `n` random bytes.
    fn random_bytes(&mut self, n: usize) -> Result<Zeroizing<Vec<u8>>, EntropyError> {
        let mut buf = Zeroizing::new(vec![0u8; n]);
        self.try_fill(&mut buf)?;
        Ok(buf)
    }
}

/// Operating system CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn try_fill(&mut self, dest: &mut [u8]) -> Result<(), EntropyError> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| EntropyError::Unavailable(e.to_string()))
    }
}
