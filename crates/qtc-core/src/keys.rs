//! Key derivation
//!
//! Derives a deterministic key pair from a seed phrase (or raw secret
//! bytes) with a fixed SHA-256 chain. The "public key" here is a hash of
//! the private key, not the public half of an asymmetric scheme: only the
//! interface (seed → deterministic key pair) is meant to survive a switch
//! to a real post-quantum primitive.

use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::address::Address;
use crate::entropy::{EntropyError, EntropySource};
use crate::seed::{self, SeedPhrase};

/// Domain salt widening the seed hash into the second half of the private key
pub const DERIVE_SALT: &str = "quantum_derive";

/// Domain salt for private → public key hashing
pub const PUBLIC_KEY_SALT: &str = "quantum_salt";

/// Secret lengths accepted by [`KeyPair::from_secret_bytes`]
pub const SECRET_LENGTHS: [usize; 2] = [32, 64];

#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid seed phrase: {0}")]
    InvalidSeedPhrase(String),
    #[error("Invalid secret length: {0} bytes (expected 32 or 64)")]
    InvalidSecretLength(usize),
    #[error(transparent)]
    Entropy(#[from] EntropyError),
}

/// Lowercase hex SHA-256 of the concatenated parts.
pub(crate) fn sha256_hex(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hex::encode(hasher.finalize())
}

/// Private key material, hex encoded. Zeroized on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(Zeroizing<String>);

impl PrivateKey {
    /// Wrap hex text loaded from storage.
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(Zeroizing::new(hex.into()))
    }

    pub fn as_hex(&self) -> &str {
        &self.0
    }

    /// The public key this private key hashes to.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(sha256_hex(&[
            self.0.as_bytes(),
            PUBLIC_KEY_SALT.as_bytes(),
        ]))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey([REDACTED])")
    }
}

/// Public key, lowercase hex of a 32-byte digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublicKey(String);

impl PublicKey {
    /// Wrap hex text loaded from storage.
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_hex(&self) -> &str {
        &self.0
    }

    /// Receiving address for this key.
    pub fn address(&self) -> Address {
        Address::from_public_key(self)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A deterministic (private, public) key pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    private_key: PrivateKey,
    public_key: PublicKey,
}

impl KeyPair {
    /// Derive from a validated seed phrase.
    ///
    /// `private = sha256(phrase) ‖ sha256(sha256(phrase) ‖ DERIVE_SALT)`,
    /// 64 bytes of hex.
    pub fn from_seed_phrase(phrase: &SeedPhrase) -> Self {
        let canonical = phrase.to_phrase();
        let seed_hash = Zeroizing::new(sha256_hex(&[canonical.as_bytes()]));
        let widened = Zeroizing::new(sha256_hex(&[
            seed_hash.as_bytes(),
            DERIVE_SALT.as_bytes(),
        ]));

        let mut private = Zeroizing::new(String::with_capacity(128));
        private.push_str(&seed_hash);
        private.push_str(&widened);

        Self::from_private_key(PrivateKey(private))
    }

    /// Derive from seed phrase text, validating it first.
    pub fn from_phrase_str(phrase: &str) -> Result<Self, KeyError> {
        let phrase = seed::parse_seed_phrase(phrase)
            .map_err(|e| KeyError::InvalidSeedPhrase(e.to_string()))?;
        Ok(Self::from_seed_phrase(&phrase))
    }

    /// Build from 32 or 64 bytes of secret material.
    pub fn from_secret_bytes(secret: &[u8]) -> Result<Self, KeyError> {
        if !SECRET_LENGTHS.contains(&secret.len()) {
            return Err(KeyError::InvalidSecretLength(secret.len()));
        }
        let private = PrivateKey(Zeroizing::new(hex::encode(secret)));
        Ok(Self::from_private_key(private))
    }

    /// A random key pair not tied to any seed phrase.
    pub fn generate<E: EntropySource + ?Sized>(source: &mut E) -> Result<Self, KeyError> {
        let secret = source.random_bytes(64)?;
        Self::from_secret_bytes(&secret)
    }

    pub fn from_private_key(private_key: PrivateKey) -> Self {
        let public_key = private_key.public_key();
        Self {
            private_key,
            public_key,
        }
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn address(&self) -> Address {
        self.public_key.address()
    }
}
