//! Cryptographic utilities
//!
//! Passphrase-based sealing of stored secrets using Argon2id + AES-256-GCM.
//!
//! # Security Notes
//!
//! - Argon2id is memory-hard (resistant to GPU/ASIC attacks)
//! - AES-256-GCM provides authenticated encryption
//! - Each seal uses a fresh random nonce
//! - Associated data binds a sealed value to the slot it was written to
//! - The passphrase is never stored

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Key, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::entropy::{EntropySource, OsEntropy};

/// Argon2id parameters (OWASP recommendations for 2024+)
/// - m_cost: 64 MiB memory
/// - t_cost: 3 iterations
/// - p_cost: 4 parallel threads
const ARGON2_M_COST: u32 = 65536; // 64 MiB
const ARGON2_T_COST: u32 = 3;
const ARGON2_P_COST: u32 = 4;
const ARGON2_OUTPUT_LEN: usize = 32; // 256 bits for AES-256

/// Salt length for Argon2
pub const SALT_LEN: usize = 16;

/// Nonce length for AES-256-GCM
pub const NONCE_LEN: usize = 12;

/// GCM authentication tag length
const TAG_LEN: usize = 16;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),
    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),
    #[error("Invalid ciphertext format")]
    InvalidFormat,
    #[error("Secure randomness unavailable: {0}")]
    Entropy(String),
}

/// Argon2id cost parameters, recorded next to the salt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB
    pub m_cost: u32,
    /// Iterations
    pub t_cost: u32,
    /// Lanes
    pub p_cost: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            m_cost: ARGON2_M_COST,
            t_cost: ARGON2_T_COST,
            p_cost: ARGON2_P_COST,
        }
    }
}

impl KdfParams {
    fn to_argon2(self) -> Result<Params, CryptoError> {
        Params::new(
            self.m_cost,
            self.t_cost,
            self.p_cost,
            Some(ARGON2_OUTPUT_LEN),
        )
        .map_err(|e| CryptoError::KeyDerivationFailed(e.to_string()))
    }

    /// Check the parameters are accepted by Argon2.
    pub fn check(&self) -> Result<(), CryptoError> {
        self.to_argon2().map(|_| ())
    }
}

/// Fresh random salt from the OS CSPRNG.
pub fn random_salt() -> Result<[u8; SALT_LEN], CryptoError> {
    let mut salt = [0u8; SALT_LEN];
    OsEntropy
        .try_fill(&mut salt)
        .map_err(|e| CryptoError::Entropy(e.to_string()))?;
    Ok(salt)
}

/// An AES-256 key derived from a passphrase. Zeroized on drop.
pub struct SealingKey(Zeroizing<[u8; ARGON2_OUTPUT_LEN]>);

impl SealingKey {
    /// Derive the key with Argon2id.
    pub fn derive(
        passphrase: &str,
        salt: &[u8; SALT_LEN],
        params: &KdfParams,
    ) -> Result<Self, CryptoError> {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params.to_argon2()?);

        let mut key = Zeroizing::new([0u8; ARGON2_OUTPUT_LEN]);
        argon2
            .hash_password_into(passphrase.as_bytes(), salt, &mut key[..])
            .map_err(|e| CryptoError::KeyDerivationFailed(e.to_string()))?;

        Ok(Self(key))
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.0[..]))
    }

    /// Encrypt `plaintext`. Output: `nonce (12) ‖ ciphertext ‖ tag (16)`.
    pub fn seal(&self, plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut nonce = [0u8; NONCE_LEN];
        OsEntropy
            .try_fill(&mut nonce)
            .map_err(|e| CryptoError::Entropy(e.to_string()))?;

        let ciphertext = self
            .cipher()
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: plaintext,
                    aad,
                },
            )
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    /// Decrypt a value produced by [`SealingKey::seal`] with the same `aad`.
    ///
    /// # Errors
    /// Returns error if the key is wrong, the data is tampered or the aad
    /// differs.
    pub fn open(&self, sealed: &[u8], aad: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        if sealed.len() < NONCE_LEN + TAG_LEN {
            return Err(CryptoError::InvalidFormat);
        }
        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);

        let plaintext = self
            .cipher()
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad,
                },
            )
            .map_err(|_| {
                CryptoError::DecryptionFailed("Invalid passphrase or corrupted data".to_string())
            })?;

        Ok(Zeroizing::new(plaintext))
    }
}
