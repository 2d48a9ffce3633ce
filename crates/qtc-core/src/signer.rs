//! Transaction signing
//!
//! The current scheme is a keyed hash, `sha256(private_key ‖ payload)`.
//! It is deterministic (no nonce) and can only be checked by someone
//! holding the private key. It stands in for a real signature algorithm,
//! which should be added as another [`Signer`] implementation.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::address::Address;
use crate::keys::{sha256_hex, PrivateKey};
use crate::units::DEFAULT_FEE;

#[derive(Error, Debug)]
pub enum SigningError {
    #[error("Payload is not serializable: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Hex encoded signature
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(String);

impl Signature {
    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A signature algorithm over canonical payload bytes.
pub trait Signer: Send + Sync {
    fn sign_message(&self, private_key: &PrivateKey, message: &[u8]) -> Signature;

    fn verify_message(
        &self,
        private_key: &PrivateKey,
        message: &[u8],
        signature: &Signature,
    ) -> bool {
        self.sign_message(private_key, message) == *signature
    }
}

/// Keyed SHA-256 placeholder.
#[derive(Debug, Default, Clone, Copy)]
pub struct HashSigner;

impl Signer for HashSigner {
    fn sign_message(&self, private_key: &PrivateKey, message: &[u8]) -> Signature {
        Signature(sha256_hex(&[private_key.as_hex().as_bytes(), message]))
    }
}

/// An outgoing transfer as it is signed and submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub from: Address,
    pub to: Address,
    /// Amount in base units
    pub amount: u64,
    /// Fee in base units
    pub fee: u64,
    pub nonce: u64,
    /// Unix seconds
    pub timestamp: u64,
}

impl Transaction {
    /// Transfer with the default fee.
    pub fn new(from: Address, to: Address, amount: u64, nonce: u64, timestamp: u64) -> Self {
        Self {
            from,
            to,
            amount,
            fee: DEFAULT_FEE,
            nonce,
            timestamp,
        }
    }
}

/// Canonical JSON for a payload: object keys sorted, no whitespace.
///
/// Going through `serde_json::Value` sorts keys, so field order in the
/// Rust type or insertion order in a map does not affect the bytes.
pub fn canonical_payload<T: Serialize + ?Sized>(payload: &T) -> Result<Vec<u8>, SigningError> {
    let value = serde_json::to_value(payload)?;
    Ok(serde_json::to_vec(&value)?)
}

/// Sign any serializable payload with the default signer.
pub fn sign<T: Serialize + ?Sized>(
    private_key: &PrivateKey,
    payload: &T,
) -> Result<Signature, SigningError> {
    sign_with(&HashSigner, private_key, payload)
}

/// Sign with a specific [`Signer`].
pub fn sign_with<S: Signer + ?Sized, T: Serialize + ?Sized>(
    signer: &S,
    private_key: &PrivateKey,
    payload: &T,
) -> Result<Signature, SigningError> {
    let message = canonical_payload(payload)?;
    Ok(signer.sign_message(private_key, &message))
}

/// Check a signature produced by [`sign`]. Unserializable payloads never verify.
pub fn verify<T: Serialize + ?Sized>(
    private_key: &PrivateKey,
    payload: &T,
    signature: &Signature,
) -> bool {
    match canonical_payload(payload) {
        Ok(message) => HashSigner.verify_message(private_key, &message, signature),
        Err(_) => false,
    }
}
