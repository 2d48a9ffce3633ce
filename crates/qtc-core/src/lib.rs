//! QuantumCoin Core
//!
//! Wallet key management for QuantumCoin.
//!
//! # Derivation
//!
//! From a single 12-word seed phrase:
//! - private key: `sha256(phrase) ‖ sha256(sha256(phrase) ‖ "quantum_derive")`
//! - public key: `sha256(private ‖ "quantum_salt")`
//! - address: `qtc1q` + first 20 bytes of the public key, hex encoded
//!
//! The "signature" is a keyed hash. Both are placeholders for a real
//! post-quantum scheme and sit behind the [`signer::Signer`] trait.
//!
//! # Storage
//!
//! The [`keystore::Keystore`] persists the wallet through a
//! [`storage::SecureStorage`] backend. [`sqlite::SqliteStorage`] seals each
//! value with Argon2id + AES-256-GCM.

pub mod address;
pub mod crypto;
pub mod entropy;
pub mod keys;
pub mod keystore;
pub mod seed;
pub mod signer;
pub mod sqlite;
pub mod storage;
pub mod units;
pub mod wordlist;

pub use address::{format_address, is_valid_address, Address, AddressError};
pub use entropy::{EntropyError, EntropySource, OsEntropy};
pub use keys::{KeyError, KeyPair, PrivateKey, PublicKey};
pub use keystore::{Keystore, KeystoreError, Wallet};
pub use seed::{is_valid_seed_phrase, SeedError, SeedPhrase};
pub use signer::{sign, verify, HashSigner, Signature, Signer, SigningError, Transaction};
pub use storage::{MemoryStorage, SecureStorage, Slot, StorageError};
