//! Wallet lifecycle
//!
//! A [`Keystore`] owns one wallet: a seed phrase, the key pair derived from
//! it, and the address. It moves between two states:
//!
//! - **Empty**: no complete wallet in storage
//! - **Active**: public key, private key and seed phrase all stored
//!
//! `create`/`restore` go Empty → Active (restore also replaces an active
//! wallet), `delete` goes back to Empty. Every operation holds one mutex
//! for its whole duration.

use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

use crate::address::Address;
use crate::entropy::{EntropyError, EntropySource};
use crate::keys::{KeyPair, PrivateKey, PublicKey};
use crate::seed::{SeedError, SeedPhrase};
use crate::signer::{self, HashSigner, Signature, Signer, SigningError};
use crate::storage::{SecureStorage, Slot, StorageError};

#[derive(Error, Debug)]
pub enum KeystoreError {
    #[error("Secure entropy unavailable: {0}")]
    EntropyUnavailable(#[from] EntropyError),
    #[error("Invalid seed phrase: {0}")]
    InvalidSeedPhrase(String),
    #[error("Wallet creation failed: {0}")]
    WalletCreationFailed(#[source] Box<KeystoreError>),
    #[error("A wallet already exists")]
    WalletExists,
    #[error("No wallet found")]
    WalletNotFound,
    #[error("Failed to read wallet: {0}")]
    StorageReadFailed(#[source] StorageError),
    #[error("Failed to write wallet: {0}")]
    StorageWriteFailed(#[source] StorageError),
    #[error("Failed to delete {slots:?}: {reason}")]
    StorageDeleteFailed { slots: Vec<Slot>, reason: String },
    #[error("Stored wallet is corrupt: {0}")]
    CorruptWallet(String),
    #[error("Signing failed: {0}")]
    SigningError(#[from] SigningError),
}

impl From<SeedError> for KeystoreError {
    fn from(e: SeedError) -> Self {
        match e {
            SeedError::InvalidSeedPhrase(reason) => KeystoreError::InvalidSeedPhrase(reason),
            SeedError::Entropy(e) => KeystoreError::EntropyUnavailable(e),
            SeedError::EntropyExhausted => KeystoreError::EntropyUnavailable(
                EntropyError::Unavailable("seed entropy stream exhausted".into()),
            ),
        }
    }
}

/// A complete wallet as held by the keystore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wallet {
    address: Address,
    key_pair: KeyPair,
    seed_phrase: SeedPhrase,
}

impl Wallet {
    fn from_seed_phrase(seed_phrase: SeedPhrase) -> Self {
        let key_pair = KeyPair::from_seed_phrase(&seed_phrase);
        Self {
            address: key_pair.address(),
            key_pair,
            seed_phrase,
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn public_key(&self) -> &PublicKey {
        self.key_pair.public_key()
    }

    pub fn private_key(&self) -> &PrivateKey {
        self.key_pair.private_key()
    }

    pub fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }

    pub fn seed_phrase(&self) -> &SeedPhrase {
        &self.seed_phrase
    }
}

struct Inner<S, E> {
    storage: S,
    entropy: E,
}

impl<S: SecureStorage, E: EntropySource> Inner<S, E> {
    /// Read the stored triple. Partial state counts as no wallet.
    fn read_wallet(&self) -> Result<Option<Wallet>, KeystoreError> {
        let read = |slot| {
            self.storage
                .get(slot)
                .map_err(KeystoreError::StorageReadFailed)
        };
        let public = read(Slot::Public)?;
        let private = read(Slot::Private)?;
        let seed = read(Slot::Seed)?;

        let (public, private, seed) = match (public, private, seed) {
            (Some(public), Some(private), Some(seed)) => (public, private, seed),
            (None, None, None) => return Ok(None),
            (public, private, seed) => {
                log::warn!(
                    "Ignoring partial wallet (public: {}, private: {}, seed: {})",
                    public.is_some(),
                    private.is_some(),
                    seed.is_some()
                );
                return Ok(None);
            }
        };

        let seed_phrase = SeedPhrase::parse(&seed)
            .map_err(|e| KeystoreError::CorruptWallet(format!("stored seed phrase: {}", e)))?;
        let key_pair = KeyPair::from_private_key(PrivateKey::from_hex(private.as_str()));
        if key_pair.public_key().as_hex() != public.as_str() {
            return Err(KeystoreError::CorruptWallet(
                "public key does not match private key".into(),
            ));
        }
        if KeyPair::from_seed_phrase(&seed_phrase) != key_pair {
            return Err(KeystoreError::CorruptWallet(
                "seed phrase does not derive the stored key".into(),
            ));
        }

        Ok(Some(Wallet {
            address: key_pair.address(),
            key_pair,
            seed_phrase,
        }))
    }

    fn write_wallet(&mut self, wallet: &Wallet) -> Result<(), KeystoreError> {
        let phrase = wallet.seed_phrase.to_phrase();
        let entries = [
            (Slot::Seed, phrase.as_str()),
            (Slot::Private, wallet.private_key().as_hex()),
            (Slot::Public, wallet.public_key().as_hex()),
        ];
        self.storage
            .set_all(&entries)
            .map_err(KeystoreError::StorageWriteFailed)
    }

    fn create(&mut self) -> Result<Wallet, KeystoreError> {
        let seed_phrase = SeedPhrase::generate(&mut self.entropy)?;
        let wallet = Wallet::from_seed_phrase(seed_phrase);
        self.write_wallet(&wallet)?;
        Ok(wallet)
    }
}

/// Owns the wallet's persistent state.
pub struct Keystore<S, E> {
    inner: Mutex<Inner<S, E>>,
    signer: Box<dyn Signer>,
}

impl<S: SecureStorage, E: EntropySource> Keystore<S, E> {
    pub fn new(storage: S, entropy: E) -> Self {
        Self {
            inner: Mutex::new(Inner { storage, entropy }),
            signer: Box::new(HashSigner),
        }
    }

    /// Replace the signature scheme used by [`Keystore::sign`].
    pub fn with_signer(mut self, signer: impl Signer + 'static) -> Self {
        self.signer = Box::new(signer);
        self
    }

    /// Give back the storage backend.
    pub fn into_storage(self) -> S {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .storage
    }

    fn lock(&self) -> MutexGuard<'_, Inner<S, E>> {
        // Writes go through set_all, so poisoning never hides a half-written wallet
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Generate a new wallet and store it.
    ///
    /// Keys are derived from the generated seed phrase, so
    /// `restore(wallet.seed_phrase())` rebuilds the same wallet.
    ///
    /// # Errors
    /// [`KeystoreError::WalletExists`] if a complete wallet is already
    /// stored. Every other failure is wrapped in
    /// [`KeystoreError::WalletCreationFailed`].
    pub fn create(&self) -> Result<Wallet, KeystoreError> {
        let mut inner = self.lock();

        let existing = inner
            .read_wallet()
            .map_err(|e| KeystoreError::WalletCreationFailed(Box::new(e)))?;
        if existing.is_some() {
            return Err(KeystoreError::WalletExists);
        }

        let wallet = inner.create().map_err(|e| {
            log::warn!("Wallet creation failed: {}", e);
            KeystoreError::WalletCreationFailed(Box::new(e))
        })?;

        log::info!("Created wallet {}", wallet.address.formatted());
        Ok(wallet)
    }

    /// Rebuild a wallet from its seed phrase and store it, replacing any
    /// active wallet.
    pub fn restore(&self, phrase: &str) -> Result<Wallet, KeystoreError> {
        let seed_phrase = SeedPhrase::parse(phrase)?;
        let wallet = Wallet::from_seed_phrase(seed_phrase);

        let mut inner = self.lock();
        inner.write_wallet(&wallet)?;

        log::info!("Restored wallet {}", wallet.address.formatted());
        Ok(wallet)
    }

    /// The active wallet, or `None` when storage is empty or only partly
    /// written.
    pub fn load(&self) -> Result<Option<Wallet>, KeystoreError> {
        self.lock().read_wallet()
    }

    /// Remove every slot. Each slot is attempted even when an earlier one
    /// fails.
    pub fn delete(&self) -> Result<(), KeystoreError> {
        let mut inner = self.lock();

        let mut failed = Vec::new();
        let mut reasons = Vec::new();
        // Public first: once it is gone the rest no longer looks like a wallet
        for slot in Slot::ALL.into_iter().rev() {
            if let Err(e) = inner.storage.delete(slot) {
                log::warn!("Failed to delete {}: {}", slot, e);
                failed.push(slot);
                reasons.push(e.to_string());
            }
        }

        if failed.is_empty() {
            log::info!("Wallet deleted");
            Ok(())
        } else {
            Err(KeystoreError::StorageDeleteFailed {
                slots: failed,
                reason: reasons.join("; "),
            })
        }
    }

    /// Sign `payload` with the active wallet's private key.
    pub fn sign<T: Serialize + ?Sized>(&self, payload: &T) -> Result<Signature, KeystoreError> {
        let wallet = self.load()?.ok_or(KeystoreError::WalletNotFound)?;
        Ok(signer::sign_with(
            self.signer.as_ref(),
            wallet.private_key(),
            payload,
        )?)
    }
}
