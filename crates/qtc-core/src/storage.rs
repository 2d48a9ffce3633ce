//! Secure key/value storage
//!
//! The keystore persists a wallet in three string slots. Backends only need
//! `get`/`set`/`delete`; [`SecureStorage::set_all`] has a default
//! stage-and-rollback implementation that backends with real transactions
//! should override.

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use zeroize::Zeroizing;

/// Persisted wallet fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    Public,
    Private,
    Seed,
}

impl Slot {
    /// All slots, in commit order. `Public` goes last so an interrupted
    /// write without transactions never looks like a wallet.
    pub const ALL: [Slot; 3] = [Slot::Seed, Slot::Private, Slot::Public];

    /// Storage key
    pub fn key(&self) -> &'static str {
        match self {
            Slot::Public => "QTC_PUBLIC",
            Slot::Private => "QTC_PRIVATE",
            Slot::Seed => "QTC_SEED",
        }
    }

    pub fn from_key(key: &str) -> Option<Slot> {
        Slot::ALL.into_iter().find(|s| s.key() == key)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage read failed for {slot}: {reason}")]
    Read { slot: Slot, reason: String },
    #[error("Storage write failed for {slot}: {reason}")]
    Write { slot: Slot, reason: String },
    #[error("Storage delete failed for {slot}: {reason}")]
    Delete { slot: Slot, reason: String },
    #[error("Storage locked: {0}")]
    Locked(String),
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// A confidentiality-preserving durable key/value store.
///
/// Writes must be durable before returning; reads return exactly what was
/// last written, or `None`.
pub trait SecureStorage: Send {
    fn get(&self, slot: Slot) -> Result<Option<Zeroizing<String>>, StorageError>;

    fn set(&mut self, slot: Slot, value: &str) -> Result<(), StorageError>;

    /// Remove a slot. Removing an absent slot is not an error.
    fn delete(&mut self, slot: Slot) -> Result<(), StorageError>;

    /// Write every entry or none of them.
    ///
    /// The default snapshots the current values, writes in order, and on
    /// the first failure restores the snapshot.
    fn set_all(&mut self, entries: &[(Slot, &str)]) -> Result<(), StorageError> {
        let mut snapshot = Vec::with_capacity(entries.len());
        for (slot, _) in entries {
            snapshot.push((*slot, self.get(*slot)?));
        }

        for (written, (slot, value)) in entries.iter().enumerate() {
            if let Err(e) = self.set(*slot, value) {
                for (slot, previous) in snapshot.iter().take(written + 1).rev() {
                    let restored = match previous {
                        Some(v) => self.set(*slot, v),
                        None => self.delete(*slot),
                    };
                    if let Err(rollback) = restored {
                        log::error!("Rollback of {} failed: {}", slot, rollback);
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }
}

impl<S: SecureStorage + ?Sized> SecureStorage for Box<S> {
    fn get(&self, slot: Slot) -> Result<Option<Zeroizing<String>>, StorageError> {
        (**self).get(slot)
    }

    fn set(&mut self, slot: Slot, value: &str) -> Result<(), StorageError> {
        (**self).set(slot, value)
    }

    fn delete(&mut self, slot: Slot) -> Result<(), StorageError> {
        (**self).delete(slot)
    }

    fn set_all(&mut self, entries: &[(Slot, &str)]) -> Result<(), StorageError> {
        (**self).set_all(entries)
    }
}

/// In-process storage. Nothing survives the process.
#[derive(Default)]
pub struct MemoryStorage {
    slots: HashMap<Slot, Zeroizing<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl SecureStorage for MemoryStorage {
    fn get(&self, slot: Slot) -> Result<Option<Zeroizing<String>>, StorageError> {
        Ok(self.slots.get(&slot).cloned())
    }

    fn set(&mut self, slot: Slot, value: &str) -> Result<(), StorageError> {
        self.slots.insert(slot, Zeroizing::new(value.to_string()));
        Ok(())
    }

    fn delete(&mut self, slot: Slot) -> Result<(), StorageError> {
        self.slots.remove(&slot);
        Ok(())
    }
}
