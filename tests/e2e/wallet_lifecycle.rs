//! End-to-end wallet lifecycle tests.
//!
//! Exercises the keystore against the sealed SQLite backend on disk:
//!
//! 1. Create → persist → reopen → load
//! 2. Seed phrase recovery into a fresh keystore
//! 3. Restore, replace and delete
//! 4. Signing a transaction with the stored key
//!
//! Run with: cargo test --test wallet_lifecycle

use qtc_core::crypto::KdfParams;
use qtc_core::sqlite::SqliteStorage;
use qtc_core::units::{to_base_units, DEFAULT_FEE};
use qtc_core::{
    format_address, is_valid_address, is_valid_seed_phrase, verify, Address, KeyPair, Keystore,
    KeystoreError, MemoryStorage, OsEntropy, SecureStorage, Slot, Transaction,
};
use std::path::Path;
use tempfile::TempDir;

const PHRASE: &str =
    "quantum particle energy wave photon electron neutron proton atomic nucleus orbital spin";

/// Cheap Argon2 parameters so the suite stays fast
fn kdf() -> KdfParams {
    KdfParams {
        m_cost: 1024,
        t_cost: 1,
        p_cost: 1,
    }
}

fn open(path: &Path, passphrase: &str) -> Keystore<SqliteStorage, OsEntropy> {
    let storage = SqliteStorage::open(path, passphrase, &kdf()).expect("open keystore");
    Keystore::new(storage, OsEntropy)
}

// ============================================================================
// 1. Persistence
// ============================================================================

#[test]
fn test_created_wallet_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keystore.db");

    let created = {
        let keystore = open(&path, "hunter2");
        assert!(keystore.load().unwrap().is_none());
        keystore.create().unwrap()
    };

    let keystore = open(&path, "hunter2");
    let loaded = keystore.load().unwrap().expect("wallet persisted");
    assert_eq!(loaded, created);
    assert!(matches!(keystore.create(), Err(KeystoreError::WalletExists)));
}

#[test]
fn test_secrets_are_not_stored_in_clear() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keystore.db");

    let wallet = open(&path, "hunter2").restore(PHRASE).unwrap();

    let raw = std::fs::read(&path).unwrap();
    let needles = [
        "quantum particle".to_string(),
        wallet.private_key().as_hex()[..32].to_string(),
    ];
    for needle in &needles {
        assert!(
            !raw.windows(needle.len()).any(|w| w == needle.as_bytes()),
            "found plaintext secret in keystore file"
        );
    }
}

#[test]
fn test_wrong_passphrase_cannot_open_keystore() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keystore.db");
    open(&path, "right").create().unwrap();

    assert!(SqliteStorage::open(&path, "wrong", &kdf()).is_err());
    assert!(SqliteStorage::open(&path, "", &kdf()).is_err());
    assert!(open(&path, "right").load().unwrap().is_some());
}

// ============================================================================
// 2. Recovery
// ============================================================================

#[test]
fn test_generate_validate_restore_delete() {
    let dir = TempDir::new().unwrap();

    // Generate on one device
    let first = open(&dir.path().join("a.db"), "pw-a");
    let created = first.create().unwrap();
    let phrase = created.seed_phrase().to_phrase();
    assert!(is_valid_seed_phrase(&phrase));
    assert!(is_valid_address(created.address().as_str()));

    // Restore on another
    let second = open(&dir.path().join("b.db"), "pw-b");
    let restored = second.restore(&phrase).unwrap();
    assert_eq!(restored.address(), created.address());
    assert_eq!(restored.public_key(), created.public_key());
    assert_eq!(restored.private_key(), created.private_key());

    // Delete on the second device only
    second.delete().unwrap();
    assert!(second.load().unwrap().is_none());
    assert_eq!(first.load().unwrap().unwrap().address(), created.address());
}

#[test]
fn test_restore_matches_direct_derivation() {
    let keystore = Keystore::new(MemoryStorage::new(), OsEntropy);
    let wallet = keystore.restore(PHRASE).unwrap();
    let keys = KeyPair::from_phrase_str(PHRASE).unwrap();

    assert_eq!(wallet.key_pair(), &keys);
    assert_eq!(wallet.address(), &keys.address());
    assert_eq!(wallet.private_key().as_hex().len(), 128);
    assert_eq!(wallet.public_key().as_hex().len(), 64);
    assert_eq!(
        wallet.address().as_str(),
        format!("qtc1q{}", &wallet.public_key().as_hex()[..40])
    );
}

#[test]
fn test_restore_replaces_and_delete_empties() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keystore.db");
    let keystore = open(&path, "pw");

    let created = keystore.create().unwrap();
    let restored = keystore.restore(PHRASE).unwrap();
    assert_ne!(created.address(), restored.address());

    drop(keystore);
    let keystore = open(&path, "pw");
    assert_eq!(keystore.load().unwrap().unwrap(), restored);

    keystore.delete().unwrap();
    let storage = keystore.into_storage();
    for slot in Slot::ALL {
        assert!(storage.get(slot).unwrap().is_none(), "{} left behind", slot);
    }
}

#[test]
fn test_create_after_delete_on_same_keystore() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keystore.db");

    let keystore = open(&path, "pw");
    let first = keystore.create().unwrap();
    keystore.delete().unwrap();
    assert!(keystore.load().unwrap().is_none());

    let second = keystore.create().unwrap();
    assert_ne!(second.address(), first.address());
    assert_ne!(
        second.seed_phrase().to_phrase(),
        first.seed_phrase().to_phrase()
    );

    // The replacement is what survives a reopen
    drop(keystore);
    let keystore = open(&path, "pw");
    assert_eq!(keystore.load().unwrap().unwrap(), second);
}

#[test]
fn test_many_wallets_have_distinct_phrases() {
    let mut addresses = std::collections::HashSet::new();
    for _ in 0..20 {
        let wallet = Keystore::new(MemoryStorage::new(), OsEntropy)
            .create()
            .unwrap();
        assert!(!wallet.seed_phrase().has_duplicates());
        assert!(addresses.insert(wallet.address().clone()));
    }
}

// ============================================================================
// 3. Signing
// ============================================================================

#[test]
fn test_sign_transaction_with_stored_key() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keystore.db");
    let keystore = open(&path, "pw");
    let wallet = keystore.restore(PHRASE).unwrap();

    let to: Address = KeyPair::from_secret_bytes(&[9u8; 32])
        .unwrap()
        .address();
    let tx = Transaction::new(
        wallet.address().clone(),
        to,
        to_base_units(1.5).unwrap(),
        0,
        1_700_000_000,
    );
    assert_eq!(tx.fee, DEFAULT_FEE);

    let signature = keystore.sign(&tx).unwrap();
    assert!(verify(wallet.private_key(), &tx, &signature));

    // Same key after reopening signs identically
    drop(keystore);
    let again = open(&path, "pw").sign(&tx).unwrap();
    assert_eq!(again, signature);

    // The JSON a client would submit carries addresses as plain strings
    let json = serde_json::to_value(&tx).unwrap();
    assert_eq!(json["from"], wallet.address().as_str());
    assert_eq!(json["amount"], 150_000_000u64);
}

#[test]
fn test_sign_without_wallet() {
    let keystore = Keystore::new(MemoryStorage::new(), OsEntropy);
    assert!(matches!(
        keystore.sign(&serde_json::json!({"amount": 1})),
        Err(KeystoreError::WalletNotFound)
    ));
}

#[test]
fn test_display_formatting() {
    let wallet = Keystore::new(MemoryStorage::new(), OsEntropy)
        .restore(PHRASE)
        .unwrap();
    let address = wallet.address().as_str();
    let short = format_address(address);
    assert_eq!(short.len(), 19);
    assert!(short.starts_with(&address[..8]));
    assert!(short.ends_with(&address[address.len() - 8..]));
    assert_eq!(wallet.address().formatted(), short);
}
