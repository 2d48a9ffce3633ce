//! SQLite-backed secure storage.
//!
//! One file holds the wallet slots. Every value is sealed with a key
//! derived from the keystore passphrase; the KDF salt and parameters live
//! in a `keystore_meta` table alongside a sealed marker used to reject a
//! wrong passphrase at open time.

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use zeroize::Zeroizing;

use crate::crypto::{random_salt, KdfParams, SealingKey, SALT_LEN};
use crate::storage::{SecureStorage, Slot, StorageError};

const META_SALT: &str = "kdf_salt";
const META_PARAMS: &str = "kdf_params";
const META_CHECK: &str = "passphrase_check";

const CHECK_PLAINTEXT: &[u8] = b"qtc-keystore-v1";

/// Passphrase-sealed key/value store in a single SQLite file.
pub struct SqliteStorage {
    conn: Connection,
    key: SealingKey,
}

impl SqliteStorage {
    /// Open (or create) the keystore at `path`.
    ///
    /// `params` only applies when the file is new; an existing keystore
    /// keeps the parameters it was created with.
    pub fn open(path: &Path, passphrase: &str, params: &KdfParams) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(backend)?;

        // WAL mode for crash-safe commits
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(backend)?;

        Self::init(conn, passphrase, params)
    }

    /// A keystore that lives only as long as this value.
    pub fn open_in_memory(passphrase: &str, params: &KdfParams) -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(backend)?;
        Self::init(conn, passphrase, params)
    }

    fn init(conn: Connection, passphrase: &str, params: &KdfParams) -> Result<Self, StorageError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS keystore_meta (
                key   TEXT PRIMARY KEY,
                value BLOB NOT NULL
            );

            CREATE TABLE IF NOT EXISTS secure_slots (
                slot  TEXT PRIMARY KEY,
                value BLOB NOT NULL
            );
            ",
        )
        .map_err(backend)?;

        let stored_salt = meta_get(&conn, META_SALT)?;
        let key = match stored_salt {
            Some(salt_bytes) => {
                let salt: [u8; SALT_LEN] = salt_bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| StorageError::Locked("corrupt KDF salt".into()))?;
                let params_json = meta_get(&conn, META_PARAMS)?
                    .ok_or_else(|| StorageError::Locked("missing KDF parameters".into()))?;
                let stored_params: KdfParams = serde_json::from_slice(&params_json)
                    .map_err(|e| StorageError::Locked(format!("corrupt KDF parameters: {}", e)))?;

                let key = SealingKey::derive(passphrase, &salt, &stored_params)
                    .map_err(|e| StorageError::Locked(e.to_string()))?;

                let check = meta_get(&conn, META_CHECK)?
                    .ok_or_else(|| StorageError::Locked("missing passphrase check".into()))?;
                let opened = key
                    .open(&check, META_CHECK.as_bytes())
                    .map_err(|_| StorageError::Locked("wrong passphrase".into()))?;
                if opened.as_slice() != CHECK_PLAINTEXT {
                    return Err(StorageError::Locked("wrong passphrase".into()));
                }
                key
            }
            None => {
                let salt = random_salt().map_err(|e| StorageError::Backend(e.to_string()))?;
                let key = SealingKey::derive(passphrase, &salt, params)
                    .map_err(|e| StorageError::Backend(e.to_string()))?;
                let check = key
                    .seal(CHECK_PLAINTEXT, META_CHECK.as_bytes())
                    .map_err(|e| StorageError::Backend(e.to_string()))?;
                let params_json =
                    serde_json::to_vec(params).map_err(|e| StorageError::Backend(e.to_string()))?;

                conn.execute_batch("BEGIN IMMEDIATE").map_err(backend)?;
                let written = meta_set(&conn, META_SALT, &salt)
                    .and_then(|_| meta_set(&conn, META_PARAMS, &params_json))
                    .and_then(|_| meta_set(&conn, META_CHECK, &check));
                match written {
                    Ok(()) => conn.execute_batch("COMMIT").map_err(backend)?,
                    Err(e) => {
                        let _ = conn.execute_batch("ROLLBACK");
                        return Err(e);
                    }
                }
                log::info!("Initialised new sealed keystore");
                key
            }
        };

        Ok(Self { conn, key })
    }

    fn read_raw(&self, slot: Slot) -> Result<Option<Vec<u8>>, StorageError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT value FROM secure_slots WHERE slot = ?1")
            .map_err(|e| read_err(slot, e))?;
        stmt.query_row(params![slot.key()], |row| row.get(0))
            .optional()
            .map_err(|e| read_err(slot, e))
    }

    fn seal(&self, slot: Slot, value: &str) -> Result<Vec<u8>, StorageError> {
        self.key
            .seal(value.as_bytes(), slot.key().as_bytes())
            .map_err(|e| StorageError::Write {
                slot,
                reason: e.to_string(),
            })
    }
}

impl SecureStorage for SqliteStorage {
    fn get(&self, slot: Slot) -> Result<Option<Zeroizing<String>>, StorageError> {
        let Some(sealed) = self.read_raw(slot)? else {
            return Ok(None);
        };
        let plaintext = self
            .key
            .open(&sealed, slot.key().as_bytes())
            .map_err(|e| read_err(slot, e))?;
        let text = std::str::from_utf8(&plaintext).map_err(|e| read_err(slot, e))?;
        Ok(Some(Zeroizing::new(text.to_string())))
    }

    fn set(&mut self, slot: Slot, value: &str) -> Result<(), StorageError> {
        let sealed = self.seal(slot, value)?;
        upsert(&self.conn, slot, &sealed).map_err(|e| write_err(slot, e))
    }

    fn delete(&mut self, slot: Slot) -> Result<(), StorageError> {
        self.conn
            .execute(
                "DELETE FROM secure_slots WHERE slot = ?1",
                params![slot.key()],
            )
            .map_err(|e| StorageError::Delete {
                slot,
                reason: e.to_string(),
            })?;
        Ok(())
    }

    /// One SQLite transaction: either every slot is written or none is.
    fn set_all(&mut self, entries: &[(Slot, &str)]) -> Result<(), StorageError> {
        let mut sealed = Vec::with_capacity(entries.len());
        for (slot, value) in entries {
            sealed.push((*slot, self.seal(*slot, value)?));
        }

        let tx = self.conn.transaction().map_err(backend)?;
        for (slot, bytes) in &sealed {
            upsert(&tx, *slot, bytes).map_err(|e| write_err(*slot, e))?;
        }
        // Dropping an uncommitted transaction rolls it back
        tx.commit().map_err(backend)
    }
}

fn upsert(conn: &Connection, slot: Slot, sealed: &[u8]) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO secure_slots (slot, value) VALUES (?1, ?2)
         ON CONFLICT(slot) DO UPDATE SET value = excluded.value",
        params![slot.key(), sealed],
    )?;
    Ok(())
}

fn meta_get(conn: &Connection, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
    conn.query_row(
        "SELECT value FROM keystore_meta WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
    .map_err(backend)
}

fn meta_set(conn: &Connection, key: &str, value: &[u8]) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO keystore_meta (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )
    .map_err(backend)?;
    Ok(())
}

fn backend(e: rusqlite::Error) -> StorageError {
    StorageError::Backend(e.to_string())
}

fn read_err(slot: Slot, e: impl std::fmt::Display) -> StorageError {
    StorageError::Read {
        slot,
        reason: e.to_string(),
    }
}

fn write_err(slot: Slot, e: impl std::fmt::Display) -> StorageError {
    StorageError::Write {
        slot,
        reason: e.to_string(),
    }
}
