// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded key manager database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! All tables are keyed by the 48 raw pubkey bytes, so range scans come back
//! ordered by pubkey.
//!
//! - `keystores`: pubkey → serialized StoredKeystore (active local keys)
//! - `slashing_protection`: pubkey → serialized ValidatorRecord
//! - `remote_signers`: pubkey → serialized StoredSigner
//! - `fee_recipients`: pubkey → 20 address bytes
//! - `gas_limits`: pubkey → u64
//! - `graffiti`: pubkey → UTF-8 string
//!
//! ## Atomicity
//!
//! redb admits one write transaction at a time. Every key import and delete
//! runs inside a single write transaction, which is what serializes
//! concurrent requests for the same pubkey.

use std::path::Path;

use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use serde::{Deserialize, Serialize};

use super::interchange::ValidatorRecord;
use crate::models::{KeyEntry, PubkeyHex, SignerDefinition};

// =============================================================================
// Table Definitions
// =============================================================================

const KEYSTORES: TableDefinition<&[u8], &[u8]> = TableDefinition::new("keystores");

const SLASHING_PROTECTION: TableDefinition<&[u8], &[u8]> =
    TableDefinition::new("slashing_protection");

const REMOTE_SIGNERS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("remote_signers");

const FEE_RECIPIENTS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("fee_recipients");

const GAS_LIMITS: TableDefinition<&[u8], u64> = TableDefinition::new("gas_limits");

const GRAFFITI: TableDefinition<&[u8], &str> = TableDefinition::new("graffiti");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("slashing protection record missing for active key {0}")]
    MissingSlashingRecord(PubkeyHex),

    #[error("unknown validator {0}")]
    UnknownValidator(PubkeyHex),

    #[error("corrupt value in {table}")]
    Corrupt { table: &'static str },
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Stored Values & Outcomes
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredKeystore {
    keystore: String,
    derivation_path: Option<String>,
    imported_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredSigner {
    url: String,
    readonly: bool,
    imported_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// The pubkey is already known, locally or remotely. Nothing was written.
    Duplicate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteKeyOutcome {
    /// An active key was removed; its retained record is attached.
    Deleted(ValidatorRecord),
    /// No active key, but a record from an earlier import is retained.
    NotActive(ValidatorRecord),
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteSignerOutcome {
    Deleted,
    NotFound,
    /// The signer is read-only and was left in place.
    ReadOnly,
}

/// A keystore accepted for import.
#[derive(Debug, Clone)]
pub struct NewKeystore<'a> {
    pub pubkey: PubkeyHex,
    pub keystore: &'a str,
    pub derivation_path: Option<String>,
    /// History supplied with the import, merged into any retained record.
    pub slashing_protection: Option<ValidatorRecord>,
}

// =============================================================================
// KeymanagerDb
// =============================================================================

pub struct KeymanagerDb {
    db: Database,
}

impl KeymanagerDb {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(KEYSTORES)?;
            let _ = write_txn.open_table(SLASHING_PROTECTION)?;
            let _ = write_txn.open_table(REMOTE_SIGNERS)?;
            let _ = write_txn.open_table(FEE_RECIPIENTS)?;
            let _ = write_txn.open_table(GAS_LIMITS)?;
            let _ = write_txn.open_table(GRAFFITI)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    // =========================================================================
    // Local keystores
    // =========================================================================

    /// Active local keys, ordered by pubkey.
    pub fn list_keys(&self) -> StoreResult<Vec<KeyEntry>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(KEYSTORES)?;

        let mut keys = Vec::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            let stored: StoredKeystore = serde_json::from_slice(value.value())?;
            keys.push(KeyEntry {
                validating_pubkey: decode_pubkey(key.value(), "keystores")?,
                derivation_path: stored.derivation_path,
                readonly: false,
            });
        }
        Ok(keys)
    }

    /// Import a keystore together with its slashing protection record.
    ///
    /// The record is written before the key, in the same transaction.
    pub fn insert_keystore(&self, new: NewKeystore<'_>) -> StoreResult<InsertOutcome> {
        let key = new.pubkey.as_bytes().as_slice();
        let write_txn = self.db.begin_write()?;

        if is_known(&write_txn, &new.pubkey)? {
            write_txn.abort()?;
            return Ok(InsertOutcome::Duplicate);
        }

        {
            let mut slashing = write_txn.open_table(SLASHING_PROTECTION)?;
            let mut record = match slashing.get(key)? {
                Some(value) => serde_json::from_slice(value.value())?,
                None => ValidatorRecord::empty(new.pubkey),
            };
            if let Some(supplied) = new.slashing_protection {
                record.merge(supplied);
            }
            let json = serde_json::to_vec(&record)?;
            slashing.insert(key, json.as_slice())?;

            let stored = StoredKeystore {
                keystore: new.keystore.to_string(),
                derivation_path: new.derivation_path,
                imported_at: Utc::now(),
            };
            let json = serde_json::to_vec(&stored)?;
            write_txn.open_table(KEYSTORES)?.insert(key, json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(InsertOutcome::Inserted)
    }

    /// Disable a key, then read its retained slashing protection record.
    ///
    /// Both steps happen in one write transaction. Records are never removed,
    /// so repeating the call reports `NotActive` with the same record.
    pub fn delete_keystore(&self, pubkey: &PubkeyHex) -> StoreResult<DeleteKeyOutcome> {
        let key = pubkey.as_bytes().as_slice();
        let write_txn = self.db.begin_write()?;

        let was_active = write_txn.open_table(KEYSTORES)?.remove(key)?.is_some();

        let record: Option<ValidatorRecord> = {
            let slashing = write_txn.open_table(SLASHING_PROTECTION)?;
            let bytes = slashing.get(key)?.map(|value| value.value().to_vec());
            bytes.map(|bytes| serde_json::from_slice(&bytes)).transpose()?
        };

        let outcome = match (was_active, record) {
            (true, Some(record)) => DeleteKeyOutcome::Deleted(record),
            (true, None) => {
                write_txn.abort()?;
                return Err(StoreError::MissingSlashingRecord(*pubkey));
            }
            (false, Some(record)) => DeleteKeyOutcome::NotActive(record),
            (false, None) => DeleteKeyOutcome::NotFound,
        };

        if was_active {
            write_txn.commit()?;
        } else {
            write_txn.abort()?;
        }
        Ok(outcome)
    }

    // =========================================================================
    // Remote signers
    // =========================================================================

    /// Remote signer references, ordered by pubkey.
    pub fn list_remote_signers(&self) -> StoreResult<Vec<SignerDefinition>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(REMOTE_SIGNERS)?;

        let mut signers = Vec::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            let stored: StoredSigner = serde_json::from_slice(value.value())?;
            signers.push(SignerDefinition {
                pubkey: decode_pubkey(key.value(), "remote_signers")?,
                url: stored.url,
                readonly: stored.readonly,
            });
        }
        Ok(signers)
    }

    pub fn insert_remote_signer(
        &self,
        pubkey: &PubkeyHex,
        url: &str,
        readonly: bool,
    ) -> StoreResult<InsertOutcome> {
        let write_txn = self.db.begin_write()?;

        if is_known(&write_txn, pubkey)? {
            write_txn.abort()?;
            return Ok(InsertOutcome::Duplicate);
        }

        put_signer(&write_txn, pubkey, url, readonly)?;
        write_txn.commit()?;
        Ok(InsertOutcome::Inserted)
    }

    pub fn delete_remote_signer(&self, pubkey: &PubkeyHex) -> StoreResult<DeleteSignerOutcome> {
        let key = pubkey.as_bytes().as_slice();
        let write_txn = self.db.begin_write()?;

        let outcome = {
            let mut table = write_txn.open_table(REMOTE_SIGNERS)?;
            let stored: Option<StoredSigner> = {
                let bytes = table.get(key)?.map(|value| value.value().to_vec());
                bytes.map(|bytes| serde_json::from_slice(&bytes)).transpose()?
            };
            match stored {
                None => DeleteSignerOutcome::NotFound,
                Some(signer) if signer.readonly => DeleteSignerOutcome::ReadOnly,
                Some(_) => {
                    table.remove(key)?;
                    DeleteSignerOutcome::Deleted
                }
            }
        };

        if outcome == DeleteSignerOutcome::Deleted {
            write_txn.commit()?;
        } else {
            write_txn.abort()?;
        }
        Ok(outcome)
    }

    /// Install operator-configured signers as read-only entries.
    ///
    /// Existing remote entries for the same pubkey are replaced. A pubkey held
    /// as a local keystore is skipped and returned.
    pub fn seed_readonly_signers(
        &self,
        signers: &[(PubkeyHex, String)],
    ) -> StoreResult<Vec<PubkeyHex>> {
        let write_txn = self.db.begin_write()?;
        let mut skipped = Vec::new();
        for (pubkey, url) in signers {
            let is_local = write_txn
                .open_table(KEYSTORES)?
                .get(pubkey.as_bytes().as_slice())?
                .is_some();
            if is_local {
                skipped.push(*pubkey);
                continue;
            }
            put_signer(&write_txn, pubkey, url, true)?;
        }
        write_txn.commit()?;
        Ok(skipped)
    }

    // =========================================================================
    // Per-validator overrides
    // =========================================================================

    /// Whether `pubkey` is an active local key or a remote signer.
    pub fn is_known_validator(&self, pubkey: &PubkeyHex) -> StoreResult<bool> {
        let read_txn = self.db.begin_read()?;
        let key = pubkey.as_bytes().as_slice();
        Ok(read_txn.open_table(KEYSTORES)?.get(key)?.is_some()
            || read_txn.open_table(REMOTE_SIGNERS)?.get(key)?.is_some())
    }

    pub fn fee_recipient(&self, pubkey: &PubkeyHex) -> StoreResult<Option<Address>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(FEE_RECIPIENTS)?;
        match table.get(pubkey.as_bytes().as_slice())? {
            Some(value) => <[u8; 20]>::try_from(value.value())
                .map(|bytes| Some(Address::from(bytes)))
                .map_err(|_| StoreError::Corrupt {
                    table: "fee_recipients",
                }),
            None => Ok(None),
        }
    }

    pub fn set_fee_recipient(&self, pubkey: &PubkeyHex, address: &Address) -> StoreResult<()> {
        self.write_override(pubkey, |txn, key| {
            txn.open_table(FEE_RECIPIENTS)?
                .insert(key, address.as_slice())?;
            Ok(())
        })
    }

    pub fn delete_fee_recipient(&self, pubkey: &PubkeyHex) -> StoreResult<()> {
        self.remove_override(|txn| {
            txn.open_table(FEE_RECIPIENTS)?
                .remove(pubkey.as_bytes().as_slice())?;
            Ok(())
        })
    }

    pub fn gas_limit(&self, pubkey: &PubkeyHex) -> StoreResult<Option<u64>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(GAS_LIMITS)?;
        Ok(table
            .get(pubkey.as_bytes().as_slice())?
            .map(|value| value.value()))
    }

    pub fn set_gas_limit(&self, pubkey: &PubkeyHex, gas_limit: u64) -> StoreResult<()> {
        self.write_override(pubkey, |txn, key| {
            txn.open_table(GAS_LIMITS)?.insert(key, gas_limit)?;
            Ok(())
        })
    }

    pub fn delete_gas_limit(&self, pubkey: &PubkeyHex) -> StoreResult<()> {
        self.remove_override(|txn| {
            txn.open_table(GAS_LIMITS)?
                .remove(pubkey.as_bytes().as_slice())?;
            Ok(())
        })
    }

    pub fn graffiti(&self, pubkey: &PubkeyHex) -> StoreResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(GRAFFITI)?;
        Ok(table
            .get(pubkey.as_bytes().as_slice())?
            .map(|value| value.value().to_string()))
    }

    pub fn set_graffiti(&self, pubkey: &PubkeyHex, graffiti: &str) -> StoreResult<()> {
        self.write_override(pubkey, |txn, key| {
            txn.open_table(GRAFFITI)?.insert(key, graffiti)?;
            Ok(())
        })
    }

    pub fn delete_graffiti(&self, pubkey: &PubkeyHex) -> StoreResult<()> {
        self.remove_override(|txn| {
            txn.open_table(GRAFFITI)?
                .remove(pubkey.as_bytes().as_slice())?;
            Ok(())
        })
    }

    /// Run `write` for a known validator, or fail with `UnknownValidator`.
    fn write_override<F>(&self, pubkey: &PubkeyHex, write: F) -> StoreResult<()>
    where
        F: FnOnce(&WriteTransaction, &[u8]) -> StoreResult<()>,
    {
        let write_txn = self.db.begin_write()?;
        if !is_known(&write_txn, pubkey)? {
            write_txn.abort()?;
            return Err(StoreError::UnknownValidator(*pubkey));
        }
        write(&write_txn, pubkey.as_bytes().as_slice())?;
        write_txn.commit()?;
        Ok(())
    }

    fn remove_override<F>(&self, remove: F) -> StoreResult<()>
    where
        F: FnOnce(&WriteTransaction) -> StoreResult<()>,
    {
        let write_txn = self.db.begin_write()?;
        remove(&write_txn)?;
        write_txn.commit()?;
        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn is_known(txn: &WriteTransaction, pubkey: &PubkeyHex) -> StoreResult<bool> {
    let key = pubkey.as_bytes().as_slice();
    Ok(txn.open_table(KEYSTORES)?.get(key)?.is_some()
        || txn.open_table(REMOTE_SIGNERS)?.get(key)?.is_some())
}

fn put_signer(
    txn: &WriteTransaction,
    pubkey: &PubkeyHex,
    url: &str,
    readonly: bool,
) -> StoreResult<()> {
    let stored = StoredSigner {
        url: url.to_string(),
        readonly,
        imported_at: Utc::now(),
    };
    let json = serde_json::to_vec(&stored)?;
    txn.open_table(REMOTE_SIGNERS)?
        .insert(pubkey.as_bytes().as_slice(), json.as_slice())?;
    Ok(())
}

fn decode_pubkey(bytes: &[u8], table: &'static str) -> StoreResult<PubkeyHex> {
    bytes
        .try_into()
        .map(PubkeyHex::from_bytes)
        .map_err(|_| StoreError::Corrupt { table })
}
