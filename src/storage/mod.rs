// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Key Manager Storage
//!
//! Persistent state lives in a single redb file under the data directory:
//!
//! ```text
//! $DATA_DIR/
//!   keymanager.redb   # keys, slashing protection, signers, overrides
//!   api-token.txt     # bearer token (see `auth`)
//! ```
//!
//! Slashing protection records are created on import and never deleted.
//! They are only ever read back through key deletion, wrapped in the
//! interchange envelope from [`interchange`].

pub mod db;
pub mod interchange;

use std::path::{Path, PathBuf};

pub use db::{
    DeleteKeyOutcome, DeleteSignerOutcome, InsertOutcome, KeymanagerDb, NewKeystore, StoreError,
    StoreResult,
};
pub use interchange::{Interchange, InterchangeError, ValidatorRecord};

/// File name of the database inside the data directory.
pub const DB_FILE_NAME: &str = "keymanager.redb";

pub fn db_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DB_FILE_NAME)
}
