// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Key Lifecycle Operations
//!
//! [`KeyManager`] executes typed [`Request`]s against the store:
//!
//! - `keystores` - local keys and their slashing protection
//! - `remote_keys` - remote signer references
//! - `proposer_config` - per-validator fee recipient, gas limit and graffiti
//!
//! Batch operations answer one [`OperationResult`](crate::status::OperationResult)
//! per input item, in input order; a failing item never affects the others.
//! Everything here is blocking (KDFs, redb I/O).

mod keystores;
mod proposer_config;
mod remote_keys;

pub use remote_keys::validate_signer_url;

use std::sync::Arc;

use alloy::primitives::Address;

use crate::{
    api::routes::Operation,
    error::ApiError,
    keystore::KeystoreDecryptor,
    models::{
        DeleteKeysArgs, DeleteKeysResult, DeleteRemoteKeysArgs, FeeRecipientEntry, GasLimitEntry,
        GraffitiEntry, ImportKeystoresArgs, ImportRemoteKeysArgs, KeyEntry, PubkeyArgs,
        SetFeeRecipientArgs, SetGasLimitArgs, SetGraffitiArgs, SignerDefinition,
    },
    status::{DeleteRemoteStatus, ImportRemoteStatus, ImportStatus, OperationResult},
    storage::{KeymanagerDb, StoreError},
};

/// A typed key manager request, one variant per operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    ListKeys,
    ImportKeystores(ImportKeystoresArgs),
    DeleteKeys(DeleteKeysArgs),
    ListRemoteKeys,
    ImportRemoteKeys(ImportRemoteKeysArgs),
    DeleteRemoteKeys(DeleteRemoteKeysArgs),
    ListFeeRecipient(PubkeyArgs),
    SetFeeRecipient(SetFeeRecipientArgs),
    DeleteFeeRecipient(PubkeyArgs),
    GetGasLimit(PubkeyArgs),
    SetGasLimit(SetGasLimitArgs),
    DeleteGasLimit(PubkeyArgs),
    ListGraffiti(PubkeyArgs),
    SetGraffiti(SetGraffitiArgs),
    DeleteGraffiti(PubkeyArgs),
}

impl Request {
    pub fn operation(&self) -> Operation {
        match self {
            Self::ListKeys => Operation::ListKeys,
            Self::ImportKeystores(_) => Operation::ImportKeystores,
            Self::DeleteKeys(_) => Operation::DeleteKeys,
            Self::ListRemoteKeys => Operation::ListRemoteKeys,
            Self::ImportRemoteKeys(_) => Operation::ImportRemoteKeys,
            Self::DeleteRemoteKeys(_) => Operation::DeleteRemoteKeys,
            Self::ListFeeRecipient(_) => Operation::ListFeeRecipient,
            Self::SetFeeRecipient(_) => Operation::SetFeeRecipient,
            Self::DeleteFeeRecipient(_) => Operation::DeleteFeeRecipient,
            Self::GetGasLimit(_) => Operation::GetGasLimit,
            Self::SetGasLimit(_) => Operation::SetGasLimit,
            Self::DeleteGasLimit(_) => Operation::DeleteGasLimit,
            Self::ListGraffiti(_) => Operation::ListGraffiti,
            Self::SetGraffiti(_) => Operation::SetGraffiti,
            Self::DeleteGraffiti(_) => Operation::DeleteGraffiti,
        }
    }
}

/// A typed key manager result, one variant per operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    ListKeys(Vec<KeyEntry>),
    ImportKeystores(Vec<OperationResult<ImportStatus>>),
    DeleteKeys(DeleteKeysResult),
    ListRemoteKeys(Vec<SignerDefinition>),
    ImportRemoteKeys(Vec<OperationResult<ImportRemoteStatus>>),
    DeleteRemoteKeys(Vec<OperationResult<DeleteRemoteStatus>>),
    ListFeeRecipient(FeeRecipientEntry),
    SetFeeRecipient,
    DeleteFeeRecipient,
    GetGasLimit(GasLimitEntry),
    SetGasLimit,
    DeleteGasLimit,
    ListGraffiti(GraffitiEntry),
    SetGraffiti,
    DeleteGraffiti,
}

impl Response {
    pub fn operation(&self) -> Operation {
        match self {
            Self::ListKeys(_) => Operation::ListKeys,
            Self::ImportKeystores(_) => Operation::ImportKeystores,
            Self::DeleteKeys(_) => Operation::DeleteKeys,
            Self::ListRemoteKeys(_) => Operation::ListRemoteKeys,
            Self::ImportRemoteKeys(_) => Operation::ImportRemoteKeys,
            Self::DeleteRemoteKeys(_) => Operation::DeleteRemoteKeys,
            Self::ListFeeRecipient(_) => Operation::ListFeeRecipient,
            Self::SetFeeRecipient => Operation::SetFeeRecipient,
            Self::DeleteFeeRecipient => Operation::DeleteFeeRecipient,
            Self::GetGasLimit(_) => Operation::GetGasLimit,
            Self::SetGasLimit => Operation::SetGasLimit,
            Self::DeleteGasLimit => Operation::DeleteGasLimit,
            Self::ListGraffiti(_) => Operation::ListGraffiti,
            Self::SetGraffiti => Operation::SetGraffiti,
            Self::DeleteGraffiti => Operation::DeleteGraffiti,
        }
    }
}

/// Values reported when a validator has no override, plus chain identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    pub fee_recipient: Address,
    pub gas_limit: u64,
    pub graffiti: String,
    /// Stamped on exported slashing protection and required on imported.
    pub genesis_validators_root: String,
}

pub struct KeyManager {
    db: Arc<KeymanagerDb>,
    decryptor: Arc<dyn KeystoreDecryptor>,
    defaults: Defaults,
}

impl KeyManager {
    pub fn new(
        db: Arc<KeymanagerDb>,
        decryptor: Arc<dyn KeystoreDecryptor>,
        defaults: Defaults,
    ) -> Self {
        Self {
            db,
            decryptor,
            defaults,
        }
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    /// Run one request to completion.
    pub fn execute(&self, request: Request) -> Result<Response, ApiError> {
        let response = match request {
            Request::ListKeys => Response::ListKeys(self.list_keys()?),
            Request::ImportKeystores(args) => Response::ImportKeystores(self.import_keystores(args)?),
            Request::DeleteKeys(args) => Response::DeleteKeys(self.delete_keys(args)?),
            Request::ListRemoteKeys => Response::ListRemoteKeys(self.list_remote_keys()?),
            Request::ImportRemoteKeys(args) => {
                Response::ImportRemoteKeys(self.import_remote_keys(args))
            }
            Request::DeleteRemoteKeys(args) => {
                Response::DeleteRemoteKeys(self.delete_remote_keys(args))
            }
            Request::ListFeeRecipient(args) => {
                Response::ListFeeRecipient(self.list_fee_recipient(args)?)
            }
            Request::SetFeeRecipient(args) => {
                self.set_fee_recipient(args)?;
                Response::SetFeeRecipient
            }
            Request::DeleteFeeRecipient(args) => {
                self.delete_fee_recipient(args)?;
                Response::DeleteFeeRecipient
            }
            Request::GetGasLimit(args) => Response::GetGasLimit(self.get_gas_limit(args)?),
            Request::SetGasLimit(args) => {
                self.set_gas_limit(args)?;
                Response::SetGasLimit
            }
            Request::DeleteGasLimit(args) => {
                self.delete_gas_limit(args)?;
                Response::DeleteGasLimit
            }
            Request::ListGraffiti(args) => Response::ListGraffiti(self.list_graffiti(args)?),
            Request::SetGraffiti(args) => {
                self.set_graffiti(args)?;
                Response::SetGraffiti
            }
            Request::DeleteGraffiti(args) => {
                self.delete_graffiti(args)?;
                Response::DeleteGraffiti
            }
        };
        Ok(response)
    }
}

/// Map a store failure on a request-level path to an [`ApiError`].
fn store_failure(err: StoreError) -> ApiError {
    match err {
        StoreError::UnknownValidator(pubkey) => {
            ApiError::not_found(format!("validator {pubkey} not found"))
        }
        other => {
            tracing::error!(error = %other, "Key manager store failure");
            ApiError::internal("internal storage error")
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::{
        keystore::{KeystoreError, VerifiedKeystore},
        models::Password,
        storage::interchange::ZERO_GENESIS_VALIDATORS_ROOT,
    };

    /// Accepts keystores of the form `"<pubkey>:<password>"`.
    pub struct FakeDecryptor;

    impl KeystoreDecryptor for FakeDecryptor {
        fn verify(
            &self,
            keystore: &str,
            password: &Password,
        ) -> Result<VerifiedKeystore, KeystoreError> {
            let (pubkey, expected) = keystore
                .split_once(':')
                .ok_or(KeystoreError::InvalidHex("keystore"))?;
            if expected != password.expose() {
                return Err(KeystoreError::IncorrectPassword);
            }
            Ok(VerifiedKeystore {
                pubkey: pubkey.parse().map_err(|_| KeystoreError::InvalidPubkey)?,
                path: Some("m/12381/3600/0/0/0".into()),
            })
        }
    }

    pub fn fake_keystore(pubkey: &crate::models::PubkeyHex, password: &str) -> String {
        format!("{pubkey}:{password}")
    }

    pub fn defaults() -> Defaults {
        Defaults {
            fee_recipient: Address::repeat_byte(0xfe),
            gas_limit: 30_000_000,
            graffiti: "default".into(),
            genesis_validators_root: ZERO_GENESIS_VALIDATORS_ROOT.into(),
        }
    }

    pub fn key_manager() -> (KeyManager, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = KeymanagerDb::open(&dir.path().join("test.redb")).unwrap();
        let manager = KeyManager::new(Arc::new(db), Arc::new(FakeDecryptor), defaults());
        (manager, dir)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{fake_keystore, key_manager};
    use super::*;
    use crate::models::{test_keys::pubkey, Password};

    #[test]
    fn request_and_response_name_the_same_operation() {
        let (manager, _dir) = key_manager();
        let pk = pubkey(1);
        manager
            .execute(Request::ImportKeystores(ImportKeystoresArgs {
                keystores: vec![fake_keystore(&pk, "pw")],
                passwords: vec![Password::new("pw")],
                slashing_protection: None,
            }))
            .unwrap();

        let requests = vec![
            Request::ListKeys,
            Request::ListRemoteKeys,
            Request::ListFeeRecipient(PubkeyArgs { pubkey: pk }),
            Request::SetGasLimit(SetGasLimitArgs {
                pubkey: pk,
                gas_limit: 1,
            }),
            Request::GetGasLimit(PubkeyArgs { pubkey: pk }),
            Request::DeleteGraffiti(PubkeyArgs { pubkey: pk }),
            Request::DeleteKeys(DeleteKeysArgs { pubkeys: vec![pk] }),
        ];
        for request in requests {
            let operation = request.operation();
            let response = manager.execute(request).unwrap();
            assert_eq!(response.operation(), operation);
        }
    }
}
