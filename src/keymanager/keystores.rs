// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Local keystores: list, import, delete.

use super::{store_failure, KeyManager};
use crate::{
    error::ApiError,
    models::{DeleteKeysArgs, DeleteKeysResult, ImportKeystoresArgs, KeyEntry, KeystoreRecord},
    status::{DeleteStatus, ImportStatus, OperationResult},
    storage::{
        interchange::Interchange, DeleteKeyOutcome, InsertOutcome, NewKeystore, ValidatorRecord,
    },
};

impl KeyManager {
    pub fn list_keys(&self) -> Result<Vec<KeyEntry>, ApiError> {
        self.db.list_keys().map_err(store_failure)
    }

    /// Import keystores in input order.
    ///
    /// Mismatched input lengths and unusable slashing protection data fail the
    /// whole request before any keystore is looked at.
    pub fn import_keystores(
        &self,
        args: ImportKeystoresArgs,
    ) -> Result<Vec<OperationResult<ImportStatus>>, ApiError> {
        if args.keystores.len() != args.passwords.len() {
            return Err(ApiError::bad_request(format!(
                "{} keystores but {} passwords",
                args.keystores.len(),
                args.passwords.len()
            )));
        }

        let ImportKeystoresArgs {
            keystores,
            passwords,
            slashing_protection,
        } = args;

        let interchange = slashing_protection
            .as_deref()
            .map(|json| Interchange::parse(json, &self.defaults.genesis_validators_root))
            .transpose()
            .map_err(|e| ApiError::bad_request(e.to_string()))?;

        let records: Vec<KeystoreRecord> = keystores
            .into_iter()
            .zip(passwords)
            .map(|(keystore, password)| KeystoreRecord { keystore, password })
            .collect();

        let results = records
            .iter()
            .map(|record| {
                let verified = match self.decryptor.verify(&record.keystore, &record.password) {
                    Ok(verified) => verified,
                    Err(e) => {
                        tracing::warn!(error = %e, "Keystore rejected");
                        return OperationResult::error(e.to_string());
                    }
                };

                let pubkey = verified.pubkey;
                let new = NewKeystore {
                    pubkey,
                    keystore: &record.keystore,
                    derivation_path: verified.path,
                    slashing_protection: interchange
                        .as_ref()
                        .and_then(|interchange| interchange.record_for(&pubkey)),
                };

                match self.db.insert_keystore(new) {
                    Ok(InsertOutcome::Inserted) => {
                        tracing::info!(pubkey = %pubkey, "Imported keystore");
                        OperationResult::new(ImportStatus::Imported)
                    }
                    Ok(InsertOutcome::Duplicate) => OperationResult::new(ImportStatus::Duplicate),
                    Err(e) => {
                        tracing::error!(pubkey = %pubkey, error = %e, "Keystore import failed");
                        OperationResult::error(e.to_string())
                    }
                }
            })
            .collect();

        Ok(results)
    }

    /// Disable keys and return their slashing protection history.
    ///
    /// Each key is handled in its own store transaction: signing is disabled
    /// first, then the retained record is read. The exported document holds
    /// the records of every `deleted` and `not_active` item, in input order.
    pub fn delete_keys(&self, args: DeleteKeysArgs) -> Result<DeleteKeysResult, ApiError> {
        let mut records: Vec<ValidatorRecord> = Vec::new();
        let mut data = Vec::with_capacity(args.pubkeys.len());

        for pubkey in &args.pubkeys {
            let (result, record) = match self.db.delete_keystore(pubkey) {
                Ok(DeleteKeyOutcome::Deleted(record)) => {
                    tracing::info!(pubkey = %pubkey, "Deleted keystore");
                    (OperationResult::new(DeleteStatus::Deleted), Some(record))
                }
                Ok(DeleteKeyOutcome::NotActive(record)) => {
                    (OperationResult::new(DeleteStatus::NotActive), Some(record))
                }
                Ok(DeleteKeyOutcome::NotFound) => (OperationResult::new(DeleteStatus::NotFound), None),
                Err(e) => {
                    tracing::error!(pubkey = %pubkey, error = %e, "Keystore delete failed");
                    (OperationResult::error(e.to_string()), None)
                }
            };
            if result.status.carries_slashing_protection() {
                records.extend(record);
            }
            data.push(result);
        }

        let slashing_protection =
            Interchange::new(self.defaults.genesis_validators_root.clone(), records)
                .to_json_string()
                .map_err(|e| ApiError::internal(format!("Failed to export slashing protection: {e}")))?;

        Ok(DeleteKeysResult {
            data,
            slashing_protection,
        })
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::super::test_support::{fake_keystore, key_manager};
    use crate::{
        models::{test_keys::pubkey, DeleteKeysArgs, ImportKeystoresArgs, Password, PubkeyHex},
        status::{DeleteStatus, ImportStatus, OperationResult},
        storage::interchange::{Interchange, ZERO_GENESIS_VALIDATORS_ROOT},
    };

    fn import_args(keys: &[(PubkeyHex, &str)]) -> ImportKeystoresArgs {
        ImportKeystoresArgs {
            keystores: keys.iter().map(|(pk, pw)| fake_keystore(pk, pw)).collect(),
            passwords: keys.iter().map(|(_, pw)| Password::new(*pw)).collect(),
            slashing_protection: None,
        }
    }

    fn slashing_json(pubkey: &PubkeyHex, slot: &str) -> String {
        json!({
            "metadata": {
                "interchange_format_version": "5",
                "genesis_validators_root": ZERO_GENESIS_VALIDATORS_ROOT
            },
            "data": [{
                "pubkey": pubkey.to_string(),
                "signed_blocks": [{ "slot": slot }],
                "signed_attestations": []
            }]
        })
        .to_string()
    }

    #[test]
    fn import_reports_duplicates_and_imports_in_order() {
        let (manager, _dir) = key_manager();
        let (a, b) = (pubkey(0xa1), pubkey(0xb2));
        manager.import_keystores(import_args(&[(a, "pa")])).unwrap();

        let results = manager
            .import_keystores(import_args(&[(a, "pa"), (b, "pb")]))
            .unwrap();
        assert_eq!(
            results,
            vec![
                OperationResult::new(ImportStatus::Duplicate),
                OperationResult::new(ImportStatus::Imported),
            ]
        );

        let keys = manager.list_keys().unwrap();
        let listed: Vec<_> = keys.iter().map(|k| k.validating_pubkey).collect();
        assert_eq!(listed, vec![a, b]);
    }

    #[test]
    fn supplied_history_lands_on_the_newly_imported_key() {
        let (manager, _dir) = key_manager();
        let (a, b) = (pubkey(0xa3), pubkey(0xb4));
        manager.import_keystores(import_args(&[(a, "pa")])).unwrap();

        let interchange = json!({
            "metadata": {
                "interchange_format_version": "5",
                "genesis_validators_root": ZERO_GENESIS_VALIDATORS_ROOT
            },
            "data": [
                {
                    "pubkey": a.to_string(),
                    "signed_blocks": [{ "slot": "11" }],
                    "signed_attestations": []
                },
                {
                    "pubkey": b.to_string(),
                    "signed_blocks": [{ "slot": "22" }],
                    "signed_attestations": [{ "source_epoch": "3", "target_epoch": "4" }]
                }
            ]
        })
        .to_string();
        let mut args = import_args(&[(a, "pa"), (b, "pb")]);
        args.slashing_protection = Some(interchange);

        let results = manager.import_keystores(args).unwrap();
        assert_eq!(
            results,
            vec![
                OperationResult::new(ImportStatus::Duplicate),
                OperationResult::new(ImportStatus::Imported),
            ]
        );

        let result = manager
            .delete_keys(DeleteKeysArgs { pubkeys: vec![b] })
            .unwrap();
        assert_eq!(result.data, vec![OperationResult::new(DeleteStatus::Deleted)]);
        let exported =
            Interchange::parse(&result.slashing_protection, ZERO_GENESIS_VALIDATORS_ROOT).unwrap();
        assert_eq!(exported.data.len(), 1);
        assert_eq!(exported.data[0].pubkey, b);
        let slots: Vec<_> = exported.data[0].signed_blocks.iter().map(|block| block.slot).collect();
        assert_eq!(slots, vec![22]);
        assert_eq!(exported.data[0].signed_attestations.len(), 1);

        // The duplicate item wrote nothing: A keeps the empty record from its first import.
        let result = manager
            .delete_keys(DeleteKeysArgs { pubkeys: vec![a] })
            .unwrap();
        let exported =
            Interchange::parse(&result.slashing_protection, ZERO_GENESIS_VALIDATORS_ROOT).unwrap();
        assert!(exported.data[0].signed_blocks.is_empty());
    }

    #[test]
    fn same_key_twice_in_one_request_is_a_duplicate() {
        let (manager, _dir) = key_manager();
        let a = pubkey(3);
        let results = manager
            .import_keystores(import_args(&[(a, "x"), (a, "x")]))
            .unwrap();
        assert_eq!(results[0].status, ImportStatus::Imported);
        assert_eq!(results[1].status, ImportStatus::Duplicate);
    }

    #[test]
    fn bad_password_fails_only_that_item() {
        let (manager, _dir) = key_manager();
        let (a, b) = (pubkey(4), pubkey(5));
        let mut args = import_args(&[(a, "right"), (b, "pb")]);
        args.passwords[0] = Password::new("wrong");

        let results = manager.import_keystores(args).unwrap();
        assert_eq!(results[0].status, ImportStatus::Error);
        assert_eq!(results[0].message.as_deref(), Some("incorrect password"));
        assert_eq!(results[1].status, ImportStatus::Imported);
    }

    #[test]
    fn request_level_failures_touch_nothing() {
        let (manager, _dir) = key_manager();
        let a = pubkey(6);

        let mut uneven = import_args(&[(a, "pa")]);
        uneven.passwords.push(Password::new("extra"));
        let err = manager.import_keystores(uneven).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let mut bad_interchange = import_args(&[(a, "pa")]);
        bad_interchange.slashing_protection = Some("{\"metadata\":".into());
        let err = manager.import_keystores(bad_interchange).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        assert!(manager.list_keys().unwrap().is_empty());
    }

    #[test]
    fn empty_import_is_an_empty_result() {
        let (manager, _dir) = key_manager();
        assert!(manager.import_keystores(import_args(&[])).unwrap().is_empty());
    }

    #[test]
    fn delete_returns_records_only_for_deleted_and_not_active() {
        let (manager, _dir) = key_manager();
        let (a, b) = (pubkey(0x0a), pubkey(0x0b));
        let mut args = import_args(&[(a, "pa")]);
        args.slashing_protection = Some(slashing_json(&a, "81952"));
        manager.import_keystores(args).unwrap();

        let result = manager
            .delete_keys(DeleteKeysArgs {
                pubkeys: vec![a, b],
            })
            .unwrap();
        assert_eq!(
            result.data,
            vec![
                OperationResult::new(DeleteStatus::Deleted),
                OperationResult::new(DeleteStatus::NotFound),
            ]
        );

        let exported =
            Interchange::parse(&result.slashing_protection, ZERO_GENESIS_VALIDATORS_ROOT).unwrap();
        assert_eq!(exported.data.len(), 1);
        assert_eq!(exported.data[0].pubkey, a);
        assert_eq!(exported.data[0].signed_blocks[0].slot, 81952);
        assert!(manager.list_keys().unwrap().is_empty());
    }

    #[test]
    fn repeated_delete_is_not_active_with_the_same_history() {
        let (manager, _dir) = key_manager();
        let a = pubkey(0x0c);
        let mut args = import_args(&[(a, "pa")]);
        args.slashing_protection = Some(slashing_json(&a, "7"));
        manager.import_keystores(args).unwrap();

        let first = manager
            .delete_keys(DeleteKeysArgs { pubkeys: vec![a] })
            .unwrap();
        let second = manager
            .delete_keys(DeleteKeysArgs { pubkeys: vec![a] })
            .unwrap();

        assert_eq!(second.data, vec![OperationResult::new(DeleteStatus::NotActive)]);
        assert_eq!(first.slashing_protection, second.slashing_protection);
    }

    #[test]
    fn delete_of_unknown_keys_exports_an_empty_document() {
        let (manager, _dir) = key_manager();
        let result = manager
            .delete_keys(DeleteKeysArgs {
                pubkeys: vec![pubkey(0x0d)],
            })
            .unwrap();
        assert_eq!(result.data[0].status, DeleteStatus::NotFound);
        let exported =
            Interchange::parse(&result.slashing_protection, ZERO_GENESIS_VALIDATORS_ROOT).unwrap();
        assert!(exported.data.is_empty());
    }

    #[test]
    fn keys_imported_without_history_still_export_a_record() {
        let (manager, _dir) = key_manager();
        let a = pubkey(0x0e);
        manager.import_keystores(import_args(&[(a, "pa")])).unwrap();
        let result = manager
            .delete_keys(DeleteKeysArgs { pubkeys: vec![a] })
            .unwrap();
        let exported =
            Interchange::parse(&result.slashing_protection, ZERO_GENESIS_VALIDATORS_ROOT).unwrap();
        assert_eq!(exported.data.len(), 1);
        assert!(exported.data[0].signed_blocks.is_empty());
    }
}
