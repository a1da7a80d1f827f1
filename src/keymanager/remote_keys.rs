// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Remote signer references.

use url::Url;

use super::{store_failure, KeyManager};
use crate::{
    error::ApiError,
    models::{DeleteRemoteKeysArgs, ImportRemoteKeysArgs, SignerDefinition},
    status::{DeleteRemoteStatus, ImportRemoteStatus, OperationResult},
    storage::{DeleteSignerOutcome, InsertOutcome},
};

/// A signer URL must be an absolute http(s) URL with a host.
pub fn validate_signer_url(input: &str) -> Result<Url, String> {
    let url = Url::parse(input).map_err(|e| format!("invalid signer url: {e}"))?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        "http" | "https" => Err("signer url has no host".to_string()),
        other => Err(format!("unsupported signer url scheme: {other}")),
    }
}

/// Signer URL with any userinfo removed, for logging.
fn redacted_signer_url(url: &Url) -> Url {
    let mut url = url.clone();
    // Only fails for cannot-be-a-base URLs, which validation already rejects.
    let _ = url.set_password(None);
    let _ = url.set_username("");
    url
}

impl KeyManager {
    pub fn list_remote_keys(&self) -> Result<Vec<SignerDefinition>, ApiError> {
        self.db.list_remote_signers().map_err(store_failure)
    }

    pub fn import_remote_keys(
        &self,
        args: ImportRemoteKeysArgs,
    ) -> Vec<OperationResult<ImportRemoteStatus>> {
        args.remote_keys
            .iter()
            .map(|remote| {
                let url = match validate_signer_url(&remote.url) {
                    Ok(url) => url,
                    Err(reason) => return OperationResult::error(reason),
                };
                match self.db.insert_remote_signer(&remote.pubkey, &remote.url, false) {
                    Ok(InsertOutcome::Inserted) => {
                        tracing::info!(
                            pubkey = %remote.pubkey,
                            url = %redacted_signer_url(&url),
                            "Imported remote signer"
                        );
                        OperationResult::new(ImportRemoteStatus::Imported)
                    }
                    Ok(InsertOutcome::Duplicate) => {
                        OperationResult::new(ImportRemoteStatus::Duplicate)
                    }
                    Err(e) => {
                        tracing::error!(pubkey = %remote.pubkey, error = %e, "Remote signer import failed");
                        OperationResult::error(e.to_string())
                    }
                }
            })
            .collect()
    }

    pub fn delete_remote_keys(
        &self,
        args: DeleteRemoteKeysArgs,
    ) -> Vec<OperationResult<DeleteRemoteStatus>> {
        args.pubkeys
            .iter()
            .map(|pubkey| match self.db.delete_remote_signer(pubkey) {
                Ok(DeleteSignerOutcome::Deleted) => {
                    tracing::info!(pubkey = %pubkey, "Deleted remote signer");
                    OperationResult::new(DeleteRemoteStatus::Deleted)
                }
                Ok(DeleteSignerOutcome::NotFound) => {
                    OperationResult::new(DeleteRemoteStatus::NotFound)
                }
                Ok(DeleteSignerOutcome::ReadOnly) => {
                    OperationResult::error("remote signer is read-only")
                }
                Err(e) => {
                    tracing::error!(pubkey = %pubkey, error = %e, "Remote signer delete failed");
                    OperationResult::error(e.to_string())
                }
            })
            .collect()
    }
}
