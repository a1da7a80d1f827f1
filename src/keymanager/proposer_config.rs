// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-validator fee recipient, gas limit and graffiti overrides.
//!
//! Reads fall back to the configured default. Reads and writes for a pubkey
//! that is neither a local key nor a remote signer are 404s; deletes always
//! succeed.

use super::{store_failure, KeyManager};
use crate::{
    error::ApiError,
    models::{
        FeeRecipientEntry, GasLimitEntry, GraffitiEntry, PubkeyArgs, PubkeyHex,
        SetFeeRecipientArgs, SetGasLimitArgs, SetGraffitiArgs,
    },
};

impl KeyManager {
    fn ensure_known(&self, pubkey: &PubkeyHex) -> Result<(), ApiError> {
        if self.db.is_known_validator(pubkey).map_err(store_failure)? {
            Ok(())
        } else {
            Err(ApiError::not_found(format!("validator {pubkey} not found")))
        }
    }

    // =========================================================================
    // Fee recipient
    // =========================================================================

    pub fn list_fee_recipient(&self, args: PubkeyArgs) -> Result<FeeRecipientEntry, ApiError> {
        self.ensure_known(&args.pubkey)?;
        let ethaddress = self
            .db
            .fee_recipient(&args.pubkey)
            .map_err(store_failure)?
            .unwrap_or(self.defaults.fee_recipient);
        Ok(FeeRecipientEntry {
            pubkey: args.pubkey,
            ethaddress,
        })
    }

    pub fn set_fee_recipient(&self, args: SetFeeRecipientArgs) -> Result<(), ApiError> {
        self.db
            .set_fee_recipient(&args.pubkey, &args.ethaddress)
            .map_err(store_failure)?;
        tracing::info!(pubkey = %args.pubkey, ethaddress = %args.ethaddress, "Fee recipient set");
        Ok(())
    }

    pub fn delete_fee_recipient(&self, args: PubkeyArgs) -> Result<(), ApiError> {
        self.db
            .delete_fee_recipient(&args.pubkey)
            .map_err(store_failure)
    }

    // =========================================================================
    // Gas limit
    // =========================================================================

    pub fn get_gas_limit(&self, args: PubkeyArgs) -> Result<GasLimitEntry, ApiError> {
        self.ensure_known(&args.pubkey)?;
        let gas_limit = self
            .db
            .gas_limit(&args.pubkey)
            .map_err(store_failure)?
            .unwrap_or(self.defaults.gas_limit);
        Ok(GasLimitEntry {
            pubkey: args.pubkey,
            gas_limit,
        })
    }

    pub fn set_gas_limit(&self, args: SetGasLimitArgs) -> Result<(), ApiError> {
        self.db
            .set_gas_limit(&args.pubkey, args.gas_limit)
            .map_err(store_failure)?;
        tracing::info!(pubkey = %args.pubkey, gas_limit = args.gas_limit, "Gas limit set");
        Ok(())
    }

    pub fn delete_gas_limit(&self, args: PubkeyArgs) -> Result<(), ApiError> {
        self.db.delete_gas_limit(&args.pubkey).map_err(store_failure)
    }

    // =========================================================================
    // Graffiti
    // =========================================================================

    pub fn list_graffiti(&self, args: PubkeyArgs) -> Result<GraffitiEntry, ApiError> {
        self.ensure_known(&args.pubkey)?;
        let graffiti = self
            .db
            .graffiti(&args.pubkey)
            .map_err(store_failure)?
            .unwrap_or_else(|| self.defaults.graffiti.clone());
        Ok(GraffitiEntry {
            pubkey: args.pubkey,
            graffiti,
        })
    }

    pub fn set_graffiti(&self, args: SetGraffitiArgs) -> Result<(), ApiError> {
        self.db
            .set_graffiti(&args.pubkey, &args.graffiti)
            .map_err(store_failure)?;
        tracing::info!(pubkey = %args.pubkey, "Graffiti set");
        Ok(())
    }

    pub fn delete_graffiti(&self, args: PubkeyArgs) -> Result<(), ApiError> {
        self.db.delete_graffiti(&args.pubkey).map_err(store_failure)
    }
}
