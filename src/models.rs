// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Key Manager Data Models
//!
//! Typed arguments and results of the key manager operations. In their typed
//! JSON form every field is camelCase; the wire codec translates names to the
//! snake_case convention used on the HTTP surface.
//!
//! ## Validator Public Key
//!
//! The [`PubkeyHex`] newtype wraps a 48-byte BLS public key. It is parsed from
//! `0x`-prefixed hex in any letter case and always printed in lowercase, so
//! two spellings of the same key compare equal.

use std::{fmt, str::FromStr};

use alloy::primitives::{Address, FixedBytes};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::{
    status::{DeleteStatus, OperationResult},
    validation::ValidationError,
};

/// Length of a compressed BLS12-381 public key.
pub const PUBKEY_LENGTH: usize = 48;

// =============================================================================
// Validator Public Key
// =============================================================================

/// A validator's BLS public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PubkeyHex(FixedBytes<PUBKEY_LENGTH>);

impl PubkeyHex {
    pub fn from_bytes(bytes: [u8; PUBKEY_LENGTH]) -> Self {
        Self(FixedBytes::from(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; PUBKEY_LENGTH] {
        &self.0 .0
    }
}

impl fmt::Display for PubkeyHex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&alloy::hex::encode_prefixed(self.0))
    }
}

impl FromStr for PubkeyHex {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| ValidationError::InvalidPubkey(format!("missing 0x prefix: {s}")))?;
        let bytes = alloy::hex::decode(digits)
            .map_err(|e| ValidationError::InvalidPubkey(format!("{s}: {e}")))?;
        let bytes: [u8; PUBKEY_LENGTH] = bytes.as_slice().try_into().map_err(|_| {
            ValidationError::InvalidPubkey(format!(
                "expected {PUBKEY_LENGTH} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self::from_bytes(bytes))
    }
}

impl TryFrom<String> for PubkeyHex {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PubkeyHex> for String {
    fn from(value: PubkeyHex) -> Self {
        value.to_string()
    }
}

// =============================================================================
// Keystore Import Inputs
// =============================================================================

/// Keystore unlock password. Never printed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// An encrypted keystore paired with its password. Request-scoped.
#[derive(Debug, Clone)]
pub struct KeystoreRecord {
    pub keystore: String,
    pub password: Password,
}

// =============================================================================
// Listed Entries
// =============================================================================

/// A local signing key as reported by `listKeys`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeyEntry {
    #[schema(value_type = String)]
    pub validating_pubkey: PubkeyHex,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derivation_path: Option<String>,
    pub readonly: bool,
}

/// A remote signer reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignerDefinition {
    #[schema(value_type = String)]
    pub pubkey: PubkeyHex,
    pub url: String,
    pub readonly: bool,
}

/// Fee recipient in effect for a validator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeeRecipientEntry {
    #[schema(value_type = String)]
    pub pubkey: PubkeyHex,
    #[schema(value_type = String)]
    pub ethaddress: Address,
}

/// Gas limit in effect for a validator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GasLimitEntry {
    #[schema(value_type = String)]
    pub pubkey: PubkeyHex,
    /// Rendered as a decimal string on the wire.
    #[serde(deserialize_with = "u64_string_or_native")]
    #[schema(value_type = String)]
    pub gas_limit: u64,
}

/// Serialized size of [`GasLimitEntry`] in its fixed binary layout.
pub const GAS_LIMIT_ENTRY_SSZ_LEN: usize = PUBKEY_LENGTH + 8;

impl GasLimitEntry {
    /// Fixed layout: `pubkey (48 bytes) || gas_limit (u64 little-endian)`.
    pub fn to_ssz_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(GAS_LIMIT_ENTRY_SSZ_LEN);
        bytes.extend_from_slice(self.pubkey.as_bytes());
        bytes.extend_from_slice(&self.gas_limit.to_le_bytes());
        bytes
    }

    pub fn from_ssz_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != GAS_LIMIT_ENTRY_SSZ_LEN {
            return None;
        }
        let (pubkey, gas_limit) = bytes.split_at(PUBKEY_LENGTH);
        Some(Self {
            pubkey: PubkeyHex::from_bytes(pubkey.try_into().ok()?),
            gas_limit: u64::from_le_bytes(gas_limit.try_into().ok()?),
        })
    }
}

/// Graffiti in effect for a validator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GraffitiEntry {
    #[schema(value_type = String)]
    pub pubkey: PubkeyHex,
    pub graffiti: String,
}

/// Accept a `u64` written either as a JSON number or as a decimal string.
fn u64_string_or_native<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNative {
        Native(u64),
        String(String),
    }

    match StringOrNative::deserialize(deserializer)? {
        StringOrNative::Native(value) => Ok(value),
        StringOrNative::String(value) => value.parse().map_err(serde::de::Error::custom),
    }
}

// =============================================================================
// Operation Arguments
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImportKeystoresArgs {
    pub keystores: Vec<String>,
    pub passwords: Vec<Password>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slashing_protection: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteKeysArgs {
    pub pubkeys: Vec<PubkeyHex>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteKeyArgs {
    pub pubkey: PubkeyHex,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImportRemoteKeysArgs {
    pub remote_keys: Vec<RemoteKeyArgs>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRemoteKeysArgs {
    pub pubkeys: Vec<PubkeyHex>,
}

/// Arguments of the single-validator read and delete operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PubkeyArgs {
    pub pubkey: PubkeyHex,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SetFeeRecipientArgs {
    pub pubkey: PubkeyHex,
    pub ethaddress: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SetGasLimitArgs {
    pub pubkey: PubkeyHex,
    pub gas_limit: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SetGraffitiArgs {
    pub pubkey: PubkeyHex,
    pub graffiti: String,
}

// =============================================================================
// Operation Results
// =============================================================================

/// Result of `deleteKeys`.
///
/// `slashing_protection` is an interchange document holding the records of
/// every item whose status is `deleted` or `not_active`, in input order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteKeysResult {
    #[schema(inline)]
    pub data: Vec<OperationResult<DeleteStatus>>,
    pub slashing_protection: String,
}

#[cfg(test)]
pub(crate) mod test_keys {
    use super::PubkeyHex;

    /// Deterministic pubkey whose bytes are all `byte`.
    pub fn pubkey(byte: u8) -> PubkeyHex {
        PubkeyHex::from_bytes([byte; super::PUBKEY_LENGTH])
    }
}
