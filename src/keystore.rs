// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Keystore Verification
//!
//! Imports need two things from a keystore: the pubkey it belongs to and
//! proof that the supplied password unlocks it. [`Eip2335Verifier`] gets the
//! proof from the EIP-2335 checksum, which is derived from the same key as
//! the cipher, so the secret itself is never decrypted.
//!
//! Both EIP-2335 KDFs are supported: `scrypt` (the default emitted by
//! deposit tooling) and `pbkdf2` with HMAC-SHA256.

use std::num::NonZeroU32;

use ring::pbkdf2;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;

use crate::models::{Password, PubkeyHex};

/// EIP-2335 keystore version.
pub const KEYSTORE_VERSION: u32 = 4;

const SCRYPT_FUNCTION: &str = "scrypt";
const PBKDF2_FUNCTION: &str = "pbkdf2";
const PBKDF2_PRF: &str = "hmac-sha256";
const CHECKSUM_FUNCTION: &str = "sha256";
const DERIVED_KEY_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum KeystoreError {
    #[error("malformed keystore: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unsupported keystore version {0}")]
    UnsupportedVersion(u32),

    #[error("unsupported kdf: {0}")]
    UnsupportedKdf(String),

    #[error("unsupported checksum function: {0}")]
    UnsupportedChecksum(String),

    #[error("invalid kdf parameters: {0}")]
    InvalidKdfParams(&'static str),

    #[error("invalid hex in {0}")]
    InvalidHex(&'static str),

    #[error("keystore pubkey is not a 48-byte key")]
    InvalidPubkey,

    #[error("incorrect password")]
    IncorrectPassword,
}

/// What an import learns from a keystore whose password checked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedKeystore {
    pub pubkey: PubkeyHex,
    pub path: Option<String>,
}

/// Checks keystore passwords. Implementations may be slow (KDFs); callers run
/// them off the async runtime.
pub trait KeystoreDecryptor: Send + Sync {
    fn verify(&self, keystore: &str, password: &Password) -> Result<VerifiedKeystore, KeystoreError>;
}

// =============================================================================
// EIP-2335
// =============================================================================

#[derive(Debug, Deserialize)]
struct Keystore {
    crypto: Crypto,
    pubkey: String,
    #[serde(default)]
    path: Option<String>,
    version: u32,
}

#[derive(Debug, Deserialize)]
struct Crypto {
    kdf: Module<serde_json::Value>,
    checksum: Module<serde_json::Value>,
    cipher: Module<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Module<P> {
    function: String,
    params: P,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ScryptParams {
    dklen: usize,
    n: u64,
    r: u32,
    p: u32,
    salt: String,
}

#[derive(Debug, Deserialize)]
struct Pbkdf2Params {
    dklen: usize,
    c: u32,
    prf: String,
    salt: String,
}

/// Verifies EIP-2335 keystores through their checksum.
#[derive(Debug, Clone, Copy, Default)]
pub struct Eip2335Verifier;

impl KeystoreDecryptor for Eip2335Verifier {
    fn verify(&self, keystore: &str, password: &Password) -> Result<VerifiedKeystore, KeystoreError> {
        let keystore: Keystore = serde_json::from_str(keystore)?;
        if keystore.version != KEYSTORE_VERSION {
            return Err(KeystoreError::UnsupportedVersion(keystore.version));
        }

        let crypto = &keystore.crypto;
        if crypto.checksum.function != CHECKSUM_FUNCTION {
            return Err(KeystoreError::UnsupportedChecksum(
                crypto.checksum.function.clone(),
            ));
        }

        let derived = derive_from_kdf(&crypto.kdf, &normalize_password(password))?;
        let cipher_message = decode_hex(&crypto.cipher.message, "cipher.message")?;
        let expected = decode_hex(&crypto.checksum.message, "checksum.message")?;
        if checksum(&derived, &cipher_message).as_slice() != expected.as_slice() {
            return Err(KeystoreError::IncorrectPassword);
        }

        let pubkey = decode_hex(&keystore.pubkey, "pubkey")?;
        let pubkey = pubkey
            .as_slice()
            .try_into()
            .map(PubkeyHex::from_bytes)
            .map_err(|_| KeystoreError::InvalidPubkey)?;

        Ok(VerifiedKeystore {
            pubkey,
            path: keystore.path.filter(|path| !path.is_empty()),
        })
    }
}

/// NFKD-normalize the password and drop control codes (C0, C1, DEL).
fn normalize_password(password: &Password) -> Vec<u8> {
    password
        .expose()
        .nfkd()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .into_bytes()
}

fn derive_from_kdf(
    kdf: &Module<serde_json::Value>,
    password: &[u8],
) -> Result<[u8; DERIVED_KEY_LEN], KeystoreError> {
    match kdf.function.as_str() {
        SCRYPT_FUNCTION => {
            let params: ScryptParams = serde_json::from_value(kdf.params.clone())?;
            if params.dklen != DERIVED_KEY_LEN {
                return Err(KeystoreError::InvalidKdfParams("dklen must be 32"));
            }
            if params.n < 2 || !params.n.is_power_of_two() {
                return Err(KeystoreError::InvalidKdfParams("n must be a power of two"));
            }
            let log_n = u8::try_from(params.n.trailing_zeros())
                .map_err(|_| KeystoreError::InvalidKdfParams("n is too large"))?;
            let salt = decode_hex(&params.salt, "kdf.params.salt")?;
            scrypt_derive_key(log_n, params.r, params.p, &salt, password)
        }
        PBKDF2_FUNCTION => {
            let params: Pbkdf2Params = serde_json::from_value(kdf.params.clone())?;
            if params.prf != PBKDF2_PRF {
                return Err(KeystoreError::UnsupportedKdf(format!("pbkdf2/{}", params.prf)));
            }
            if params.dklen != DERIVED_KEY_LEN {
                return Err(KeystoreError::InvalidKdfParams("dklen must be 32"));
            }
            let iterations = NonZeroU32::new(params.c)
                .ok_or(KeystoreError::InvalidKdfParams("c must be positive"))?;
            let salt = decode_hex(&params.salt, "kdf.params.salt")?;
            Ok(derive_key(iterations, &salt, password))
        }
        other => Err(KeystoreError::UnsupportedKdf(other.to_string())),
    }
}

fn scrypt_derive_key(
    log_n: u8,
    r: u32,
    p: u32,
    salt: &[u8],
    password: &[u8],
) -> Result<[u8; DERIVED_KEY_LEN], KeystoreError> {
    let params = scrypt::Params::new(log_n, r, p, DERIVED_KEY_LEN)
        .map_err(|_| KeystoreError::InvalidKdfParams("scrypt parameters out of range"))?;
    let mut derived = [0u8; DERIVED_KEY_LEN];
    scrypt::scrypt(password, salt, &params, &mut derived)
        .map_err(|_| KeystoreError::InvalidKdfParams("scrypt output length"))?;
    Ok(derived)
}

fn derive_key(iterations: NonZeroU32, salt: &[u8], password: &[u8]) -> [u8; DERIVED_KEY_LEN] {
    let mut derived = [0u8; DERIVED_KEY_LEN];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        salt,
        password,
        &mut derived,
    );
    derived
}

/// `SHA-256(derived_key[16..32] || cipher.message)`
fn checksum(derived: &[u8; DERIVED_KEY_LEN], cipher_message: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(&derived[16..]);
    hasher.update(cipher_message);
    hasher.finalize().into()
}

fn decode_hex(input: &str, field: &'static str) -> Result<Vec<u8>, KeystoreError> {
    alloy::hex::decode(input).map_err(|_| KeystoreError::InvalidHex(field))
}
