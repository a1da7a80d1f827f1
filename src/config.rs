// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `KEYMANAGER_HOST` | Server bind address | `127.0.0.1` |
//! | `KEYMANAGER_PORT` | Server bind port | `5062` |
//! | `DATA_DIR` | Directory holding the database and token file | `./keymanager-data` |
//! | `KEYMANAGER_TOKEN_FILE` | Bearer token file | `$DATA_DIR/api-token.txt` |
//! | `KEYMANAGER_AUTH_DISABLED` | Serve without bearer authentication | `false` |
//! | `KEYMANAGER_CORS_ORIGIN` | Allowed browser origin | none |
//! | `KEYMANAGER_TLS_CERT` / `KEYMANAGER_TLS_KEY` | PEM certificate chain and key | plain HTTP |
//! | `DEFAULT_FEE_RECIPIENT` | Fee recipient without override | zero address |
//! | `DEFAULT_GAS_LIMIT` | Gas limit without override | `30000000` |
//! | `DEFAULT_GRAFFITI` | Graffiti without override | empty |
//! | `GENESIS_VALIDATORS_ROOT` | Chain of the slashing protection data | all zeroes |
//! | `READONLY_REMOTE_SIGNERS` | `pubkey=url` pairs, comma separated | none |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{env, path::PathBuf, str::FromStr};

use alloy::primitives::{Address, B256};
use serde_json::Value;

use crate::{
    keymanager::{validate_signer_url, Defaults},
    models::PubkeyHex,
    storage::interchange::ZERO_GENESIS_VALIDATORS_ROOT,
    validation::{parse_gas_limit, parse_graffiti, GRAFFITI_MAX_BYTES},
};

pub const HOST_ENV: &str = "KEYMANAGER_HOST";
pub const PORT_ENV: &str = "KEYMANAGER_PORT";
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const TOKEN_FILE_ENV: &str = "KEYMANAGER_TOKEN_FILE";
pub const AUTH_DISABLED_ENV: &str = "KEYMANAGER_AUTH_DISABLED";
pub const CORS_ORIGIN_ENV: &str = "KEYMANAGER_CORS_ORIGIN";
pub const TLS_CERT_ENV: &str = "KEYMANAGER_TLS_CERT";
pub const TLS_KEY_ENV: &str = "KEYMANAGER_TLS_KEY";
pub const DEFAULT_FEE_RECIPIENT_ENV: &str = "DEFAULT_FEE_RECIPIENT";
pub const DEFAULT_GAS_LIMIT_ENV: &str = "DEFAULT_GAS_LIMIT";
pub const DEFAULT_GRAFFITI_ENV: &str = "DEFAULT_GRAFFITI";
pub const GENESIS_VALIDATORS_ROOT_ENV: &str = "GENESIS_VALIDATORS_ROOT";
pub const READONLY_REMOTE_SIGNERS_ENV: &str = "READONLY_REMOTE_SIGNERS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5062;
pub const DEFAULT_DATA_DIR: &str = "./keymanager-data";
pub const TOKEN_FILE_NAME: &str = "api-token.txt";
pub const DEFAULT_GAS_LIMIT: u64 = 30_000_000;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("{TLS_CERT_ENV} and {TLS_KEY_ENV} must be set together")]
    IncompleteTls,
}

fn invalid(var: &'static str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        var,
        reason: reason.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub token_file: PathBuf,
    pub auth_disabled: bool,
    pub cors_origin: Option<String>,
    pub tls: Option<TlsPaths>,
    pub defaults: Defaults,
    pub readonly_remote_signers: Vec<(PubkeyHex, String)>,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());

        let port = match get(PORT_ENV) {
            Some(port) => port.trim().parse().map_err(|e| invalid(PORT_ENV, e))?,
            None => DEFAULT_PORT,
        };

        let data_dir = PathBuf::from(get(DATA_DIR_ENV).unwrap_or_else(|| DEFAULT_DATA_DIR.into()));
        let token_file = get(TOKEN_FILE_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(TOKEN_FILE_NAME));

        let tls = match (get(TLS_CERT_ENV), get(TLS_KEY_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteTls),
        };

        let log_format = match get(LOG_FORMAT_ENV).as_deref() {
            Some("json") => LogFormat::Json,
            Some("pretty") | None => LogFormat::Pretty,
            Some(other) => return Err(invalid(LOG_FORMAT_ENV, format!("unknown format {other}"))),
        };

        Ok(Self {
            host: get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.into()),
            port,
            data_dir,
            token_file,
            auth_disabled: parse_flag(AUTH_DISABLED_ENV, get(AUTH_DISABLED_ENV))?,
            cors_origin: get(CORS_ORIGIN_ENV),
            tls,
            defaults: parse_defaults(&get)?,
            readonly_remote_signers: match get(READONLY_REMOTE_SIGNERS_ENV) {
                Some(list) => parse_signer_list(&list)?,
                None => Vec::new(),
            },
            log_format,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether the API is only reachable from this machine.
    pub fn is_loopback(&self) -> bool {
        match self.host.parse::<std::net::IpAddr>() {
            Ok(ip) => ip.is_loopback(),
            Err(_) => self.host.eq_ignore_ascii_case("localhost"),
        }
    }
}

fn parse_flag(var: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    match value.as_deref().map(str::trim) {
        None => Ok(false),
        Some("1" | "true" | "yes") => Ok(true),
        Some("0" | "false" | "no") => Ok(false),
        Some(other) => Err(invalid(var, format!("expected a boolean, got {other}"))),
    }
}

fn parse_defaults(get: &impl Fn(&str) -> Option<String>) -> Result<Defaults, ConfigError> {
    let fee_recipient = match get(DEFAULT_FEE_RECIPIENT_ENV) {
        Some(address) => Address::from_str(address.trim())
            .map_err(|e| invalid(DEFAULT_FEE_RECIPIENT_ENV, e))?,
        None => Address::ZERO,
    };

    let gas_limit = match get(DEFAULT_GAS_LIMIT_ENV) {
        Some(limit) => parse_gas_limit(&Value::String(limit))
            .map_err(|e| invalid(DEFAULT_GAS_LIMIT_ENV, e))?,
        None => DEFAULT_GAS_LIMIT,
    };

    let graffiti = match get(DEFAULT_GRAFFITI_ENV) {
        Some(graffiti) => parse_graffiti(&graffiti).map_err(|_| {
            invalid(
                DEFAULT_GRAFFITI_ENV,
                format!("longer than {GRAFFITI_MAX_BYTES} bytes"),
            )
        })?,
        None => String::new(),
    };

    let genesis_validators_root = match get(GENESIS_VALIDATORS_ROOT_ENV) {
        Some(root) => B256::from_str(root.trim())
            .map_err(|e| invalid(GENESIS_VALIDATORS_ROOT_ENV, e))?
            .to_string(),
        None => ZERO_GENESIS_VALIDATORS_ROOT.to_string(),
    };

    Ok(Defaults {
        fee_recipient,
        gas_limit,
        graffiti,
        genesis_validators_root,
    })
}

/// `0xpubkey=https://signer:9000,0xpubkey2=http://...`
fn parse_signer_list(list: &str) -> Result<Vec<(PubkeyHex, String)>, ConfigError> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (pubkey, url) = entry.split_once('=').ok_or_else(|| {
                invalid(READONLY_REMOTE_SIGNERS_ENV, format!("expected pubkey=url, got {entry}"))
            })?;
            let pubkey = pubkey
                .trim()
                .parse::<PubkeyHex>()
                .map_err(|e| invalid(READONLY_REMOTE_SIGNERS_ENV, e))?;
            let url = url.trim();
            validate_signer_url(url).map_err(|e| invalid(READONLY_REMOTE_SIGNERS_ENV, e))?;
            Ok((pubkey, url.to_string()))
        })
        .collect()
}
