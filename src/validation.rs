// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Scalar input validation.
//!
//! These run while a request is decoded, strictly before any store access.

use serde_json::Value;

/// Maximum graffiti length in bytes (one beacon block graffiti field).
pub const GRAFFITI_MAX_BYTES: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("gas limit must not be empty")]
    EmptyGasLimit,

    #[error("gas limit is not a valid unsigned integer: {0}")]
    InvalidGasLimit(String),

    #[error("gas limit must be greater than zero")]
    ZeroGasLimit,

    #[error("graffiti exceeds {GRAFFITI_MAX_BYTES} bytes")]
    GraffitiTooLong,

    #[error("invalid pubkey: {0}")]
    InvalidPubkey(String),
}

/// Parse a gas limit supplied as a JSON string or number.
///
/// Zero is rejected: an unset override is expressed by deleting it.
pub fn parse_gas_limit(input: &Value) -> Result<u64, ValidationError> {
    let gas_limit = match input {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Err(ValidationError::EmptyGasLimit);
            }
            trimmed
                .parse::<u64>()
                .map_err(|_| ValidationError::InvalidGasLimit(trimmed.to_string()))?
        }
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| ValidationError::InvalidGasLimit(n.to_string()))?,
        other => return Err(ValidationError::InvalidGasLimit(other.to_string())),
    };

    if gas_limit == 0 {
        return Err(ValidationError::ZeroGasLimit);
    }
    Ok(gas_limit)
}

/// Validate a graffiti string.
pub fn parse_graffiti(input: &str) -> Result<String, ValidationError> {
    if input.len() > GRAFFITI_MAX_BYTES {
        return Err(ValidationError::GraffitiTooLong);
    }
    Ok(input.to_string())
}
