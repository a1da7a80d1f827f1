// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Per-item Operation Status
//!
//! Every batch operation reports one [`OperationResult`] per input item, in
//! input order. The status enums below are closed: `error` covers every
//! failure and the optional `message` carries the detail.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A status enum that has a catch-all failure value.
pub trait StatusKind: Copy {
    /// The value reported when an item could not be processed.
    const ERROR: Self;
}

/// Outcome of importing one local keystore.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    Imported,
    Duplicate,
    Error,
}

/// Outcome of deleting one local key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeleteStatus {
    /// An active key was removed; its slashing protection is returned.
    Deleted,
    /// The key is not active but slashing protection is still retained.
    NotActive,
    /// The key was never known.
    NotFound,
    Error,
}

impl DeleteStatus {
    /// Whether the response must carry slashing protection for this item.
    pub fn carries_slashing_protection(self) -> bool {
        matches!(self, DeleteStatus::Deleted | DeleteStatus::NotActive)
    }
}

/// Outcome of registering one remote signer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ImportRemoteStatus {
    Imported,
    Duplicate,
    Error,
}

/// Outcome of removing one remote signer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeleteRemoteStatus {
    Deleted,
    NotFound,
    Error,
}

impl StatusKind for ImportStatus {
    const ERROR: Self = ImportStatus::Error;
}

impl StatusKind for DeleteStatus {
    const ERROR: Self = DeleteStatus::Error;
}

impl StatusKind for ImportRemoteStatus {
    const ERROR: Self = ImportRemoteStatus::Error;
}

impl StatusKind for DeleteRemoteStatus {
    const ERROR: Self = DeleteRemoteStatus::Error;
}

/// Result for a single item of a batch request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct OperationResult<S> {
    #[schema(inline)]
    pub status: S,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<S: StatusKind> OperationResult<S> {
    pub fn new(status: S) -> Self {
        Self {
            status,
            message: None,
        }
    }

    pub fn with_message(status: S, message: impl Into<String>) -> Self {
        Self {
            status,
            message: Some(message.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_message(S::ERROR, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_serialize_as_snake_case() {
        assert_eq!(
            serde_json::to_string(&DeleteStatus::NotActive).unwrap(),
            r#""not_active""#
        );
        assert_eq!(
            serde_json::to_string(&DeleteRemoteStatus::NotFound).unwrap(),
            r#""not_found""#
        );
        assert_eq!(
            serde_json::to_string(&ImportStatus::Duplicate).unwrap(),
            r#""duplicate""#
        );
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(serde_json::from_str::<ImportRemoteStatus>(r#""pending""#).is_err());
        assert!(serde_json::from_str::<DeleteStatus>(r#""not_active""#).is_ok());
    }

    #[test]
    fn error_result_carries_message() {
        let result = OperationResult::<ImportStatus>::error("bad password");
        assert_eq!(result.status, ImportStatus::Error);
        assert_eq!(result.message.as_deref(), Some("bad password"));

        let json = serde_json::to_value(OperationResult::new(DeleteStatus::Deleted)).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "deleted" }));
    }

    #[test]
    fn only_deleted_and_not_active_carry_slashing_protection() {
        assert!(DeleteStatus::Deleted.carries_slashing_protection());
        assert!(DeleteStatus::NotActive.carries_slashing_protection());
        assert!(!DeleteStatus::NotFound.carries_slashing_protection());
        assert!(!DeleteStatus::Error.carries_slashing_protection());
    }
}
