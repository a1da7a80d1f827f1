// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wire Codec
//!
//! Converts typed [`Request`]s and [`Response`]s to and from their HTTP
//! representation. Parameter placement and shape checks come from the
//! descriptors in [`super::routes`]; field names are translated with
//! [`super::naming`]. No domain validation happens here beyond the scalar
//! checks of [`crate::validation`].

use std::collections::{BTreeMap, HashSet};

use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    response::{IntoResponse, Response as HttpResponse},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use super::{
    naming::{camel_to_snake, rename_keys, Direction},
    routes::{Convention, Operation, ParamKind, ParamLocation, ParamSpec},
};
use crate::{
    keymanager::{Request, Response},
    models::GasLimitEntry,
    validation::{parse_gas_limit, parse_graffiti, ValidationError},
};

pub const SSZ_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("missing parameter: {0}")]
    MissingParam(String),

    #[error("invalid parameter {name}: {reason}")]
    InvalidParam { name: String, reason: String },

    #[error("duplicate item in {name} at index {index}")]
    DuplicateItem { name: String, index: usize },

    #[error("request body must be a JSON object")]
    InvalidBody,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid payload: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("response has no body")]
    MissingBody,

    #[error("binary payload has the wrong length")]
    InvalidSsz,
}

/// A request as it travels over HTTP.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WireRequest {
    pub path_params: BTreeMap<String, String>,
    pub body: Option<Value>,
}

/// Response body representation requested by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Json,
    Ssz,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WireBody {
    Empty,
    Json(Value),
    Ssz(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct WireResponse {
    pub status: StatusCode,
    pub body: WireBody,
}

impl IntoResponse for WireResponse {
    fn into_response(self) -> HttpResponse {
        match self.body {
            WireBody::Empty => self.status.into_response(),
            WireBody::Json(value) => (self.status, Json(value)).into_response(),
            WireBody::Ssz(bytes) => (
                self.status,
                [(CONTENT_TYPE, HeaderValue::from_static(SSZ_CONTENT_TYPE))],
                bytes,
            )
                .into_response(),
        }
    }
}

// =============================================================================
// Requests
// =============================================================================

pub fn encode_request(request: &Request) -> Result<WireRequest, CodecError> {
    let operation = request.operation();
    let typed = request_args(request)?;
    let typed = typed.as_object().ok_or(CodecError::InvalidBody)?;

    let mut wire = WireRequest::default();
    let mut body = Map::new();

    for spec in operation.params() {
        let wire_name = camel_to_snake(spec.name);
        let value = match typed.get(spec.name) {
            Some(value) if !value.is_null() => value.clone(),
            _ if spec.required => return Err(CodecError::MissingParam(wire_name)),
            _ => continue,
        };
        let value = encode_param(spec, &wire_name, value)?;

        match spec.location {
            ParamLocation::Path => {
                let Value::String(text) = value else {
                    return Err(invalid(&wire_name, "path parameters must be strings"));
                };
                wire.path_params.insert(wire_name, text);
            }
            ParamLocation::Body => {
                body.insert(wire_name, value);
            }
        }
    }

    let has_body = operation
        .params()
        .iter()
        .any(|spec| spec.location == ParamLocation::Body);
    if has_body {
        wire.body = Some(Value::Object(body));
    }
    Ok(wire)
}

pub fn decode_request(operation: Operation, wire: WireRequest) -> Result<Request, CodecError> {
    let body = match wire.body {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(map),
        Some(_) => return Err(CodecError::InvalidBody),
    };

    let mut typed = Map::new();
    for spec in operation.params() {
        let wire_name = camel_to_snake(spec.name);
        let raw = match spec.location {
            ParamLocation::Path => wire.path_params.get(&wire_name).cloned().map(Value::String),
            ParamLocation::Body => body
                .as_ref()
                .and_then(|body| body.get(&wire_name))
                .filter(|value| !value.is_null())
                .cloned(),
        };
        let Some(raw) = raw else {
            if spec.required {
                return Err(CodecError::MissingParam(wire_name));
            }
            continue;
        };
        typed.insert(spec.name.to_string(), decode_param(spec, &wire_name, raw)?);
    }

    request_from_args(operation, Value::Object(typed))
}

fn encode_param(spec: &ParamSpec, wire_name: &str, value: Value) -> Result<Value, CodecError> {
    match spec.kind {
        ParamKind::GasLimit => value
            .as_u64()
            .map(|gas_limit| Value::String(gas_limit.to_string()))
            .ok_or_else(|| invalid(wire_name, "expected an unsigned integer")),
        ParamKind::ObjectList => Ok(rename_keys(value, Direction::ToSnake)),
        ParamKind::Text | ParamKind::TextList { .. } | ParamKind::Graffiti => Ok(value),
    }
}

fn decode_param(spec: &ParamSpec, wire_name: &str, value: Value) -> Result<Value, CodecError> {
    match spec.kind {
        ParamKind::Text => match value {
            Value::String(_) => Ok(value),
            _ => Err(invalid(wire_name, "expected a string")),
        },
        ParamKind::Graffiti => match value {
            Value::String(text) => Ok(Value::String(parse_graffiti(&text)?)),
            _ => Err(invalid(wire_name, "expected a string")),
        },
        ParamKind::TextList { unique } => {
            let Value::Array(items) = &value else {
                return Err(invalid(wire_name, "expected an array of strings"));
            };
            let mut seen = HashSet::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                let Value::String(text) = item else {
                    return Err(invalid(wire_name, "expected an array of strings"));
                };
                if unique && !seen.insert(text.to_ascii_lowercase()) {
                    return Err(CodecError::DuplicateItem {
                        name: wire_name.to_string(),
                        index,
                    });
                }
            }
            Ok(value)
        }
        ParamKind::ObjectList => match &value {
            Value::Array(items) if items.iter().all(Value::is_object) => {
                Ok(rename_keys(value, Direction::ToCamel))
            }
            _ => Err(invalid(wire_name, "expected an array of objects")),
        },
        ParamKind::GasLimit => Ok(Value::from(parse_gas_limit(&value)?)),
    }
}

fn invalid(name: &str, reason: &str) -> CodecError {
    CodecError::InvalidParam {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

/// Typed (camelCase) JSON object holding a request's arguments.
fn request_args(request: &Request) -> Result<Value, CodecError> {
    let value = match request {
        Request::ListKeys | Request::ListRemoteKeys => Value::Object(Map::new()),
        Request::ImportKeystores(args) => serde_json::to_value(args)?,
        Request::DeleteKeys(args) => serde_json::to_value(args)?,
        Request::ImportRemoteKeys(args) => serde_json::to_value(args)?,
        Request::DeleteRemoteKeys(args) => serde_json::to_value(args)?,
        Request::SetFeeRecipient(args) => serde_json::to_value(args)?,
        Request::SetGasLimit(args) => serde_json::to_value(args)?,
        Request::SetGraffiti(args) => serde_json::to_value(args)?,
        Request::ListFeeRecipient(args)
        | Request::DeleteFeeRecipient(args)
        | Request::GetGasLimit(args)
        | Request::DeleteGasLimit(args)
        | Request::ListGraffiti(args)
        | Request::DeleteGraffiti(args) => serde_json::to_value(args)?,
    };
    Ok(value)
}

fn request_from_args(operation: Operation, args: Value) -> Result<Request, CodecError> {
    fn typed<T: DeserializeOwned>(args: Value) -> Result<T, CodecError> {
        Ok(serde_json::from_value(args)?)
    }

    let request = match operation {
        Operation::ListKeys => Request::ListKeys,
        Operation::ImportKeystores => Request::ImportKeystores(typed(args)?),
        Operation::DeleteKeys => Request::DeleteKeys(typed(args)?),
        Operation::ListRemoteKeys => Request::ListRemoteKeys,
        Operation::ImportRemoteKeys => Request::ImportRemoteKeys(typed(args)?),
        Operation::DeleteRemoteKeys => Request::DeleteRemoteKeys(typed(args)?),
        Operation::ListFeeRecipient => Request::ListFeeRecipient(typed(args)?),
        Operation::SetFeeRecipient => Request::SetFeeRecipient(typed(args)?),
        Operation::DeleteFeeRecipient => Request::DeleteFeeRecipient(typed(args)?),
        Operation::GetGasLimit => Request::GetGasLimit(typed(args)?),
        Operation::SetGasLimit => Request::SetGasLimit(typed(args)?),
        Operation::DeleteGasLimit => Request::DeleteGasLimit(typed(args)?),
        Operation::ListGraffiti => Request::ListGraffiti(typed(args)?),
        Operation::SetGraffiti => Request::SetGraffiti(typed(args)?),
        Operation::DeleteGraffiti => Request::DeleteGraffiti(typed(args)?),
    };
    Ok(request)
}

// =============================================================================
// Responses
// =============================================================================

pub fn encode_response(response: &Response, encoding: Encoding) -> Result<WireResponse, CodecError> {
    let operation = response.operation();
    let status = operation.route().success_status();

    let body = match (response_body(response)?, operation.convention()) {
        (None, _) => WireBody::Empty,
        (Some(typed), Convention::Snake) => WireBody::Json(rename_keys(typed, Direction::ToSnake)),
        (Some(typed), Convention::Eth2) => match (encoding, response) {
            (Encoding::Ssz, Response::GetGasLimit(entry)) => WireBody::Ssz(entry.to_ssz_bytes()),
            _ => WireBody::Json(integers_as_strings(rename_keys(typed, Direction::ToSnake))),
        },
    };

    Ok(WireResponse { status, body })
}

pub fn decode_response(operation: Operation, body: Option<Value>) -> Result<Response, CodecError> {
    fn data<T: DeserializeOwned>(body: Option<Value>) -> Result<T, CodecError> {
        let mut typed = rename_keys(body.ok_or(CodecError::MissingBody)?, Direction::ToCamel);
        let data = typed
            .get_mut("data")
            .map(Value::take)
            .ok_or(CodecError::MissingBody)?;
        Ok(serde_json::from_value(data)?)
    }

    let response = match operation {
        Operation::ListKeys => Response::ListKeys(data(body)?),
        Operation::ImportKeystores => Response::ImportKeystores(data(body)?),
        Operation::DeleteKeys => {
            let typed = rename_keys(body.ok_or(CodecError::MissingBody)?, Direction::ToCamel);
            Response::DeleteKeys(serde_json::from_value(typed)?)
        }
        Operation::ListRemoteKeys => Response::ListRemoteKeys(data(body)?),
        Operation::ImportRemoteKeys => Response::ImportRemoteKeys(data(body)?),
        Operation::DeleteRemoteKeys => Response::DeleteRemoteKeys(data(body)?),
        Operation::ListFeeRecipient => Response::ListFeeRecipient(data(body)?),
        Operation::SetFeeRecipient => Response::SetFeeRecipient,
        Operation::DeleteFeeRecipient => Response::DeleteFeeRecipient,
        Operation::GetGasLimit => Response::GetGasLimit(data(body)?),
        Operation::SetGasLimit => Response::SetGasLimit,
        Operation::DeleteGasLimit => Response::DeleteGasLimit,
        Operation::ListGraffiti => Response::ListGraffiti(data(body)?),
        Operation::SetGraffiti => Response::SetGraffiti,
        Operation::DeleteGraffiti => Response::DeleteGraffiti,
    };
    Ok(response)
}

/// Decode the fixed binary form of a `getGasLimit` response.
pub fn decode_gas_limit_ssz(bytes: &[u8]) -> Result<Response, CodecError> {
    GasLimitEntry::from_ssz_bytes(bytes)
        .map(Response::GetGasLimit)
        .ok_or(CodecError::InvalidSsz)
}

/// Typed (camelCase) response body, `None` for operations without one.
fn response_body(response: &Response) -> Result<Option<Value>, CodecError> {
    let body = match response {
        Response::ListKeys(keys) => json!({ "data": keys }),
        Response::ImportKeystores(results) => json!({ "data": results }),
        Response::DeleteKeys(result) => serde_json::to_value(result)?,
        Response::ListRemoteKeys(signers) => json!({ "data": signers }),
        Response::ImportRemoteKeys(results) => json!({ "data": results }),
        Response::DeleteRemoteKeys(results) => json!({ "data": results }),
        Response::ListFeeRecipient(entry) => json!({ "data": entry }),
        Response::GetGasLimit(entry) => json!({ "data": entry }),
        Response::ListGraffiti(entry) => json!({ "data": entry }),
        Response::SetFeeRecipient
        | Response::DeleteFeeRecipient
        | Response::SetGasLimit
        | Response::DeleteGasLimit
        | Response::SetGraffiti
        | Response::DeleteGraffiti => return Ok(None),
    };
    Ok(Some(body))
}

/// eth2 convention: every unsigned integer becomes a decimal string.
fn integers_as_strings(value: Value) -> Value {
    match value {
        Value::Number(n) => match n.as_u64() {
            Some(unsigned) => Value::String(unsigned.to_string()),
            None => Value::Number(n),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(integers_as_strings).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, integers_as_strings(value)))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::Address;

    use super::*;
    use crate::{
        models::{
            test_keys::pubkey, DeleteKeysArgs, DeleteKeysResult, DeleteRemoteKeysArgs,
            FeeRecipientEntry, GraffitiEntry, ImportKeystoresArgs, ImportRemoteKeysArgs, KeyEntry,
            Password, PubkeyArgs, RemoteKeyArgs, SetFeeRecipientArgs, SetGasLimitArgs,
            SetGraffitiArgs, SignerDefinition,
        },
        status::{
            DeleteRemoteStatus, DeleteStatus, ImportRemoteStatus, ImportStatus, OperationResult,
        },
    };

    fn sample_requests() -> Vec<Request> {
        let pk = pubkey(0xaa);
        vec![
            Request::ListKeys,
            Request::ImportKeystores(ImportKeystoresArgs {
                keystores: vec!["{\"version\":4}".into(), "{}".into()],
                passwords: vec![Password::new("a"), Password::new("b")],
                slashing_protection: Some("{\"data\":[]}".into()),
            }),
            Request::ImportKeystores(ImportKeystoresArgs {
                keystores: vec![],
                passwords: vec![],
                slashing_protection: None,
            }),
            Request::DeleteKeys(DeleteKeysArgs {
                pubkeys: vec![pubkey(1), pubkey(2)],
            }),
            Request::ListRemoteKeys,
            Request::ImportRemoteKeys(ImportRemoteKeysArgs {
                remote_keys: vec![RemoteKeyArgs {
                    pubkey: pk,
                    url: "https://signer.local:9000".into(),
                }],
            }),
            Request::DeleteRemoteKeys(DeleteRemoteKeysArgs { pubkeys: vec![pk] }),
            Request::ListFeeRecipient(PubkeyArgs { pubkey: pk }),
            Request::SetFeeRecipient(SetFeeRecipientArgs {
                pubkey: pk,
                ethaddress: Address::repeat_byte(0x11),
            }),
            Request::DeleteFeeRecipient(PubkeyArgs { pubkey: pk }),
            Request::GetGasLimit(PubkeyArgs { pubkey: pk }),
            Request::SetGasLimit(SetGasLimitArgs {
                pubkey: pk,
                gas_limit: 30_000_000,
            }),
            Request::DeleteGasLimit(PubkeyArgs { pubkey: pk }),
            Request::ListGraffiti(PubkeyArgs { pubkey: pk }),
            Request::SetGraffiti(SetGraffitiArgs {
                pubkey: pk,
                graffiti: "hello".into(),
            }),
            Request::DeleteGraffiti(PubkeyArgs { pubkey: pk }),
        ]
    }

    fn sample_responses() -> Vec<Response> {
        let pk = pubkey(0xbb);
        vec![
            Response::ListKeys(vec![]),
            Response::ListKeys(vec![KeyEntry {
                validating_pubkey: pk,
                derivation_path: Some("m/12381/3600/0/0/0".into()),
                readonly: false,
            }]),
            Response::ImportKeystores(vec![
                OperationResult::new(ImportStatus::Duplicate),
                OperationResult::error("bad password"),
            ]),
            Response::DeleteKeys(DeleteKeysResult {
                data: vec![
                    OperationResult::new(DeleteStatus::Deleted),
                    OperationResult::new(DeleteStatus::NotFound),
                ],
                slashing_protection: "{\"metadata\":{}}".into(),
            }),
            Response::ListRemoteKeys(vec![SignerDefinition {
                pubkey: pk,
                url: "http://localhost:9000".into(),
                readonly: true,
            }]),
            Response::ImportRemoteKeys(vec![OperationResult::new(ImportRemoteStatus::Imported)]),
            Response::DeleteRemoteKeys(vec![OperationResult::error("read-only")]),
            Response::ListFeeRecipient(FeeRecipientEntry {
                pubkey: pk,
                ethaddress: Address::repeat_byte(0xab),
            }),
            Response::SetFeeRecipient,
            Response::DeleteFeeRecipient,
            Response::GetGasLimit(GasLimitEntry {
                pubkey: pk,
                gas_limit: 36_000_000,
            }),
            Response::SetGasLimit,
            Response::DeleteGasLimit,
            Response::ListGraffiti(GraffitiEntry {
                pubkey: pk,
                graffiti: "gm".into(),
            }),
            Response::SetGraffiti,
            Response::DeleteGraffiti,
        ]
    }

    #[test]
    fn every_request_round_trips() {
        for request in sample_requests() {
            let wire = encode_request(&request).unwrap();
            let decoded = decode_request(request.operation(), wire.clone()).unwrap();
            assert_eq!(decoded, request);
            assert_eq!(encode_request(&decoded).unwrap(), wire);
        }
    }

    #[test]
    fn every_response_round_trips() {
        for response in sample_responses() {
            let operation = response.operation();
            let wire = encode_response(&response, Encoding::Json).unwrap();
            assert_eq!(wire.status, operation.route().success_status());
            let body = match wire.body {
                WireBody::Json(value) => Some(value),
                WireBody::Empty => None,
                WireBody::Ssz(_) => unreachable!("json requested"),
            };
            assert_eq!(decode_response(operation, body).unwrap(), response);
        }
    }

    #[test]
    fn import_keystores_wire_shape() {
        let wire = WireRequest {
            path_params: BTreeMap::new(),
            body: Some(json!({
                "keystores": ["ks0"],
                "passwords": ["pw0"],
                "slashing_protection": "{}"
            })),
        };
        let Request::ImportKeystores(args) =
            decode_request(Operation::ImportKeystores, wire).unwrap()
        else {
            panic!("wrong variant");
        };
        assert_eq!(args.keystores, vec!["ks0".to_string()]);
        assert_eq!(args.passwords, vec![Password::new("pw0")]);
        assert_eq!(args.slashing_protection.as_deref(), Some("{}"));
    }

    #[test]
    fn remote_keys_use_snake_case_on_the_wire() {
        let request = Request::ImportRemoteKeys(ImportRemoteKeysArgs {
            remote_keys: vec![RemoteKeyArgs {
                pubkey: pubkey(3),
                url: "http://127.0.0.1:9000".into(),
            }],
        });
        let wire = encode_request(&request).unwrap();
        let body = wire.body.unwrap();
        assert!(body.get("remote_keys").is_some());
        assert!(body.get("remoteKeys").is_none());
    }

    #[test]
    fn gas_limit_travels_as_a_string_and_is_validated() {
        let request = Request::SetGasLimit(SetGasLimitArgs {
            pubkey: pubkey(4),
            gas_limit: 30_000_000,
        });
        let wire = encode_request(&request).unwrap();
        assert_eq!(wire.body, Some(json!({ "gas_limit": "30000000" })));
        assert_eq!(wire.path_params["pubkey"], pubkey(4).to_string());

        let mut zero = wire.clone();
        zero.body = Some(json!({ "gas_limit": "0" }));
        assert!(matches!(
            decode_request(Operation::SetGasLimit, zero),
            Err(CodecError::Validation(ValidationError::ZeroGasLimit))
        ));

        let mut garbage = wire;
        garbage.body = Some(json!({ "gas_limit": "abc" }));
        assert!(matches!(
            decode_request(Operation::SetGasLimit, garbage),
            Err(CodecError::Validation(ValidationError::InvalidGasLimit(_)))
        ));
    }

    #[test]
    fn missing_and_mistyped_parameters_are_rejected() {
        let err = decode_request(Operation::DeleteKeys, WireRequest::default()).unwrap_err();
        assert!(matches!(err, CodecError::MissingParam(name) if name == "pubkeys"));

        let wire = WireRequest {
            path_params: BTreeMap::new(),
            body: Some(json!({ "pubkeys": "0xabc" })),
        };
        assert!(matches!(
            decode_request(Operation::DeleteKeys, wire),
            Err(CodecError::InvalidParam { .. })
        ));

        let wire = WireRequest {
            path_params: BTreeMap::new(),
            body: Some(json!(["not", "an", "object"])),
        };
        assert!(matches!(
            decode_request(Operation::DeleteKeys, wire),
            Err(CodecError::InvalidBody)
        ));

        let err = decode_request(Operation::GetGasLimit, WireRequest::default()).unwrap_err();
        assert!(matches!(err, CodecError::MissingParam(name) if name == "pubkey"));
    }

    #[test]
    fn malformed_pubkey_is_a_schema_error() {
        let wire = WireRequest {
            path_params: BTreeMap::from([("pubkey".to_string(), "0x1234".to_string())]),
            body: None,
        };
        assert!(matches!(
            decode_request(Operation::ListFeeRecipient, wire),
            Err(CodecError::Schema(_))
        ));
    }

    #[test]
    fn duplicate_pubkeys_are_rejected_case_insensitively() {
        let pk = pubkey(0xcd).to_string();
        let wire = WireRequest {
            path_params: BTreeMap::new(),
            body: Some(json!({ "pubkeys": [pk.clone(), pk.to_uppercase().replace("0X", "0x")] })),
        };
        assert!(matches!(
            decode_request(Operation::DeleteRemoteKeys, wire),
            Err(CodecError::DuplicateItem { index: 1, .. })
        ));
    }

    #[test]
    fn graffiti_length_is_checked_at_decode() {
        let wire = WireRequest {
            path_params: BTreeMap::from([("pubkey".to_string(), pubkey(5).to_string())]),
            body: Some(json!({ "graffiti": "x".repeat(33) })),
        };
        assert!(matches!(
            decode_request(Operation::SetGraffiti, wire),
            Err(CodecError::Validation(ValidationError::GraffitiTooLong))
        ));
    }

    #[test]
    fn list_keys_response_uses_snake_case() {
        let response = Response::ListKeys(vec![KeyEntry {
            validating_pubkey: pubkey(6),
            derivation_path: None,
            readonly: true,
        }]);
        let wire = encode_response(&response, Encoding::Json).unwrap();
        assert_eq!(
            wire.body,
            WireBody::Json(json!({
                "data": [{ "validating_pubkey": pubkey(6).to_string(), "readonly": true }]
            }))
        );
    }

    #[test]
    fn delete_keys_response_shape() {
        let response = Response::DeleteKeys(DeleteKeysResult {
            data: vec![
                OperationResult::new(DeleteStatus::Deleted),
                OperationResult::new(DeleteStatus::NotFound),
            ],
            slashing_protection: "{}".into(),
        });
        let wire = encode_response(&response, Encoding::Json).unwrap();
        assert_eq!(wire.status, StatusCode::OK);
        assert_eq!(
            wire.body,
            WireBody::Json(json!({
                "data": [{ "status": "deleted" }, { "status": "not_found" }],
                "slashing_protection": "{}"
            }))
        );
    }

    #[test]
    fn gas_limit_response_uses_eth2_convention() {
        let entry = GasLimitEntry {
            pubkey: pubkey(7),
            gas_limit: 30_000_000,
        };
        let response = Response::GetGasLimit(entry.clone());

        let json_wire = encode_response(&response, Encoding::Json).unwrap();
        assert_eq!(
            json_wire.body,
            WireBody::Json(json!({
                "data": { "pubkey": pubkey(7).to_string(), "gas_limit": "30000000" }
            }))
        );

        let ssz_wire = encode_response(&response, Encoding::Ssz).unwrap();
        let WireBody::Ssz(bytes) = ssz_wire.body else {
            panic!("expected binary body");
        };
        assert_eq!(decode_gas_limit_ssz(&bytes).unwrap(), response);
        assert!(matches!(
            decode_gas_limit_ssz(&bytes[..10]),
            Err(CodecError::InvalidSsz)
        ));
    }

    #[test]
    fn binary_encoding_is_ignored_for_snake_operations() {
        let wire = encode_response(&Response::ListKeys(vec![]), Encoding::Ssz).unwrap();
        assert_eq!(wire.body, WireBody::Json(json!({ "data": [] })));
    }

    #[test]
    fn setters_have_no_body() {
        let wire = encode_response(&Response::SetGasLimit, Encoding::Json).unwrap();
        assert_eq!(wire.status, StatusCode::ACCEPTED);
        assert_eq!(wire.body, WireBody::Empty);

        let wire = encode_response(&Response::DeleteGraffiti, Encoding::Json).unwrap();
        assert_eq!(wire.status, StatusCode::NO_CONTENT);
        assert_eq!(wire.body, WireBody::Empty);
    }

    #[test]
    fn delete_remote_status_round_trips_through_wire() {
        let body = json!({ "data": [{ "status": "not_found" }, { "status": "error", "message": "read-only" }] });
        let decoded = decode_response(Operation::DeleteRemoteKeys, Some(body)).unwrap();
        assert_eq!(
            decoded,
            Response::DeleteRemoteKeys(vec![
                OperationResult::new(DeleteRemoteStatus::NotFound),
                OperationResult::error("read-only"),
            ])
        );
    }
}
