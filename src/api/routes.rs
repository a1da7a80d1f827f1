// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Route Table
//!
//! Static mapping from each key manager [`Operation`] to its HTTP method,
//! path template, success status and parameter descriptors. Every lookup is an
//! exhaustive `match`, so adding an operation without a route (or the other
//! way round) does not build.
//!
//! The table is pure data. It drives the axum router, the typed client and
//! the generated OpenAPI document.

use std::collections::BTreeMap;

use axum::http::{self, StatusCode};

/// Declares [`Operation`] together with [`Operation::ALL`] from one variant
/// list, so the array always holds every variant in declaration order.
macro_rules! operations {
    ($($variant:ident),+ $(,)?) => {
        /// Every operation exposed by the key manager API.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Operation {
            $($variant),+
        }

        impl Operation {
            pub const ALL: [Operation; [$(Operation::$variant),+].len()] =
                [$(Operation::$variant),+];
        }
    };
}

operations! {
    ListKeys,
    ImportKeystores,
    DeleteKeys,
    ListRemoteKeys,
    ImportRemoteKeys,
    DeleteRemoteKeys,
    ListFeeRecipient,
    SetFeeRecipient,
    DeleteFeeRecipient,
    GetGasLimit,
    SetGasLimit,
    DeleteGasLimit,
    ListGraffiti,
    SetGraffiti,
    DeleteGraffiti,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_http(self) -> http::Method {
        match self {
            Method::Get => http::Method::GET,
            Method::Post => http::Method::POST,
            Method::Delete => http::Method::DELETE,
        }
    }

    /// Conventional success code when the route does not override it.
    pub fn default_status(self) -> StatusCode {
        StatusCode::OK
    }
}

/// Result encoding convention of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convention {
    /// Plain JSON with snake_case field names.
    Snake,
    /// snake_case names, unsigned integers as decimal strings, and a fixed
    /// binary layout when requested.
    Eth2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub operation_id: &'static str,
    pub method: Method,
    pub path: &'static str,
    pub status: Option<StatusCode>,
    pub summary: &'static str,
}

impl Route {
    pub fn success_status(&self) -> StatusCode {
        self.status.unwrap_or_else(|| self.method.default_status())
    }

    /// Names of the `{placeholder}` segments in the path template.
    pub fn path_params(&self) -> Vec<&'static str> {
        self.path
            .split('/')
            .filter_map(|segment| segment.strip_prefix('{')?.strip_suffix('}'))
            .collect()
    }

    /// Substitute path parameters into the template.
    pub fn render_path(&self, params: &BTreeMap<String, String>) -> Option<String> {
        let segments = self
            .path
            .split('/')
            .map(|segment| match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => params.get(name).cloned(),
                None => Some(segment.to_string()),
            })
            .collect::<Option<Vec<_>>>()?;
        Some(segments.join("/"))
    }
}

/// Where a parameter travels on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    Path,
    Body,
}

/// Shape of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Text,
    TextList { unique: bool },
    ObjectList,
    /// Non-zero `u64`, a decimal string on the wire.
    GasLimit,
    Graffiti,
}

/// Descriptor of one operation parameter. `name` is the typed (camelCase) name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub location: ParamLocation,
    pub kind: ParamKind,
    pub required: bool,
}

const fn path(name: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        location: ParamLocation::Path,
        kind: ParamKind::Text,
        required: true,
    }
}

const fn body(name: &'static str, kind: ParamKind) -> ParamSpec {
    ParamSpec {
        name,
        location: ParamLocation::Body,
        kind,
        required: true,
    }
}

const fn optional(spec: ParamSpec) -> ParamSpec {
    ParamSpec {
        required: false,
        ..spec
    }
}

const KEYSTORES_PATH: &str = "/eth/v1/keystores";
const REMOTE_KEYS_PATH: &str = "/eth/v1/remotekeys";
const FEE_RECIPIENT_PATH: &str = "/eth/v1/validator/{pubkey}/feerecipient";
const GAS_LIMIT_PATH: &str = "/eth/v1/validator/{pubkey}/gas_limit";
const GRAFFITI_PATH: &str = "/eth/v1/validator/{pubkey}/graffiti";

const NO_PARAMS: &[ParamSpec] = &[];
const PUBKEY_ONLY: &[ParamSpec] = &[path("pubkey")];
const IMPORT_KEYSTORES: &[ParamSpec] = &[
    body("keystores", ParamKind::TextList { unique: false }),
    body("passwords", ParamKind::TextList { unique: false }),
    optional(body("slashingProtection", ParamKind::Text)),
];
const DELETE_PUBKEYS: &[ParamSpec] = &[body("pubkeys", ParamKind::TextList { unique: true })];
const IMPORT_REMOTE_KEYS: &[ParamSpec] = &[body("remoteKeys", ParamKind::ObjectList)];
const SET_FEE_RECIPIENT: &[ParamSpec] = &[path("pubkey"), body("ethaddress", ParamKind::Text)];
const SET_GAS_LIMIT: &[ParamSpec] = &[path("pubkey"), body("gasLimit", ParamKind::GasLimit)];
const SET_GRAFFITI: &[ParamSpec] = &[path("pubkey"), body("graffiti", ParamKind::Graffiti)];

impl Operation {
    pub fn route(self) -> Route {
        let (operation_id, method, path, status, summary) = match self {
            Operation::ListKeys => ("listKeys", Method::Get, KEYSTORES_PATH, None, "List keys"),
            Operation::ImportKeystores => (
                "importKeystores",
                Method::Post,
                KEYSTORES_PATH,
                None,
                "Import keystores",
            ),
            Operation::DeleteKeys => (
                "deleteKeys",
                Method::Delete,
                KEYSTORES_PATH,
                None,
                "Delete keys and export their slashing protection",
            ),
            Operation::ListRemoteKeys => (
                "listRemoteKeys",
                Method::Get,
                REMOTE_KEYS_PATH,
                None,
                "List remote signer keys",
            ),
            Operation::ImportRemoteKeys => (
                "importRemoteKeys",
                Method::Post,
                REMOTE_KEYS_PATH,
                None,
                "Import remote signer keys",
            ),
            Operation::DeleteRemoteKeys => (
                "deleteRemoteKeys",
                Method::Delete,
                REMOTE_KEYS_PATH,
                None,
                "Delete remote signer keys",
            ),
            Operation::ListFeeRecipient => (
                "listFeeRecipient",
                Method::Get,
                FEE_RECIPIENT_PATH,
                None,
                "Get a validator's fee recipient",
            ),
            Operation::SetFeeRecipient => (
                "setFeeRecipient",
                Method::Post,
                FEE_RECIPIENT_PATH,
                Some(StatusCode::ACCEPTED),
                "Set a validator's fee recipient",
            ),
            Operation::DeleteFeeRecipient => (
                "deleteFeeRecipient",
                Method::Delete,
                FEE_RECIPIENT_PATH,
                Some(StatusCode::NO_CONTENT),
                "Remove a validator's fee recipient override",
            ),
            Operation::GetGasLimit => (
                "getGasLimit",
                Method::Get,
                GAS_LIMIT_PATH,
                None,
                "Get a validator's gas limit",
            ),
            Operation::SetGasLimit => (
                "setGasLimit",
                Method::Post,
                GAS_LIMIT_PATH,
                Some(StatusCode::ACCEPTED),
                "Set a validator's gas limit",
            ),
            Operation::DeleteGasLimit => (
                "deleteGasLimit",
                Method::Delete,
                GAS_LIMIT_PATH,
                Some(StatusCode::NO_CONTENT),
                "Remove a validator's gas limit override",
            ),
            Operation::ListGraffiti => (
                "listGraffiti",
                Method::Get,
                GRAFFITI_PATH,
                None,
                "Get a validator's graffiti",
            ),
            Operation::SetGraffiti => (
                "setGraffiti",
                Method::Post,
                GRAFFITI_PATH,
                Some(StatusCode::ACCEPTED),
                "Set a validator's graffiti",
            ),
            Operation::DeleteGraffiti => (
                "deleteGraffiti",
                Method::Delete,
                GRAFFITI_PATH,
                Some(StatusCode::NO_CONTENT),
                "Remove a validator's graffiti override",
            ),
        };

        Route {
            operation_id,
            method,
            path,
            status,
            summary,
        }
    }

    pub fn params(self) -> &'static [ParamSpec] {
        match self {
            Operation::ListKeys | Operation::ListRemoteKeys => NO_PARAMS,
            Operation::ImportKeystores => IMPORT_KEYSTORES,
            Operation::DeleteKeys | Operation::DeleteRemoteKeys => DELETE_PUBKEYS,
            Operation::ImportRemoteKeys => IMPORT_REMOTE_KEYS,
            Operation::ListFeeRecipient
            | Operation::DeleteFeeRecipient
            | Operation::GetGasLimit
            | Operation::DeleteGasLimit
            | Operation::ListGraffiti
            | Operation::DeleteGraffiti => PUBKEY_ONLY,
            Operation::SetFeeRecipient => SET_FEE_RECIPIENT,
            Operation::SetGasLimit => SET_GAS_LIMIT,
            Operation::SetGraffiti => SET_GRAFFITI,
        }
    }

    pub fn convention(self) -> Convention {
        match self {
            Operation::GetGasLimit => Convention::Eth2,
            _ => Convention::Snake,
        }
    }

    /// OpenAPI tag grouping.
    pub fn tag(self) -> &'static str {
        match self {
            Operation::ListKeys | Operation::ImportKeystores | Operation::DeleteKeys => {
                "Local Key Manager"
            }
            Operation::ListRemoteKeys
            | Operation::ImportRemoteKeys
            | Operation::DeleteRemoteKeys => "Remote Key Manager",
            Operation::ListFeeRecipient
            | Operation::SetFeeRecipient
            | Operation::DeleteFeeRecipient => "Fee Recipient",
            Operation::GetGasLimit | Operation::SetGasLimit | Operation::DeleteGasLimit => {
                "Gas Limit"
            }
            Operation::ListGraffiti | Operation::SetGraffiti | Operation::DeleteGraffiti => {
                "Graffiti"
            }
        }
    }

    /// Position in [`Operation::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn all_lists_every_operation_once() {
        for (position, op) in Operation::ALL.iter().enumerate() {
            assert_eq!(op.index(), position, "{op:?}");
        }
        assert_eq!(Operation::ALL.len(), Operation::DeleteGraffiti.index() + 1);
        assert_eq!(Operation::ALL.len(), 15);
    }

    #[test]
    fn routes_are_one_to_one_with_operations() {
        let keys: HashSet<_> = Operation::ALL
            .iter()
            .map(|op| (op.route().method, op.route().path))
            .collect();
        assert_eq!(keys.len(), Operation::ALL.len());

        let ids: HashSet<_> = Operation::ALL
            .iter()
            .map(|op| op.route().operation_id)
            .collect();
        assert_eq!(ids.len(), Operation::ALL.len());
    }

    #[test]
    fn status_overrides() {
        let accepted: Vec<_> = Operation::ALL
            .iter()
            .filter(|op| op.route().success_status() == StatusCode::ACCEPTED)
            .copied()
            .collect();
        assert_eq!(
            accepted,
            vec![
                Operation::SetFeeRecipient,
                Operation::SetGasLimit,
                Operation::SetGraffiti
            ]
        );

        let no_content: Vec<_> = Operation::ALL
            .iter()
            .filter(|op| op.route().success_status() == StatusCode::NO_CONTENT)
            .copied()
            .collect();
        assert_eq!(
            no_content,
            vec![
                Operation::DeleteFeeRecipient,
                Operation::DeleteGasLimit,
                Operation::DeleteGraffiti
            ]
        );

        assert_eq!(Operation::DeleteKeys.route().success_status(), StatusCode::OK);
        assert_eq!(Operation::ImportKeystores.route().success_status(), StatusCode::OK);
    }

    #[test]
    fn path_descriptors_match_templates() {
        for op in Operation::ALL {
            let from_template = op.route().path_params();
            let from_specs: Vec<_> = op
                .params()
                .iter()
                .filter(|spec| spec.location == ParamLocation::Path)
                .map(|spec| spec.name)
                .collect();
            assert_eq!(from_template, from_specs, "{op:?}");
        }
    }

    #[test]
    fn read_operations_have_no_body() {
        for op in Operation::ALL {
            if op.route().method == Method::Get {
                assert!(op
                    .params()
                    .iter()
                    .all(|spec| spec.location == ParamLocation::Path));
            }
        }
    }

    #[test]
    fn only_gas_limit_read_uses_eth2_convention() {
        let eth2: Vec<_> = Operation::ALL
            .iter()
            .filter(|op| op.convention() == Convention::Eth2)
            .collect();
        assert_eq!(eth2, vec![&Operation::GetGasLimit]);
    }

    #[test]
    fn render_path_substitutes_placeholders() {
        let route = Operation::SetGasLimit.route();
        let params = BTreeMap::from([("pubkey".to_string(), "0xabc".to_string())]);
        assert_eq!(
            route.render_path(&params).as_deref(),
            Some("/eth/v1/validator/0xabc/gas_limit")
        );
        assert_eq!(route.render_path(&BTreeMap::new()), None);
        assert_eq!(
            Operation::ListKeys.route().render_path(&BTreeMap::new()).as_deref(),
            Some("/eth/v1/keystores")
        );
    }
}
