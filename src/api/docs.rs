// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! OpenAPI document generated from the route table.
//!
//! Paths, methods, status codes and request schemas all come from
//! [`Operation::route`] and [`Operation::params`], so the document cannot
//! drift from what the router serves.

use serde_json::Value;
use utoipa::{
    openapi::{
        content::ContentBuilder,
        path::{HttpMethod, OperationBuilder, ParameterBuilder, ParameterIn, PathItem, PathsBuilder},
        request_body::RequestBodyBuilder,
        response::ResponseBuilder,
        schema::{ArrayBuilder, KnownFormat, ObjectBuilder, SchemaFormat, Type},
        security::{Http, HttpAuthScheme, SecurityRequirement, SecurityScheme},
        RefOr, Required, Schema,
    },
    Modify, OpenApi, ToSchema,
};

use super::{
    codec::SSZ_CONTENT_TYPE,
    naming::camel_to_snake,
    routes::{Convention, Method, Operation, ParamKind, ParamLocation, ParamSpec},
};

use crate::{
    models::{
        DeleteKeysResult, FeeRecipientEntry, GasLimitEntry, GraffitiEntry, KeyEntry,
        SignerDefinition,
    },
    status::{DeleteRemoteStatus, ImportRemoteStatus, ImportStatus, OperationResult},
    validation::GRAFFITI_MAX_BYTES,
};

const JSON: &str = "application/json";
const BEARER_SCHEME: &str = "bearer";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Validator Key Manager API",
        description = "Local management of validator signing keys, remote signers and per-validator proposer settings."
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Local Key Manager", description = "Keystores and slashing protection"),
        (name = "Remote Key Manager", description = "Remote signer references"),
        (name = "Fee Recipient", description = "Per-validator fee recipient"),
        (name = "Gas Limit", description = "Per-validator gas limit"),
        (name = "Graffiti", description = "Per-validator graffiti")
    )
)]
struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

/// The complete OpenAPI document.
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();

    let mut paths = PathsBuilder::new();
    for operation in Operation::ALL {
        let route = operation.route();
        let method = match route.method {
            Method::Get => HttpMethod::Get,
            Method::Post => HttpMethod::Post,
            Method::Delete => HttpMethod::Delete,
        };
        paths = paths.path(route.path, PathItem::new(method, describe(operation)));
    }
    doc.paths = paths.build();
    doc
}

fn describe(operation: Operation) -> utoipa::openapi::path::Operation {
    let route = operation.route();
    let mut builder = OperationBuilder::new()
        .operation_id(Some(route.operation_id))
        .summary(Some(route.summary))
        .tag(operation.tag())
        .security(SecurityRequirement::new(BEARER_SCHEME, Vec::<String>::new()));

    let mut body = ObjectBuilder::new().schema_type(Type::Object);
    let mut has_body = false;
    for spec in operation.params() {
        let wire_name = camel_to_snake(spec.name);
        match spec.location {
            ParamLocation::Path => {
                builder = builder.parameter(
                    ParameterBuilder::new()
                        .name(wire_name)
                        .parameter_in(ParameterIn::Path)
                        .required(Required::True)
                        .description(Some("Validator public key, 0x-prefixed hex"))
                        .schema(Some(param_schema(spec))),
                );
            }
            ParamLocation::Body => {
                has_body = true;
                body = body.property(wire_name.clone(), param_schema(spec));
                if spec.required {
                    body = body.required(wire_name);
                }
            }
        }
    }
    if has_body {
        builder = builder.request_body(Some(
            RequestBodyBuilder::new()
                .content(JSON, ContentBuilder::new().schema(Some(body)).build())
                .required(Some(Required::True))
                .build(),
        ));
    }

    let success = route.success_status();
    let mut response = ResponseBuilder::new().description(route.summary);
    if let Some(schema) = response_schema(operation) {
        response = response.content(JSON, ContentBuilder::new().schema(Some(schema)).build());
        if operation.convention() == Convention::Eth2 {
            response = response.content(
                SSZ_CONTENT_TYPE,
                ContentBuilder::new()
                    .schema(Some(
                        ObjectBuilder::new()
                            .schema_type(Type::String)
                            .format(Some(SchemaFormat::KnownFormat(KnownFormat::Binary))),
                    ))
                    .build(),
            );
        }
    }
    builder = builder.response(success.as_u16().to_string(), response.build());

    for (status, description) in [
        ("400", "Malformed request"),
        ("401", "Missing or invalid bearer token"),
        ("404", "Unknown validator"),
        ("500", "Internal error"),
    ] {
        if status == "404" && !has_path_pubkey(operation) {
            continue;
        }
        builder = builder.response(
            status,
            ResponseBuilder::new()
                .description(description)
                .content(JSON, ContentBuilder::new().schema(Some(error_schema())).build())
                .build(),
        );
    }

    builder.build()
}

fn has_path_pubkey(operation: Operation) -> bool {
    operation
        .params()
        .iter()
        .any(|spec| spec.location == ParamLocation::Path)
}

// =============================================================================
// Schemas
// =============================================================================

fn string() -> ObjectBuilder {
    ObjectBuilder::new().schema_type(Type::String)
}

fn param_schema(spec: &ParamSpec) -> Schema {
    match spec.kind {
        ParamKind::Text => string().into(),
        ParamKind::TextList { unique } => ArrayBuilder::new()
            .items(string())
            .unique_items(unique)
            .into(),
        ParamKind::ObjectList => ArrayBuilder::new()
            .items(
                ObjectBuilder::new()
                    .schema_type(Type::Object)
                    .property("pubkey", string())
                    .required("pubkey")
                    .property("url", string())
                    .required("url"),
            )
            .into(),
        ParamKind::GasLimit => string().pattern(Some("^[1-9][0-9]*$")).into(),
        ParamKind::Graffiti => string().max_length(Some(GRAFFITI_MAX_BYTES)).into(),
    }
}

fn data(schema: impl Into<RefOr<Schema>>) -> RefOr<Schema> {
    ObjectBuilder::new()
        .schema_type(Type::Object)
        .property("data", schema)
        .required("data")
        .into()
}

fn list_of(item: RefOr<Schema>) -> RefOr<Schema> {
    data(ArrayBuilder::new().items(item))
}

/// Schema derived from `T` with its property names in wire form.
///
/// The models serialize camelCase for typed callers; the wire renames keys
/// to snake_case in the codec, so the document does the same.
fn wire_schema<T: ToSchema>() -> RefOr<Schema> {
    let derived = T::schema();
    serde_json::to_value(&derived)
        .map(snake_case_properties)
        .and_then(serde_json::from_value)
        .unwrap_or_else(|err| {
            tracing::warn!(schema = %T::name(), error = %err, "Failed to rename schema properties");
            derived
        })
}

fn snake_case_properties(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| {
                    let value = match (key.as_str(), value) {
                        ("properties", Value::Object(props)) => Value::Object(
                            props
                                .into_iter()
                                .map(|(name, schema)| {
                                    (camel_to_snake(&name), snake_case_properties(schema))
                                })
                                .collect(),
                        ),
                        ("required", Value::Array(names)) => Value::Array(
                            names
                                .into_iter()
                                .map(|name| match name {
                                    Value::String(name) => Value::String(camel_to_snake(&name)),
                                    other => other,
                                })
                                .collect(),
                        ),
                        (_, value) => snake_case_properties(value),
                    };
                    (key, value)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(snake_case_properties).collect()),
        other => other,
    }
}

fn response_schema(operation: Operation) -> Option<RefOr<Schema>> {
    let schema = match operation {
        Operation::ListKeys => list_of(wire_schema::<KeyEntry>()),
        Operation::ImportKeystores => list_of(wire_schema::<OperationResult<ImportStatus>>()),
        Operation::ImportRemoteKeys => {
            list_of(wire_schema::<OperationResult<ImportRemoteStatus>>())
        }
        Operation::DeleteKeys => wire_schema::<DeleteKeysResult>(),
        Operation::DeleteRemoteKeys => {
            list_of(wire_schema::<OperationResult<DeleteRemoteStatus>>())
        }
        Operation::ListRemoteKeys => list_of(wire_schema::<SignerDefinition>()),
        Operation::ListFeeRecipient => data(wire_schema::<FeeRecipientEntry>()),
        Operation::GetGasLimit => data(wire_schema::<GasLimitEntry>()),
        Operation::ListGraffiti => data(wire_schema::<GraffitiEntry>()),
        Operation::SetFeeRecipient
        | Operation::DeleteFeeRecipient
        | Operation::SetGasLimit
        | Operation::DeleteGasLimit
        | Operation::SetGraffiti
        | Operation::DeleteGraffiti => return None,
    };
    Some(schema)
}

fn error_schema() -> ObjectBuilder {
    ObjectBuilder::new()
        .schema_type(Type::Object)
        .property("message", string())
        .required("message")
}
