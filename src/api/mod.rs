// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # HTTP Surface
//!
//! Every route is generated from the [`routes`] table. A request flows
//! through one generic handler:
//!
//! 1. [`codec::decode_request`] turns path parameters and the JSON body into
//!    a typed [`Request`]
//! 2. [`KeyManager::execute`](crate::keymanager::KeyManager::execute) runs it
//!    on the blocking pool
//! 3. [`codec::encode_response`] renders the typed [`Response`] with the
//!    route's success status

use std::{collections::BTreeMap, time::Duration};

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::{header::ACCEPT, HeaderMap, HeaderValue, Method as HttpMethod},
    middleware::from_fn_with_state,
    routing::{on, MethodFilter, MethodRouter},
    Router,
};
use serde_json::Value;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::require_api_token,
    error::ApiError,
    keymanager::{Request, Response},
    state::AppState,
};

pub mod codec;
pub mod docs;
pub mod naming;
pub mod routes;

use codec::{Encoding, WireRequest, WireResponse, SSZ_CONTENT_TYPE};
use routes::{Method, Operation};

/// Keystore imports carry whole keystores and interchange files.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

pub fn router(state: AppState, cors_origin: Option<&str>) -> Router {
    let mut api = Router::new();
    for (path, method_router) in method_routers() {
        api = api.route(path, method_router);
    }
    if let Some(token) = state.api_token.clone() {
        api = api.route_layer(from_fn_with_state(token, require_api_token));
    }

    let mut app = api
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", docs::openapi()))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    if let Some(origin) = cors_origin {
        match HeaderValue::from_str(origin) {
            Ok(origin) => {
                app = app.layer(
                    CorsLayer::new()
                        .allow_origin(AllowOrigin::exact(origin))
                        .allow_methods([HttpMethod::GET, HttpMethod::POST, HttpMethod::DELETE])
                        .allow_headers(tower_http::cors::Any)
                        .max_age(Duration::from_secs(3600)),
                );
            }
            Err(e) => tracing::warn!(origin, error = %e, "Ignoring invalid CORS origin"),
        }
    }
    app
}

/// One method router per distinct path, merging the operations that share it.
fn method_routers() -> BTreeMap<&'static str, MethodRouter<AppState>> {
    let mut by_path: BTreeMap<&'static str, MethodRouter<AppState>> = BTreeMap::new();
    for operation in Operation::ALL {
        let route = operation.route();
        let method_router = operation_handler(operation);
        let merged = match by_path.remove(route.path) {
            Some(existing) => existing.merge(method_router),
            None => method_router,
        };
        by_path.insert(route.path, merged);
    }
    by_path
}

fn operation_handler(operation: Operation) -> MethodRouter<AppState> {
    let route = operation.route();
    let filter = match route.method {
        Method::Get => MethodFilter::GET,
        Method::Post => MethodFilter::POST,
        Method::Delete => MethodFilter::DELETE,
    };

    if route.path_params().is_empty() {
        on(
            filter,
            move |State(state): State<AppState>, headers: HeaderMap, body: Bytes| async move {
                dispatch(state, operation, BTreeMap::new(), headers, body).await
            },
        )
    } else {
        on(
            filter,
            move |State(state): State<AppState>,
                  Path(params): Path<BTreeMap<String, String>>,
                  headers: HeaderMap,
                  body: Bytes| async move {
                dispatch(state, operation, params, headers, body).await
            },
        )
    }
}

async fn dispatch(
    state: AppState,
    operation: Operation,
    path_params: BTreeMap<String, String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<WireResponse, ApiError> {
    let body = parse_body(&body)?;
    let request = codec::decode_request(operation, WireRequest { path_params, body })?;

    let response = execute(&state, request).await?;

    codec::encode_response(&response, response_encoding(&headers)).map_err(|e| {
        tracing::error!(operation = ?operation, error = %e, "Failed to encode response");
        ApiError::internal("failed to encode response")
    })
}

async fn execute(state: &AppState, request: Request) -> Result<Response, ApiError> {
    let keymanager = state.keymanager.clone();
    tokio::task::spawn_blocking(move || keymanager.execute(request))
        .await
        .map_err(|e| ApiError::internal(format!("Key manager task failed: {e}")))?
}

fn parse_body(body: &Bytes) -> Result<Option<Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {e}")))
}

fn response_encoding(headers: &HeaderMap) -> Encoding {
    let wants_ssz = headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .any(|media| {
            media
                .split(';')
                .next()
                .is_some_and(|media_type| media_type.trim().eq_ignore_ascii_case(SSZ_CONTENT_TYPE))
        });
    if wants_ssz {
        Encoding::Ssz
    } else {
        Encoding::Json
    }
}
