// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Typed HTTP client for the key manager API.
//!
//! Requests go through the same route table and codec as the server, so a
//! [`Request`] sent here arrives as the identical typed value on the other
//! side.

use std::time::Duration;

use reqwest::{
    header::{ACCEPT, CONTENT_TYPE},
    Client, StatusCode,
};
use serde_json::Value;
use url::Url;

use crate::{
    api::{
        codec::{self, CodecError, Encoding, SSZ_CONTENT_TYPE},
        routes::Convention,
    },
    error::ErrorBody,
    keymanager::{Request, Response},
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid base url: {0}")]
    InvalidUrl(String),

    #[error("failed to encode request: {0}")]
    Encode(#[source] CodecError),

    #[error("failed to decode response: {0}")]
    Decode(#[source] CodecError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("server returned {found}, expected {expected}")]
    UnexpectedStatus {
        expected: StatusCode,
        found: StatusCode,
    },
}

pub struct KeymanagerClient {
    base_url: Url,
    token: Option<String>,
    encoding: Encoding,
    http: Client,
}

impl KeymanagerClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            base_url,
            token,
            encoding: Encoding::Json,
            http,
        })
    }

    /// Ask for the binary encoding on operations that offer one.
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let operation = request.operation();
        let route = operation.route();
        let wire = codec::encode_request(request).map_err(ClientError::Encode)?;

        let path = route
            .render_path(&wire.path_params)
            .ok_or_else(|| ClientError::Encode(CodecError::MissingParam("pubkey".into())))?;
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))?;

        let mut builder = self.http.request(route.method.as_http(), url);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        if self.encoding == Encoding::Ssz && operation.convention() == Convention::Eth2 {
            builder = builder.header(ACCEPT, SSZ_CONTENT_TYPE);
        }
        if let Some(body) = &wire.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let is_ssz = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with(SSZ_CONTENT_TYPE));
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .map(|body| body.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
            return Err(ClientError::Api { status, message });
        }
        let expected = route.success_status();
        if status != expected {
            return Err(ClientError::UnexpectedStatus {
                expected,
                found: status,
            });
        }

        if is_ssz {
            return codec::decode_gas_limit_ssz(&bytes).map_err(ClientError::Decode);
        }
        let body = if bytes.is_empty() {
            None
        } else {
            Some(
                serde_json::from_slice::<Value>(&bytes)
                    .map_err(|e| ClientError::Decode(CodecError::Schema(e)))?,
            )
        };
        codec::decode_response(operation, body).map_err(ClientError::Decode)
    }
}
