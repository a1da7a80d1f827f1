// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer-token middleware for Axum.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/eth/v1/keystores", get(handler))
//!     .layer(axum::middleware::from_fn_with_state(token, require_api_token));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{ApiToken, AuthError};

pub async fn require_api_token(
    State(token): State<Arc<ApiToken>>,
    request: Request,
    next: Next,
) -> Response {
    let auth_header = match request.headers().get(AUTHORIZATION) {
        Some(header) => header,
        None => return AuthError::MissingAuthHeader.into_response(),
    };

    let auth_str = match auth_header.to_str() {
        Ok(s) => s,
        Err(_) => return AuthError::InvalidAuthHeader.into_response(),
    };

    let presented = match auth_str.strip_prefix("Bearer ") {
        Some(t) => t.trim(),
        None => return AuthError::InvalidAuthHeader.into_response(),
    };

    if !token.verify(presented) {
        tracing::warn!(path = %request.uri().path(), "Rejected request with invalid API token");
        return AuthError::InvalidToken.into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    fn app() -> Router {
        let token = Arc::new(ApiToken::from_secret("letmein"));
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(from_fn_with_state(token, require_api_token))
    }

    async fn status_with(header: Option<&str>) -> StatusCode {
        let mut builder = HttpRequest::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        app()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn accepts_the_configured_token() {
        assert_eq!(status_with(Some("Bearer letmein")).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn rejects_missing_malformed_and_wrong_tokens() {
        assert_eq!(status_with(None).await, StatusCode::UNAUTHORIZED);
        assert_eq!(status_with(Some("Basic abc")).await, StatusCode::UNAUTHORIZED);
        assert_eq!(status_with(Some("Bearer nope")).await, StatusCode::UNAUTHORIZED);
    }
}
