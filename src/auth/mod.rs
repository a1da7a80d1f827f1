// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer-token authentication for the key manager API.
//!
//! ## Auth Flow
//!
//! 1. On first start the server writes a random token to the token file
//!    (`$DATA_DIR/api-token.txt` unless configured otherwise)
//! 2. The operator hands the file contents to their tooling
//! 3. Every key manager route requires `Authorization: Bearer <token>`
//!
//! ## Security
//!
//! - The token file is created with owner-only permissions on Unix
//! - Only the SHA-256 digest of the token is kept in memory
//! - The OpenAPI document and Swagger UI are served without authentication

pub mod error;
pub mod middleware;
pub mod token;

pub use error::AuthError;
pub use middleware::require_api_token;
pub use token::{ApiToken, TokenError};
