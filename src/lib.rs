// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Validator Key Manager API
//!
//! A local HTTP API through which an operator manages the signing keys of a
//! validator client: local keystores with their slashing protection history,
//! remote signer references, and per-validator proposer overrides.
//!
//! ## Modules
//!
//! - `api` - route table, wire codec, HTTP router and OpenAPI document
//! - `auth` - bearer token issued at startup
//! - `keymanager` - the operations behind every route
//! - `storage` - redb-backed key, signer and override store
//! - `client` - typed HTTP client built on the same route table

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod keymanager;
pub mod keystore;
pub mod models;
pub mod state;
pub mod status;
pub mod storage;
pub mod validation;
