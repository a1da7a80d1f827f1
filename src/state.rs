// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::{auth::ApiToken, keymanager::KeyManager};

#[derive(Clone)]
pub struct AppState {
    pub keymanager: Arc<KeyManager>,
    /// `None` serves the API without authentication.
    pub api_token: Option<Arc<ApiToken>>,
}

impl AppState {
    pub fn new(keymanager: KeyManager, api_token: Option<ApiToken>) -> Self {
        Self {
            keymanager: Arc::new(keymanager),
            api_token: api_token.map(Arc::new),
        }
    }
}
