// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{path::PathBuf, sync::Arc};

use chrono::Duration;

use crate::auth::{AuthFlow, IdentityResolver, MockDirectory, TokenCodec};
use crate::config::{ServerConfig, DEFAULT_STATIC_DIR};

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthFlow>,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(auth: AuthFlow, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            auth: Arc::new(auth),
            static_dir: static_dir.into(),
        }
    }

    /// Build the state described by `config`, resolving identities with
    /// `identities`.
    pub fn from_config(config: &ServerConfig, identities: Arc<dyn IdentityResolver>) -> Self {
        let codec = TokenCodec::new(config.jwt_secret.as_bytes(), config.access_token_ttl);
        let mut auth = AuthFlow::new(codec, identities);
        if config.token_revocation {
            auth = auth.with_revocation();
        }
        Self::new(auth, config.static_dir.clone())
    }
}

impl Default for AppState {
    /// Mock directory, a throwaway secret and 24h access tokens.
    fn default() -> Self {
        let codec = TokenCodec::new(b"default-state-secret", Duration::hours(24));
        Self::new(
            AuthFlow::new(codec, Arc::new(MockDirectory::new())),
            DEFAULT_STATIC_DIR,
        )
    }
}
