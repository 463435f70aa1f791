// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims issued by this service.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::roles::Role;
use crate::models::User;

/// Which half of a token pair a token is.
///
/// Access tokens authenticate API calls; refresh tokens are only accepted by
/// the refresh endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

/// Signed payload identifying the bearer and the validity window.
///
/// `iat` and `exp` are Unix timestamps in seconds. `jti` uniquely identifies
/// the token so it can be revoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    pub email: String,
    pub subject_dn: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    pub jti: Uuid,
    pub kind: TokenKind,
}

impl Claims {
    /// Build claims for `user` valid over `[iat, exp]`.
    pub fn for_user(user: &User, kind: TokenKind, iat: i64, exp: i64) -> Self {
        Self {
            user_id: user.id.clone(),
            email: user.email.clone(),
            subject_dn: user.subject_name.clone(),
            role: user.role,
            iat,
            exp,
            jti: Uuid::new_v4(),
            kind,
        }
    }

    /// Whether two claim sets identify the same bearer.
    pub fn same_subject(&self, other: &Claims) -> bool {
        self.user_id == other.user_id
            && self.email == other.email
            && self.subject_dn == other.subject_dn
            && self.role == other.role
    }
}
