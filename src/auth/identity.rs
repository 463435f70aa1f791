// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity resolution.
//!
//! Maps a certificate subject or a user id onto a directory record. The
//! [`AuthFlow`](super::AuthFlow) only sees the [`IdentityResolver`] trait, so
//! the bundled [`MockDirectory`] can be replaced by an LDAP or database
//! backed resolver without touching the flow.

use async_trait::async_trait;

use super::Role;
use crate::models::User;

/// What to look a user up by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityQuery<'a> {
    /// Certificate subject distinguished name.
    SubjectDn(&'a str),
    /// Directory identifier (the `userId` claim).
    UserId(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("no matching identity")]
    NotFound,
    #[error("identity directory unavailable: {0}")]
    Unavailable(String),
}

/// Resolves identities against a directory.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, query: IdentityQuery<'_>) -> Result<User, IdentityError>;

    async fn resolve_by_subject_dn(&self, dn: &str) -> Result<User, IdentityError> {
        self.resolve(IdentityQuery::SubjectDn(dn)).await
    }

    async fn resolve_by_id(&self, id: &str) -> Result<User, IdentityError> {
        self.resolve(IdentityQuery::UserId(id)).await
    }
}

/// DN reported for records looked up by id.
const MOCK_SUBJECT_DN: &str = "CN=John Doe,O=Example,C=US";

/// Stand-in directory that answers every non-blank query with one fixed
/// record.
///
/// Lookups by subject echo the presented DN; lookups by id echo the id.
#[derive(Debug, Clone, Default)]
pub struct MockDirectory;

impl MockDirectory {
    pub fn new() -> Self {
        Self
    }

    fn record(id: &str, subject_name: &str) -> User {
        User {
            id: id.to_string(),
            email: "user@example.com".to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            rank: "Capt".to_string(),
            org_code: "ABC123".to_string(),
            subject_name: subject_name.to_string(),
            role: Role::User,
        }
    }
}

#[async_trait]
impl IdentityResolver for MockDirectory {
    async fn resolve(&self, query: IdentityQuery<'_>) -> Result<User, IdentityError> {
        match query {
            IdentityQuery::SubjectDn(dn) if !dn.trim().is_empty() => Ok(Self::record("1", dn)),
            IdentityQuery::UserId(id) if !id.trim().is_empty() => {
                Ok(Self::record(id, MOCK_SUBJECT_DN))
            }
            _ => Err(IdentityError::NotFound),
        }
    }
}
