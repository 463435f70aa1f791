// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies used by the REST API. Field names follow the
//! browser client (`firstName`, `subjectName`, `refreshToken`, ...), so every
//! type is serialized in camelCase.
//!
//! ## Model Categories
//!
//! - **Users**: directory records returned on login and `/api/auth/me`
//! - **Tokens**: login and refresh responses
//! - **Registration**: new-user submissions
//! - **Certificates**: client certificate status

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Role;

// =============================================================================
// User Models
// =============================================================================

/// A user record resolved from the identity directory.
///
/// Records live for the duration of one request; nothing is persisted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Directory identifier.
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub rank: String,
    /// Organizational code.
    #[serde(rename = "jdir")]
    pub org_code: String,
    /// Certificate subject distinguished name.
    pub subject_name: String,
    /// Records without a role are regular users.
    #[serde(default)]
    pub role: Role,
}

// =============================================================================
// Token Models
// =============================================================================

/// Response to a successful certificate login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: User,
    /// Short-lived access token.
    pub token: String,
    /// Refresh token, valid seven times longer than the access token.
    pub refresh_token: String,
}

/// Request body for `POST /api/auth/refresh`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: String,
}

/// A freshly issued access/refresh token pair.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub token: String,
    pub refresh_token: String,
}

/// Plain acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// Registration Models
// =============================================================================

/// A new-user submission.
///
/// `firstName`, `lastName` and `email` are required; everything else may be
/// omitted or left empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub rank: String,
    /// Organizational code.
    #[serde(rename = "jdir")]
    pub org_code: String,
}

// =============================================================================
// Certificate Models
// =============================================================================

/// Details of the client certificate presented on the current connection.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificateStatusResponse {
    /// `valid`, `expired` or `not_yet_valid`.
    pub status: String,
    /// Subject DN (RFC 2253).
    pub subject: String,
    /// Issuer DN (RFC 2253).
    pub issuer: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    /// SHA-256 over the DER encoding, colon-separated hex.
    pub fingerprint: String,
    /// Whether the current time falls within `[notBefore, notAfter]`.
    pub valid: bool,
}
