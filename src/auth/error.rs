// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::identity::IdentityError;
use super::token::TokenError;
use crate::error::ApiError;

/// Authentication error type.
///
/// Everything except `InternalError` is answered with 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No authorization header present
    MissingAuthHeader,
    /// Invalid authorization header format
    InvalidAuthHeader,
    /// No client certificate on the connection
    MissingClientCertificate,
    /// Token is malformed
    MalformedToken,
    /// Token signature is invalid
    InvalidSignature,
    /// Token has expired
    TokenExpired,
    /// Access token used where a refresh token is required, or vice versa
    WrongTokenKind,
    /// Token was revoked by logout or refresh
    TokenRevoked,
    /// No directory record for the presented credential
    UserNotFound,
    /// Internal error
    InternalError(String),
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::MissingClientCertificate => "missing_client_certificate",
            AuthError::MalformedToken => "malformed_token",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::WrongTokenKind => "wrong_token_kind",
            AuthError::TokenRevoked => "token_revoked",
            AuthError::UserNotFound => "user_not_found",
            AuthError::InternalError(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingAuthHeader => write!(f, "No authorization token provided"),
            AuthError::InvalidAuthHeader => {
                write!(f, "Invalid authorization header format (expected 'Bearer <token>')")
            }
            AuthError::MissingClientCertificate => write!(f, "No client certificate provided"),
            AuthError::MalformedToken => write!(f, "Token is malformed"),
            AuthError::InvalidSignature => write!(f, "Token signature is invalid"),
            AuthError::TokenExpired => write!(f, "Token has expired"),
            AuthError::WrongTokenKind => write!(f, "Token cannot be used for this operation"),
            AuthError::TokenRevoked => write!(f, "Token has been revoked"),
            AuthError::UserNotFound => write!(f, "User not found"),
            AuthError::InternalError(msg) => write!(f, "Internal authentication error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidSignature => AuthError::InvalidSignature,
            TokenError::Expired => AuthError::TokenExpired,
            TokenError::Malformed => AuthError::MalformedToken,
            TokenError::InvalidDuration | TokenError::Signing(_) => {
                AuthError::InternalError(format!("Failed to generate tokens: {err}"))
            }
        }
    }
}

impl From<IdentityError> for AuthError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::NotFound => AuthError::UserNotFound,
            IdentityError::Unavailable(msg) => AuthError::InternalError(msg),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn missing_auth_returns_401() {
        let response = AuthError::MissingAuthHeader.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error_code"], "missing_auth_header");
        assert_eq!(body["error"], "No authorization token provided");
    }

    #[tokio::test]
    async fn internal_error_returns_500() {
        let response = AuthError::InternalError("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn token_errors_map_to_unauthorized_variants() {
        assert_eq!(AuthError::from(TokenError::Expired), AuthError::TokenExpired);
        assert_eq!(
            AuthError::from(TokenError::InvalidSignature),
            AuthError::InvalidSignature
        );
        assert_eq!(AuthError::from(TokenError::Malformed), AuthError::MalformedToken);
        assert!(matches!(
            AuthError::from(TokenError::Signing("key".to_string())),
            AuthError::InternalError(_)
        ));
    }

    #[test]
    fn identity_not_found_is_unauthorized() {
        let err = AuthError::from(IdentityError::NotFound);
        assert_eq!(err, AuthError::UserNotFound);
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }
}
