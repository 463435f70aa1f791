// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for caller-presented credentials.
//!
//! ```rust,ignore
//! async fn me(BearerToken(token): BearerToken) -> impl IntoResponse { /* ... */ }
//! async fn login(ClientCert(cert): ClientCert) -> impl IntoResponse { /* ... */ }
//! ```

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use super::{certificate::ClientCertificate, AuthError};

/// Request extension carrying the certificate the client presented during
/// the TLS handshake, if any. Attached per connection by
/// [`ClientCertAcceptor`](crate::tls::ClientCertAcceptor).
#[derive(Debug, Clone, Default)]
pub struct PeerCertificate(pub Option<Arc<ClientCertificate>>);

/// Extractor for a `Bearer` token from the Authorization header.
pub struct BearerToken(pub String);

impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?.ok_or(AuthError::MissingAuthHeader)?;
        Ok(BearerToken(token.to_string()))
    }
}

/// Optional bearer token.
///
/// Returns `None` if the header is missing or malformed, instead of rejecting.
pub struct OptionalBearerToken(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for OptionalBearerToken {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok().flatten();
        Ok(OptionalBearerToken(token.map(str::to_string)))
    }
}

/// Extractor that requires a client certificate on the connection.
pub struct ClientCert(pub Arc<ClientCertificate>);

impl<S: Send + Sync> FromRequestParts<S> for ClientCert {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<PeerCertificate>()
            .and_then(|peer| peer.0.clone())
            .map(ClientCert)
            .ok_or(AuthError::MissingClientCertificate)
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
///
/// `Ok(None)` when the header is absent.
fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let token = value
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeader)?
        .trim();

    if token.is_empty() || token.contains(' ') {
        return Err(AuthError::InvalidAuthHeader);
    }
    Ok(Some(token))
}
