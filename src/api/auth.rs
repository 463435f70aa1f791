// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;

use crate::{
    auth::{AuthError, BearerToken, ClientCert, OptionalBearerToken},
    error::ApiError,
    models::{
        AuthResponse, CertificateStatusResponse, MessageResponse, RefreshRequest,
        TokenPairResponse, User,
    },
    state::AppState,
};

/// Log in with the client certificate presented on this connection.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    responses(
        (status = 200, description = "User record and token pair", body = AuthResponse),
        (status = 401, description = "No client certificate or no matching user"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ClientCert(cert): ClientCert,
) -> Result<Json<AuthResponse>, AuthError> {
    Ok(Json(state.auth.login(&cert).await?))
}

/// Describe the client certificate presented on this connection.
#[utoipa::path(
    get,
    path = "/api/auth/cert-status",
    tag = "Auth",
    responses(
        (status = 200, description = "Certificate details", body = CertificateStatusResponse),
        (status = 401, description = "No client certificate"),
    )
)]
pub async fn certificate_status(
    State(state): State<AppState>,
    ClientCert(cert): ClientCert,
) -> Json<CertificateStatusResponse> {
    Json(state.auth.certificate_status(&cert, Utc::now()))
}

/// Acknowledge a logout.
///
/// Tokens stay valid until they expire unless revocation is enabled.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses((status = 200, description = "Logged out", body = MessageResponse))
)]
pub async fn logout(
    State(state): State<AppState>,
    OptionalBearerToken(token): OptionalBearerToken,
) -> Json<MessageResponse> {
    state.auth.logout(token.as_deref()).await;
    Json(MessageResponse::new("Logged out successfully"))
}

/// Get the user behind the bearer access token.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Missing, invalid or expired token"),
    )
)]
pub async fn current_user(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<User>, AuthError> {
    Ok(Json(state.auth.current_user(&token).await?))
}

/// Trade a refresh token for a new token pair.
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    tag = "Auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair", body = TokenPairResponse),
        (status = 400, description = "Body is not a refresh request"),
        (status = 401, description = "Invalid, expired or revoked refresh token"),
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<TokenPairResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::invalid_body("Invalid request", &e))?;
    let pair = state.auth.refresh(&request.refresh_token).await?;

    Ok(Json(TokenPairResponse {
        token: pair.access_token,
        refresh_token: pair.refresh_token,
    }))
}
