// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Health check response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    /// Individual health checks and their results.
    pub checks: HealthChecks,
}

/// Individual health check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    /// Whether the service process is running.
    pub service: String,
    /// Static asset directory availability ("ok" or "missing").
    pub static_dir: String,
    /// Whether logout/refresh revoke tokens ("enabled" or "disabled").
    pub token_revocation: String,
}

/// Health check endpoint handler.
///
/// Returns 200 if all checks pass, 503 if the static asset directory is missing.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is degraded", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let static_ok = state.static_dir.is_dir();

    let response = HealthResponse {
        status: if static_ok { "ok" } else { "degraded" }.to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            static_dir: if static_ok { "ok" } else { "missing" }.to_string(),
            token_revocation: if state.auth.revocation_enabled() {
                "enabled"
            } else {
                "disabled"
            }
            .to_string(),
        },
    };

    let status = if static_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn healthy_when_static_dir_exists() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::default();
        state.static_dir = dir.path().to_path_buf();

        let (status, Json(body)) = health(State(state)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.checks.static_dir, "ok");
        assert_eq!(body.checks.token_revocation, "disabled");
    }

    #[tokio::test]
    async fn degraded_when_static_dir_missing() {
        let mut state = AppState::default();
        state.static_dir = "/definitely/not/here".into();

        let (status, Json(body)) = health(State(state)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "degraded");
        assert_eq!(body.checks.static_dir, "missing");
    }
}
