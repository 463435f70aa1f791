// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::rejection::JsonRejection, http::StatusCode, Json};

use crate::{
    error::ApiError,
    models::{MessageResponse, RegistrationRequest},
    registration,
};

/// Submit a new-user registration.
///
/// The submission is validated and acknowledged; nothing is stored.
#[utoipa::path(
    post,
    path = "/api/register",
    tag = "Registration",
    request_body = RegistrationRequest,
    responses(
        (status = 201, description = "Registration accepted", body = MessageResponse),
        (status = 400, description = "Invalid body or missing required fields"),
    )
)]
pub async fn register_user(
    payload: Result<Json<RegistrationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::invalid_body("Invalid request body", &e))?;
    registration::register(&request)?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn register_success() {
        let request = RegistrationRequest {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "jane@example.com".to_string(),
            ..Default::default()
        };

        let (status, Json(body)) = register_user(Ok(Json(request))).await.unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.message, "User registered successfully");
    }

    #[tokio::test]
    async fn register_missing_fields_fails() {
        let request = RegistrationRequest {
            last_name: "Doe".to_string(),
            email: "jane@example.com".to_string(),
            ..Default::default()
        };

        match register_user(Ok(Json(request))).await {
            Err(err) => {
                assert_eq!(err.status, StatusCode::BAD_REQUEST);
                assert_eq!(err.message, "Missing required fields");
            }
            Ok(_) => panic!("expected missing field error"),
        }
    }
}
