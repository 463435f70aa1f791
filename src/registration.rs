// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! New-user registration.
//!
//! Submissions are validated and acknowledged. Nothing is stored and no
//! token is issued; an account only becomes usable once the directory knows
//! the user's certificate.

use tracing::info;

use crate::models::RegistrationRequest;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    #[error("Missing required fields")]
    MissingRequiredField(&'static str),
}

/// Check that `firstName`, `lastName` and `email` are present.
///
/// Whitespace-only values count as missing. Optional fields are not looked at.
pub fn validate(request: &RegistrationRequest) -> Result<(), RegistrationError> {
    let required = [
        ("firstName", &request.first_name),
        ("lastName", &request.last_name),
        ("email", &request.email),
    ];

    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(RegistrationError::MissingRequiredField(field));
        }
    }
    Ok(())
}

/// Validate and accept a submission.
pub fn register(request: &RegistrationRequest) -> Result<(), RegistrationError> {
    validate(request)?;
    info!(rank = %request.rank, org_code = %request.org_code, "registration accepted");
    Ok(())
}
