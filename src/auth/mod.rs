// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Smartcard (client certificate) login and JWT issuance for the API.
//!
//! ## Auth Flow
//!
//! 1. Browser presents the smartcard certificate during the TLS handshake
//! 2. `POST /api/auth/login`:
//!    - Subject DN is taken from the certificate
//!    - The identity directory resolves it to a user record
//!    - An access token and a refresh token (7x the access lifetime) are issued
//! 3. Browser sends `Authorization: Bearer <access token>` on later calls
//! 4. `POST /api/auth/refresh` trades the refresh token for a new pair
//!
//! ## Security
//!
//! - Tokens are HS256 with a secret read from the environment at startup
//! - Expiry is enforced with zero leeway
//! - Access and refresh tokens are not interchangeable
//! - Revocation is opt-in (`TOKEN_REVOCATION=true`)

pub mod certificate;
pub mod claims;
pub mod error;
pub mod extractor;
pub mod flow;
pub mod identity;
pub mod revocation;
pub mod roles;
pub mod token;

pub use certificate::ClientCertificate;
pub use claims::{Claims, TokenKind};
pub use error::AuthError;
pub use extractor::{BearerToken, ClientCert, OptionalBearerToken, PeerCertificate};
pub use flow::AuthFlow;
pub use identity::{IdentityError, IdentityQuery, IdentityResolver, MockDirectory};
pub use roles::Role;
pub use token::{TokenCodec, TokenError, TokenPair};
