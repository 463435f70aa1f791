// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Smartcard Auth Server - Certificate Login & JWT Issuance
//!
//! Exchanges the client certificate presented during the TLS handshake for a
//! signed access/refresh token pair and serves the built single-page app.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Certificate login, token codec and identity lookup
//! - `registration` - New-user registration validation
//! - `tls` - TLS termination and client certificate capture

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod registration;
pub mod state;
pub mod tls;
