// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults, and the [`ServerConfig`] loaded
//! from them once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8180` |
//! | `JWT_SECRET` | HMAC-SHA256 token secret | Development secret (warns) |
//! | `ACCESS_TOKEN_TTL_SECS` | Access token lifetime, 1s to 1 year; refresh is 7x | `86400` |
//! | `TOKEN_REVOCATION` | Revoke tokens on logout/refresh | `false` |
//! | `STATIC_DIR` | Built single-page app | `dist` |
//! | `TLS_CERT_PATH` | Server certificate chain (PEM) | Unset (plain HTTP) |
//! | `TLS_KEY_PATH` | Server private key (PEM) | Unset (plain HTTP) |
//! | `CLIENT_CA_PATH` | CA bundle for client certificates (PEM) | Unset (no client certs) |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{net::SocketAddr, path::PathBuf};

use chrono::Duration;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const ACCESS_TOKEN_TTL_ENV: &str = "ACCESS_TOKEN_TTL_SECS";
pub const TOKEN_REVOCATION_ENV: &str = "TOKEN_REVOCATION";
pub const STATIC_DIR_ENV: &str = "STATIC_DIR";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const CLIENT_CA_PATH_ENV: &str = "CLIENT_CA_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8180;
/// 24 hours.
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;
/// One year, so refresh tokens (7x) stay under a decade.
pub const MAX_ACCESS_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;
pub const DEFAULT_STATIC_DIR: &str = "dist";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Used only when `JWT_SECRET` is unset. Never deploy with it.
pub const DEVELOPMENT_JWT_SECRET: &str = "development-only-secret-change-me";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("TLS_CERT_PATH and TLS_KEY_PATH must be set together")]
    IncompleteTls,
    #[error("CLIENT_CA_PATH requires TLS_CERT_PATH and TLS_KEY_PATH")]
    ClientCaWithoutTls,
}

/// Server certificate material, plus the CA used to verify client
/// certificates when smartcard login is enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
    pub client_ca: Option<PathBuf>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub jwt_secret: String,
    /// Whether `jwt_secret` came from the environment.
    pub jwt_secret_configured: bool,
    pub access_token_ttl: Duration,
    pub token_revocation: bool,
    pub static_dir: PathBuf,
    pub tls: Option<TlsPaths>,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("addr", &self.addr)
            .field("jwt_secret", &"<redacted>")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("token_revocation", &self.token_revocation)
            .field("static_dir", &self.static_dir)
            .field("tls", &self.tls)
            .finish()
    }
}

impl ServerConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get(PORT_ENV) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: PORT_ENV,
                expected: "a port number",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };
        let addr = format!("{host}:{port}")
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::Invalid {
                name: HOST_ENV,
                expected: "an IP address",
                value: host,
            })?;

        let ttl_secs = match get(ACCESS_TOKEN_TTL_ENV) {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(secs) if (1..=MAX_ACCESS_TOKEN_TTL_SECS).contains(&secs) => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: ACCESS_TOKEN_TTL_ENV,
                        expected: "between 1 and 31536000 seconds",
                        value: raw,
                    })
                }
            },
            None => DEFAULT_ACCESS_TOKEN_TTL_SECS,
        };

        let token_revocation = match get(TOKEN_REVOCATION_ENV) {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid {
                name: TOKEN_REVOCATION_ENV,
                expected: "true or false",
                value: raw,
            })?,
            None => false,
        };

        let (jwt_secret, jwt_secret_configured) = match get(JWT_SECRET_ENV) {
            Some(secret) => (secret, true),
            None => (DEVELOPMENT_JWT_SECRET.to_string(), false),
        };

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
                client_ca: get(CLIENT_CA_PATH_ENV).map(PathBuf::from),
            }),
            (None, None) => {
                if get(CLIENT_CA_PATH_ENV).is_some() {
                    return Err(ConfigError::ClientCaWithoutTls);
                }
                None
            }
            _ => return Err(ConfigError::IncompleteTls),
        };

        Ok(Self {
            addr,
            jwt_secret,
            jwt_secret_configured,
            access_token_ttl: Duration::seconds(ttl_secs),
            token_revocation,
            static_dir: get(STATIC_DIR_ENV)
                .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string())
                .into(),
            tls,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
