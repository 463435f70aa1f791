// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Client certificate (smartcard) details.
//!
//! Distinguished names are rendered in RFC 2253 order, most specific RDN
//! first and no spaces after the separators, e.g. `CN=Jane Doe,O=Org,C=US`.
//! That string is what the directory is queried with and what ends up in the
//! `subjectName` of the resolved user.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use x509_parser::objects::{oid2abbrev, oid_registry};
use x509_parser::prelude::{FromDer, X509Certificate, X509Name};

#[derive(Debug, thiserror::Error)]
pub enum CertificateError {
    #[error("certificate is not valid DER X.509: {0}")]
    Parse(String),
    #[error("certificate validity period is out of range")]
    Validity,
}

/// Where "now" falls relative to a certificate's validity window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateValidity {
    Valid,
    Expired,
    NotYetValid,
}

impl CertificateValidity {
    pub fn as_str(&self) -> &'static str {
        match self {
            CertificateValidity::Valid => "valid",
            CertificateValidity::Expired => "expired",
            CertificateValidity::NotYetValid => "not_yet_valid",
        }
    }
}

/// The leaf certificate a client presented during the TLS handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCertificate {
    subject: String,
    issuer: String,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
    der: Vec<u8>,
}

impl ClientCertificate {
    pub fn new(
        subject: impl Into<String>,
        issuer: impl Into<String>,
        not_before: DateTime<Utc>,
        not_after: DateTime<Utc>,
        der: Vec<u8>,
    ) -> Self {
        Self {
            subject: subject.into(),
            issuer: issuer.into(),
            not_before,
            not_after,
            der,
        }
    }

    /// Parse a DER-encoded X.509 certificate.
    pub fn from_der(der: &[u8]) -> Result<Self, CertificateError> {
        let (_, cert) =
            X509Certificate::from_der(der).map_err(|e| CertificateError::Parse(e.to_string()))?;

        let validity = cert.validity();
        let not_before = DateTime::from_timestamp(validity.not_before.timestamp(), 0)
            .ok_or(CertificateError::Validity)?;
        let not_after = DateTime::from_timestamp(validity.not_after.timestamp(), 0)
            .ok_or(CertificateError::Validity)?;

        Ok(Self {
            subject: rfc2253(cert.subject()),
            issuer: rfc2253(cert.issuer()),
            not_before,
            not_after,
            der: der.to_vec(),
        })
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn not_before(&self) -> DateTime<Utc> {
        self.not_before
    }

    pub fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    /// SHA-256 over the DER encoding as colon-separated upper-case hex.
    pub fn fingerprint(&self) -> String {
        Sha256::digest(&self.der)
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(":")
    }

    pub fn validity_at(&self, now: DateTime<Utc>) -> CertificateValidity {
        if now < self.not_before {
            CertificateValidity::NotYetValid
        } else if now > self.not_after {
            CertificateValidity::Expired
        } else {
            CertificateValidity::Valid
        }
    }
}

/// Render a name most-specific RDN first, multi-valued RDNs joined by `+`.
fn rfc2253(name: &X509Name<'_>) -> String {
    let registry = oid_registry();
    let rdns: Vec<_> = name.iter_rdn().collect();

    rdns.iter()
        .rev()
        .map(|rdn| {
            rdn.iter()
                .map(|attr| {
                    let key = oid2abbrev(attr.attr_type(), registry)
                        .map(str::to_string)
                        .unwrap_or_else(|_| attr.attr_type().to_id_string());
                    let value = match attr.as_str() {
                        Ok(s) => escape_value(s),
                        Err(_) => hex_value(attr.attr_value().data),
                    };
                    format!("{key}={value}")
                })
                .collect::<Vec<_>>()
                .join("+")
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let last = value.chars().count().saturating_sub(1);
    for (i, c) in value.chars().enumerate() {
        let special = matches!(c, ',' | '+' | '"' | '\\' | '<' | '>' | ';')
            || (i == 0 && (c == '#' || c == ' '))
            || (i == last && c == ' ');
        if special {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn hex_value(bytes: &[u8]) -> String {
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!("#{hex}")
}
