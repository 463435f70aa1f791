// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! TLS termination and client certificate capture.
//!
//! When a client CA is configured the server asks every client for a
//! certificate and verifies it against that CA. Anonymous clients are still
//! let through so certificate-only endpoints can answer 401 themselves.
//!
//! [`ClientCertAcceptor`] runs after the handshake, parses the leaf
//! certificate once per connection and attaches it to every request on that
//! connection as a [`PeerCertificate`] extension.

use std::{fs, future::Future, io, path::Path, pin::Pin, sync::Arc};

use axum::{middleware::AddExtension, Extension};
use axum_server::{
    accept::Accept,
    tls_rustls::{RustlsAcceptor, RustlsConfig},
};
use rustls::{
    pki_types::{
        CertificateDer, PrivateKeyDer, PrivatePkcs1KeyDer, PrivatePkcs8KeyDer, PrivateSec1KeyDer,
    },
    server::WebPkiClientVerifier,
    RootCertStore, ServerConfig,
};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_rustls::server::TlsStream;
use tower::Layer;
use tracing::{debug, warn};

use crate::auth::{ClientCertificate, PeerCertificate};
use crate::config::TlsPaths;

#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("invalid PEM in {path}: {source}")]
    Pem { path: String, source: pem::PemError },
    #[error("no certificates found in {0}")]
    NoCertificates(String),
    #[error("no private key found in {0}")]
    NoPrivateKey(String),
    #[error("client certificate verifier: {0}")]
    ClientVerifier(String),
    #[error("TLS configuration rejected: {0}")]
    Rustls(#[from] rustls::Error),
}

fn read_pem(path: &Path) -> Result<Vec<pem::Pem>, TlsError> {
    let display = path.display().to_string();
    let bytes = fs::read(path).map_err(|source| TlsError::Read {
        path: display.clone(),
        source,
    })?;
    pem::parse_many(bytes).map_err(|source| TlsError::Pem {
        path: display,
        source,
    })
}

/// Load every `CERTIFICATE` block from a PEM file.
pub fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    let certs: Vec<_> = read_pem(path)?
        .into_iter()
        .filter(|block| block.tag() == "CERTIFICATE")
        .map(|block| CertificateDer::from(block.into_contents()))
        .collect();

    if certs.is_empty() {
        return Err(TlsError::NoCertificates(path.display().to_string()));
    }
    Ok(certs)
}

/// Load the first PKCS#8, PKCS#1 or SEC1 private key from a PEM file.
pub fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>, TlsError> {
    read_pem(path)?
        .into_iter()
        .find_map(|block| match block.tag() {
            "PRIVATE KEY" => Some(PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(
                block.into_contents(),
            ))),
            "RSA PRIVATE KEY" => Some(PrivateKeyDer::Pkcs1(PrivatePkcs1KeyDer::from(
                block.into_contents(),
            ))),
            "EC PRIVATE KEY" => Some(PrivateKeyDer::Sec1(PrivateSec1KeyDer::from(
                block.into_contents(),
            ))),
            _ => None,
        })
        .ok_or_else(|| TlsError::NoPrivateKey(path.display().to_string()))
}

/// Build the rustls server configuration for `paths`.
pub fn server_config(paths: &TlsPaths) -> Result<ServerConfig, TlsError> {
    let certs = load_certs(&paths.cert)?;
    let key = load_private_key(&paths.key)?;

    let builder = ServerConfig::builder();
    let mut config = match &paths.client_ca {
        Some(ca_path) => {
            let mut roots = RootCertStore::empty();
            for ca in load_certs(ca_path)? {
                roots.add(ca)?;
            }
            let verifier = WebPkiClientVerifier::builder(Arc::new(roots))
                .allow_unauthenticated()
                .build()
                .map_err(|e| TlsError::ClientVerifier(e.to_string()))?;
            builder
                .with_client_cert_verifier(verifier)
                .with_single_cert(certs, key)?
        }
        None => builder.with_no_client_auth().with_single_cert(certs, key)?,
    };
    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    Ok(config)
}

/// Parse the leaf of a presented chain.
///
/// Unparseable certificates are logged and treated as absent.
pub fn peer_certificate(chain: Option<&[CertificateDer<'_>]>) -> PeerCertificate {
    let Some(leaf) = chain.and_then(|chain| chain.first()) else {
        return PeerCertificate(None);
    };

    match ClientCertificate::from_der(leaf.as_ref()) {
        Ok(cert) => {
            debug!(subject = cert.subject(), "client certificate presented");
            PeerCertificate(Some(Arc::new(cert)))
        }
        Err(e) => {
            warn!(error = %e, "ignoring unparseable client certificate");
            PeerCertificate(None)
        }
    }
}

/// Rustls acceptor that attaches the client certificate to each request.
#[derive(Clone)]
pub struct ClientCertAcceptor {
    inner: RustlsAcceptor,
}

impl ClientCertAcceptor {
    pub fn new(config: RustlsConfig) -> Self {
        Self {
            inner: RustlsAcceptor::new(config),
        }
    }
}

impl<I, S> Accept<I, S> for ClientCertAcceptor
where
    I: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    S: Send + 'static,
{
    type Stream = TlsStream<I>;
    type Service = AddExtension<S, PeerCertificate>;
    type Future = Pin<Box<dyn Future<Output = io::Result<(Self::Stream, Self::Service)>> + Send>>;

    fn accept(&self, stream: I, service: S) -> Self::Future {
        let acceptor = self.inner.clone();
        Box::pin(async move {
            let (stream, service) = acceptor.accept(stream, service).await?;
            let peer = peer_certificate(stream.get_ref().1.peer_certificates());
            Ok((stream, Extension(peer).layer(service)))
        })
    }
}
