// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{process, sync::Arc, time::Duration};

use axum_server::{tls_rustls::RustlsConfig, Handle};
use tracing::{error, info, warn};

use smartcard_auth_server::{
    api::router,
    auth::MockDirectory,
    config::{ServerConfig, JWT_SECRET_ENV},
    logging::{self, LogFormat},
    state::AppState,
    tls::{self, ClientCertAcceptor},
};

/// How long in-flight requests get to finish after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    logging::init(LogFormat::from_env());

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            process::exit(1);
        }
    };
    info!(?config, "configuration loaded");

    if !config.jwt_secret_configured {
        warn!("{JWT_SECRET_ENV} not set, signing tokens with the development secret");
    }

    // Install the ring crypto provider for rustls (must be done before any TLS operations)
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        warn!("rustls crypto provider already installed");
    }

    let state = AppState::from_config(&config, Arc::new(MockDirectory::new()));
    if !state.static_dir.is_dir() {
        warn!(static_dir = %state.static_dir.display(), "static asset directory not found");
    }
    let app = router(state);

    let handle = Handle::new();
    let shutdown = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown signal received, draining connections");
        shutdown.graceful_shutdown(Some(SHUTDOWN_GRACE));
    });

    let addr = config.addr;
    let served = match &config.tls {
        Some(paths) => {
            let tls_config = match tls::server_config(paths) {
                Ok(tls_config) => tls_config,
                Err(e) => {
                    error!(error = %e, "failed to load TLS material");
                    process::exit(1);
                }
            };
            let acceptor = ClientCertAcceptor::new(RustlsConfig::from_config(Arc::new(tls_config)));

            info!(
                %addr,
                client_certificates = paths.client_ca.is_some(),
                "listening on https (docs at /docs)"
            );
            axum_server::bind(addr)
                .acceptor(acceptor)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
        None => {
            warn!("TLS not configured, serving plain HTTP without certificate login");
            info!(%addr, "listening on http (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
    };

    if let Err(e) = served {
        error!(error = %e, "server failed");
        process::exit(1);
    }
    info!("server stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
