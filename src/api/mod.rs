// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::any::Any;

use axum::{
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{error, Level};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::Role,
    error::ApiError,
    models::{
        AuthResponse, CertificateStatusResponse, MessageResponse, RefreshRequest,
        RegistrationRequest, TokenPairResponse, User,
    },
    state::AppState,
};

pub mod auth;
pub mod health;
pub mod register;

pub fn router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/refresh", post(auth::refresh))
        .route("/me", get(auth::current_user))
        .route("/cert-status", get(auth::certificate_status));

    let api_routes = Router::new()
        .route("/register", post(register::register_user))
        .nest("/auth", auth_routes)
        .fallback(api_not_found);

    let static_files = ServeDir::new(&state.static_dir);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .fallback_service(static_files)
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(trace_layer)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

async fn api_not_found() -> ApiError {
    ApiError::not_found("Not found")
}

fn handle_panic(_payload: Box<dyn Any + Send + 'static>) -> Response {
    error!("request handler panicked");
    ApiError::internal("Internal server error").into_response()
}

#[derive(OpenApi)]
#[openapi(
    paths(
        register::register_user,
        auth::login,
        auth::certificate_status,
        auth::logout,
        auth::current_user,
        auth::refresh,
        health::health
    ),
    components(
        schemas(
            User,
            Role,
            AuthResponse,
            RefreshRequest,
            TokenPairResponse,
            MessageResponse,
            RegistrationRequest,
            CertificateStatusResponse,
            health::HealthResponse,
            health::HealthChecks
        )
    ),
    tags(
        (name = "Registration", description = "New-user registration"),
        (name = "Auth", description = "Smartcard login and token lifecycle"),
        (name = "Health", description = "Service health")
    )
)]
struct ApiDoc;
