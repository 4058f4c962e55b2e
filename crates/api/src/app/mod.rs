//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: service handles over the shared database, realtime channel
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use hemolink_infra::{AppConfig, ServiceError};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: &AppConfig) -> Result<Router, ServiceError> {
    let services = Arc::new(services::build_services(config)?);
    Ok(router_with(services))
}

/// Router over already-built services (tests share them with the server).
///
/// Every endpoint is served at its bare path and again under `/api`, the
/// prefix existing browser clients call.
pub fn router_with(services: Arc<services::AppServices>) -> Router {
    let endpoints = Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router());

    Router::new()
        .merge(endpoints.clone())
        .nest("/api", endpoints)
        .fallback(errors::not_found_fallback)
        .layer(Extension(services))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::request_log))
                .layer(axum::middleware::from_fn(middleware::cors)),
        )
}
