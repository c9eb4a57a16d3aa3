//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store, catalog, notifier and scheduler wiring
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: Arc<AppServices>) -> Router {
    // User-scoped routes: require the caller's identity.
    let scoped = routes::router()
        .layer(axum::middleware::from_fn(middleware::user_context_middleware));

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/products", get(routes::products::list_products))
        .route("/system/scheduler", get(routes::system::scheduler_stats))
        .merge(scoped)
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
