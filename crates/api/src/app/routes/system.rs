use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::app::services::AppServices;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Cumulative counters of the order status scheduler.
pub async fn scheduler_stats(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    Json(services.scheduler_stats.snapshot())
}
