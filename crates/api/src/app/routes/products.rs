use std::sync::Arc;

use axum::{extract::Extension, Json};

use crate::app::dto;
use crate::app::services::AppServices;

/// Public catalog listing.
pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> Json<Vec<dto::ProductResponse>> {
    Json(
        services
            .catalog
            .list()
            .into_iter()
            .map(dto::ProductResponse::from)
            .collect(),
    )
}
