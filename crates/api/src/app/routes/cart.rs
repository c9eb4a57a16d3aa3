use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};

use storefront_core::ProductId;

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::UserContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(get_cart))
        .route("/items", post(add_item))
        .route("/items/:product_id", delete(remove_item))
}

pub async fn get_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> axum::response::Response {
    match services.carts.get_or_create_cart(user.user_id()) {
        Ok(cart) => Json(dto::CartResponse::from(&cart)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn add_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<dto::AddCartItemRequest>,
) -> axum::response::Response {
    let product_id = match parse_product_id(&body.product_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.carts.add_item(user.user_id(), product_id, body.quantity) {
        Ok(cart) => Json(dto::CartResponse::from(&cart)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn remove_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(product_id): Path<String>,
) -> axum::response::Response {
    let product_id = match parse_product_id(&product_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.carts.remove_item(user.user_id(), product_id) {
        Ok(cart) => Json(dto::CartResponse::from(&cart)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

fn parse_product_id(raw: &str) -> Result<ProductId, axum::response::Response> {
    raw.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id"))
}
