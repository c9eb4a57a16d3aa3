use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::UserContext;

pub fn router() -> Router {
    Router::new().route("/", post(create_order).get(list_orders))
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<dto::CreateOrderRequest>,
) -> axum::response::Response {
    match services
        .checkout
        .create_order(user.user_id(), &body.payment_id, &body.shipping_address)
    {
        Ok(order) => (StatusCode::CREATED, Json(dto::OrderResponse::from(&order))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> axum::response::Response {
    match services.checkout.get_user_orders(user.user_id()) {
        Ok(orders) => Json(
            orders
                .iter()
                .map(dto::OrderResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
