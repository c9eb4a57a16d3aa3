use axum::Router;

pub mod cart;
pub mod orders;
pub mod products;
pub mod system;

/// Router for all user-scoped endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/cart", cart::router())
        .nest("/orders", orders::router())
}
