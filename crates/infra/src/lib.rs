//! Infrastructure layer: stores, collaborators, services and the status scheduler.
//!
//! - `store`: cart/order persistence traits + in-memory implementation
//! - `catalog` / `notify`: consumed collaborator interfaces
//! - `locks`: per-user mutual exclusion for cart mutation and checkout
//! - `cart_service` / `checkout`: the request-path operations
//! - `lifecycle`: time-driven order status advancement
//! - `config`: environment-driven configuration

pub mod cart_service;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod locks;
pub mod notify;
pub mod store;

#[cfg(test)]
mod integration_tests;

pub use cart_service::CartService;
pub use checkout::CheckoutService;
pub use error::{ServiceError, ServiceResult};
