//! Cart and order persistence.
//!
//! The core only needs read-your-writes consistency within a single call and
//! one multi-record commit (`commit_checkout`) that writes the new order and the
//! emptied cart together.

pub mod in_memory;

pub use in_memory::InMemoryStore;

use std::sync::Arc;

use storefront_cart::Cart;
use storefront_core::{OrderId, UserId};
use storefront_orders::Order;

/// Store error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("record already exists: {0}")]
    AlreadyExists(String),
    #[error("concurrent modification: {0}")]
    Conflict(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Cart persistence, keyed by owner.
pub trait CartStore: Send + Sync {
    fn load_cart(&self, user_id: UserId) -> Result<Option<Cart>, StoreError>;
    fn save_cart(&self, cart: &Cart) -> Result<(), StoreError>;
}

/// Order persistence.
pub trait OrderStore: Send + Sync {
    fn get_order(&self, order_id: OrderId) -> Result<Option<Order>, StoreError>;

    /// Insert a brand new order (fails if the id is taken).
    fn insert_order(&self, order: &Order) -> Result<(), StoreError>;

    /// Overwrite an existing order, provided the stored copy is still at
    /// `expected_version`. Fails with `Conflict` otherwise.
    fn update_order(&self, order: &Order, expected_version: u64) -> Result<(), StoreError>;

    /// Every order, oldest placement first.
    fn list_orders(&self) -> Result<Vec<Order>, StoreError>;

    /// Orders of one user, oldest placement first.
    fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError>;
}

/// Stores able to persist a checkout as one unit.
pub trait CheckoutStore: CartStore + OrderStore {
    /// Insert `order` and overwrite `cart` together: either both writes are
    /// visible afterwards or neither is.
    fn commit_checkout(&self, order: &Order, cart: &Cart) -> Result<(), StoreError>;
}

impl<S> CartStore for Arc<S>
where
    S: CartStore + ?Sized,
{
    fn load_cart(&self, user_id: UserId) -> Result<Option<Cart>, StoreError> {
        (**self).load_cart(user_id)
    }

    fn save_cart(&self, cart: &Cart) -> Result<(), StoreError> {
        (**self).save_cart(cart)
    }
}

impl<S> OrderStore for Arc<S>
where
    S: OrderStore + ?Sized,
{
    fn get_order(&self, order_id: OrderId) -> Result<Option<Order>, StoreError> {
        (**self).get_order(order_id)
    }

    fn insert_order(&self, order: &Order) -> Result<(), StoreError> {
        (**self).insert_order(order)
    }

    fn update_order(&self, order: &Order, expected_version: u64) -> Result<(), StoreError> {
        (**self).update_order(order, expected_version)
    }

    fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        (**self).list_orders()
    }

    fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        (**self).orders_for_user(user_id)
    }
}

impl<S> CheckoutStore for Arc<S>
where
    S: CheckoutStore + ?Sized,
{
    fn commit_checkout(&self, order: &Order, cart: &Cart) -> Result<(), StoreError> {
        (**self).commit_checkout(order, cart)
    }
}
