use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use storefront_cart::Cart;
use storefront_core::{AggregateRoot, OrderId, UserId};
use storefront_orders::Order;

use super::{CartStore, CheckoutStore, OrderStore, StoreError};

/// In-memory cart/order store for tests/dev.
///
/// Lock order is always carts before orders.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    carts: RwLock<HashMap<UserId, Cart>>,
    orders: RwLock<HashMap<OrderId, Order>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn carts_read(&self) -> Result<RwLockReadGuard<'_, HashMap<UserId, Cart>>, StoreError> {
        self.carts.read().map_err(|_| poisoned("carts"))
    }

    fn carts_write(&self) -> Result<RwLockWriteGuard<'_, HashMap<UserId, Cart>>, StoreError> {
        self.carts.write().map_err(|_| poisoned("carts"))
    }

    fn orders_read(&self) -> Result<RwLockReadGuard<'_, HashMap<OrderId, Order>>, StoreError> {
        self.orders.read().map_err(|_| poisoned("orders"))
    }

    fn orders_write(&self) -> Result<RwLockWriteGuard<'_, HashMap<OrderId, Order>>, StoreError> {
        self.orders.write().map_err(|_| poisoned("orders"))
    }
}

fn poisoned(what: &str) -> StoreError {
    StoreError::Unavailable(format!("{what} lock poisoned"))
}

fn sorted_by_placement(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by_key(|o| (o.order_placed_at(), o.id_typed()));
    orders
}

impl CartStore for InMemoryStore {
    fn load_cart(&self, user_id: UserId) -> Result<Option<Cart>, StoreError> {
        Ok(self.carts_read()?.get(&user_id).cloned())
    }

    fn save_cart(&self, cart: &Cart) -> Result<(), StoreError> {
        self.carts_write()?.insert(cart.user_id(), cart.clone());
        Ok(())
    }
}

impl OrderStore for InMemoryStore {
    fn get_order(&self, order_id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.orders_read()?.get(&order_id).cloned())
    }

    fn insert_order(&self, order: &Order) -> Result<(), StoreError> {
        let mut orders = self.orders_write()?;
        if orders.contains_key(order.id()) {
            return Err(StoreError::AlreadyExists(order.id().to_string()));
        }
        orders.insert(*order.id(), order.clone());
        Ok(())
    }

    fn update_order(&self, order: &Order, expected_version: u64) -> Result<(), StoreError> {
        let mut orders = self.orders_write()?;
        let existing = orders
            .get_mut(order.id())
            .ok_or_else(|| StoreError::NotFound(order.id().to_string()))?;

        let current = existing.version();
        if current != expected_version {
            return Err(StoreError::Conflict(format!(
                "order {}: expected version {expected_version}, found {current}",
                order.id()
            )));
        }

        *existing = order.clone();
        Ok(())
    }

    fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders_read()?;
        Ok(sorted_by_placement(orders.values().cloned().collect()))
    }

    fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders_read()?;
        Ok(sorted_by_placement(
            orders
                .values()
                .filter(|o| o.user_id() == user_id)
                .cloned()
                .collect(),
        ))
    }
}

impl CheckoutStore for InMemoryStore {
    fn commit_checkout(&self, order: &Order, cart: &Cart) -> Result<(), StoreError> {
        let mut carts = self.carts_write()?;
        let mut orders = self.orders_write()?;

        if orders.contains_key(order.id()) {
            return Err(StoreError::AlreadyExists(order.id().to_string()));
        }

        orders.insert(*order.id(), order.clone());
        carts.insert(cart.user_id(), cart.clone());
        Ok(())
    }
}
