//! Cart → order transition.

use std::sync::Arc;

use tracing::{info, warn};

use storefront_core::{Clock, DomainError, OrderId, UserId};
use storefront_orders::{Order, StatusPipeline};

use crate::error::ServiceResult;
use crate::locks::UserLocks;
use crate::notify::NotificationSender;
use crate::store::CheckoutStore;

/// Checkout service.
///
/// `create_order` holds the user's lock for the whole read-snapshot-commit
/// sequence, and the store commits the order and the emptied cart as one unit,
/// so an order never exists alongside an unemptied cart.
pub struct CheckoutService<S> {
    store: S,
    locks: Arc<UserLocks>,
    clock: Arc<dyn Clock>,
    pipeline: StatusPipeline,
    notifications: NotificationSender,
}

impl<S> CheckoutService<S>
where
    S: CheckoutStore,
{
    pub fn new(
        store: S,
        locks: Arc<UserLocks>,
        clock: Arc<dyn Clock>,
        pipeline: StatusPipeline,
        notifications: NotificationSender,
    ) -> Self {
        Self {
            store,
            locks,
            clock,
            pipeline,
            notifications,
        }
    }

    /// Turn the user's current cart into an order and empty the cart.
    ///
    /// The confirmation is queued after the commit; a delivery problem is
    /// logged and never fails the checkout.
    pub fn create_order(
        &self,
        user_id: UserId,
        payment_ref: &str,
        shipping_address: &str,
    ) -> ServiceResult<Order> {
        let order = self.locks.with_user(user_id, || -> ServiceResult<Order> {
            let mut cart = self
                .store
                .load_cart(user_id)?
                .filter(|c| !c.is_empty())
                .ok_or_else(|| DomainError::invalid_state("cart empty"))?;

            let now = self.clock.now();
            let order = Order::place_from_cart(
                &cart,
                OrderId::new(),
                payment_ref,
                shipping_address,
                now,
                &self.pipeline,
            )?;
            cart.clear(now);

            self.store.commit_checkout(&order, &cart)?;
            Ok(order)
        })?;

        info!(
            user_id = %user_id,
            order_id = %order.id_typed(),
            total_amount = order.total_amount(),
            payment_status = ?order.payment_status(),
            "order placed"
        );

        if let Err(e) = self.notifications.enqueue(user_id, order.clone()) {
            warn!(
                user_id = %user_id,
                order_id = %order.id_typed(),
                error = %e,
                "order confirmation not queued"
            );
        }

        Ok(order)
    }

    /// Orders of `user_id`, oldest placement first.
    pub fn get_user_orders(&self, user_id: UserId) -> ServiceResult<Vec<Order>> {
        Ok(self.store.orders_for_user(user_id)?)
    }
}
