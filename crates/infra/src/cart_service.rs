//! Cart operations on the request path.

use std::sync::Arc;

use tracing::debug;

use storefront_cart::Cart;
use storefront_core::{Clock, DomainError, ProductId, UserId};

use crate::catalog::ProductCatalog;
use crate::error::ServiceResult;
use crate::locks::UserLocks;
use crate::store::CartStore;

/// Cart service: every mutation of one user's cart runs under that user's lock,
/// so concurrent add/remove calls serialize instead of losing updates.
pub struct CartService<S, C> {
    store: S,
    catalog: C,
    locks: Arc<UserLocks>,
    clock: Arc<dyn Clock>,
}

impl<S, C> CartService<S, C>
where
    S: CartStore,
    C: ProductCatalog,
{
    pub fn new(store: S, catalog: C, locks: Arc<UserLocks>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            catalog,
            locks,
            clock,
        }
    }

    /// Return the user's cart, creating and persisting an empty one on first access.
    pub fn get_or_create_cart(&self, user_id: UserId) -> ServiceResult<Cart> {
        self.locks.with_user(user_id, || self.load_or_create(user_id))
    }

    /// Add `quantity` of `product_id`, snapshotting the catalog price for new lines.
    pub fn add_item(&self, user_id: UserId, product_id: ProductId, quantity: i64) -> ServiceResult<Cart> {
        self.locks.with_user(user_id, || -> ServiceResult<Cart> {
            let product = self
                .catalog
                .resolve_product(product_id)?
                .ok_or_else(|| DomainError::not_found(format!("product {product_id}")))?;

            let mut cart = self.load_or_create(user_id)?;
            cart.add_item(product_id, quantity, product.price, self.clock.now())?;
            self.store.save_cart(&cart)?;

            debug!(
                user_id = %user_id,
                product_id = %product_id,
                quantity,
                total_price = cart.total_price(),
                "cart item added"
            );
            Ok(cart)
        })
    }

    /// Remove the line for `product_id`. Removing an absent product is not an error.
    pub fn remove_item(&self, user_id: UserId, product_id: ProductId) -> ServiceResult<Cart> {
        self.locks.with_user(user_id, || -> ServiceResult<Cart> {
            let mut cart = self.load_or_create(user_id)?;
            let removed = cart.remove_item(product_id, self.clock.now());
            self.store.save_cart(&cart)?;

            debug!(user_id = %user_id, product_id = %product_id, removed, "cart item removed");
            Ok(cart)
        })
    }

    // Caller holds the user lock.
    fn load_or_create(&self, user_id: UserId) -> ServiceResult<Cart> {
        if let Some(cart) = self.store.load_cart(user_id)? {
            return Ok(cart);
        }
        let cart = Cart::new(user_id, self.clock.now());
        self.store.save_cart(&cart)?;
        Ok(cart)
    }
}
