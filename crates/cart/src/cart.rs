use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{AggregateRoot, DomainError, DomainResult, ProductId, UserId};

/// Cart line: product, quantity, unit price captured when the product was first added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Price in smallest currency unit (e.g., paise). `None` when the product
    /// had no price at add-time; such lines contribute 0 to the total.
    pub unit_price: Option<u64>,
}

impl CartItem {
    pub fn line_total(&self) -> u64 {
        self.unit_price
            .unwrap_or(0)
            .saturating_mul(u64::from(self.quantity))
    }
}

/// Aggregate root: Cart (exactly one per user, never deleted, only emptied).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    user_id: UserId,
    items: Vec<CartItem>,
    total_price: u64,
    updated_at: DateTime<Utc>,
    version: u64,
}

impl Cart {
    /// Create an empty cart for `user_id`.
    pub fn new(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            items: Vec::new(),
            total_price: 0,
            updated_at: now,
            version: 0,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn item(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    /// Derived total: Σ(unit_price × quantity) over current items.
    pub fn total_price(&self) -> u64 {
        self.total_price
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct products in the cart.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Add `quantity` units of a product.
    ///
    /// An existing line keeps its original price snapshot and only has its
    /// quantity incremented; a new line snapshots `unit_price`.
    pub fn add_item(
        &mut self,
        product_id: ProductId,
        quantity: i64,
        unit_price: Option<u64>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if quantity < 1 {
            return Err(DomainError::invalid_state("quantity must be at least 1"));
        }
        let quantity = u32::try_from(quantity)
            .map_err(|_| DomainError::invalid_state("quantity is too large"))?;

        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(quantity)
                    .ok_or_else(|| DomainError::invalid_state("quantity is too large"))?;
            }
            None => self.items.push(CartItem {
                product_id,
                quantity,
                unit_price,
            }),
        }

        self.touch(now);
        Ok(())
    }

    /// Remove the line for `product_id`. Returns `false` (and changes nothing)
    /// when the product is not in the cart.
    pub fn remove_item(&mut self, product_id: ProductId, now: DateTime<Utc>) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        if self.items.len() == before {
            return false;
        }
        self.touch(now);
        true
    }

    /// Drop every line and reset the total to 0.
    pub fn clear(&mut self, now: DateTime<Utc>) {
        self.items.clear();
        self.touch(now);
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.recompute_total();
        self.updated_at = now;
        self.version += 1;
    }

    fn recompute_total(&mut self) {
        self.total_price = self
            .items
            .iter()
            .fold(0u64, |acc, item| acc.saturating_add(item.line_total()));
    }
}

impl AggregateRoot for Cart {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.user_id
    }

    fn version(&self) -> u64 {
        self.version
    }
}
