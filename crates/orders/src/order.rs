use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use storefront_cart::{Cart, CartItem};
use storefront_core::{AggregateRoot, DomainError, DomainResult, OrderId, ProductId, UserId};

use crate::status::{OrderStatus, StatusPipeline};

/// Reserved payment reference meaning "cash on delivery".
pub const CASH_ON_DELIVERY: &str = "COD";

/// Payment state recorded at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Paid,
    Pending,
}

impl PaymentStatus {
    /// `Pending` for the exact cash-on-delivery sentinel, `Paid` for anything else.
    pub fn for_payment_ref(payment_ref: &str) -> Self {
        if payment_ref == CASH_ON_DELIVERY {
            PaymentStatus::Pending
        } else {
            PaymentStatus::Paid
        }
    }
}

/// Order line: snapshot of a cart line at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Price in smallest currency unit, copied verbatim from the cart line.
    pub unit_price: Option<u64>,
}

impl From<&CartItem> for OrderItem {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price: item.unit_price,
        }
    }
}

/// Input for placing an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceOrder {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub total_amount: u64,
    pub payment_ref: String,
    pub shipping_address: String,
    pub placed_at: DateTime<Utc>,
}

/// A single forward move of an order's status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub at: DateTime<Utc>,
}

/// Aggregate root: Order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    id: OrderId,
    user_id: UserId,
    items: Vec<OrderItem>,
    total_amount: u64,
    order_placed_at: DateTime<Utc>,
    /// Absent on rows written before the field existed.
    #[serde(default)]
    status_changed_at: Option<DateTime<Utc>>,
    status: OrderStatus,
    payment_ref: String,
    payment_status: PaymentStatus,
    shipping_address: String,
    #[serde(default)]
    version: u64,
}

impl Order {
    /// Place a new order in the pipeline's initial status.
    pub fn place(cmd: PlaceOrder, pipeline: &StatusPipeline) -> DomainResult<Self> {
        if cmd.items.is_empty() {
            return Err(DomainError::invalid_state("cart empty"));
        }
        if cmd.payment_ref.trim().is_empty() {
            return Err(DomainError::invalid_state("payment reference is required"));
        }
        if cmd.shipping_address.trim().is_empty() {
            return Err(DomainError::invalid_state("shipping address is required"));
        }

        Ok(Self {
            id: cmd.order_id,
            user_id: cmd.user_id,
            payment_status: PaymentStatus::for_payment_ref(&cmd.payment_ref),
            items: cmd.items,
            total_amount: cmd.total_amount,
            order_placed_at: cmd.placed_at,
            status_changed_at: Some(cmd.placed_at),
            status: pipeline.initial().clone(),
            payment_ref: cmd.payment_ref,
            shipping_address: cmd.shipping_address,
            version: 0,
        })
    }

    /// Snapshot `cart` into a new order. Quantities and unit prices are copied
    /// verbatim, never re-priced; the total is the cart's current total.
    pub fn place_from_cart(
        cart: &Cart,
        order_id: OrderId,
        payment_ref: impl Into<String>,
        shipping_address: impl Into<String>,
        placed_at: DateTime<Utc>,
        pipeline: &StatusPipeline,
    ) -> DomainResult<Self> {
        Self::place(
            PlaceOrder {
                order_id,
                user_id: cart.user_id(),
                items: cart.items().iter().map(OrderItem::from).collect(),
                total_amount: cart.total_price(),
                payment_ref: payment_ref.into(),
                shipping_address: shipping_address.into(),
                placed_at,
            },
            pipeline,
        )
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn total_amount(&self) -> u64 {
        self.total_amount
    }

    pub fn order_placed_at(&self) -> DateTime<Utc> {
        self.order_placed_at
    }

    pub fn status_changed_at(&self) -> Option<DateTime<Utc>> {
        self.status_changed_at
    }

    /// When the current status began; falls back to placement time for legacy rows.
    pub fn last_status_change(&self) -> DateTime<Utc> {
        self.status_changed_at.unwrap_or(self.order_placed_at)
    }

    pub fn status(&self) -> &OrderStatus {
        &self.status
    }

    pub fn payment_ref(&self) -> &str {
        &self.payment_ref
    }

    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    pub fn shipping_address(&self) -> &str {
        &self.shipping_address
    }

    /// Advance one pipeline step if the order has dwelt in its current status
    /// for at least `dwell`.
    ///
    /// Terminal, unrecognized and last-stage statuses are left alone. Never
    /// moves more than one step per call, however long ago the last change was.
    pub fn advance_if_due(
        &mut self,
        pipeline: &StatusPipeline,
        dwell: Duration,
        now: DateTime<Utc>,
    ) -> Option<StatusChange> {
        if self.status.is_terminal() {
            return None;
        }
        let next = pipeline.next_after(&self.status)?.clone();

        if now - self.last_status_change() < dwell {
            return None;
        }

        let from = std::mem::replace(&mut self.status, next.clone());
        self.status_changed_at = Some(now);
        self.version += 1;

        Some(StatusChange {
            from,
            to: next,
            at: now,
        })
    }

    /// Record an externally decided cancellation.
    pub fn mark_cancelled(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        match self.status {
            OrderStatus::Cancelled => Ok(()),
            OrderStatus::Delivered => Err(DomainError::invalid_state(
                "cannot cancel an order that was delivered",
            )),
            _ => {
                self.status = OrderStatus::Cancelled;
                self.status_changed_at = Some(now);
                self.version += 1;
                Ok(())
            }
        }
    }
}

impl AggregateRoot for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}
