use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_cart::{Cart, CartItem};
use storefront_infra::catalog::ProductInfo;
use storefront_orders::{Order, OrderItem, PaymentStatus};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemRequest {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub payment_id: String,
    pub shipping_address: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemResponse {
    pub product_id: String,
    pub quantity: u32,
    pub unit_price: Option<u64>,
}

impl From<&CartItem> for CartItemResponse {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id.to_string(),
            quantity: item.quantity,
            unit_price: item.unit_price,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub user_id: String,
    pub items: Vec<CartItemResponse>,
    pub total_price: u64,
    pub updated_at: DateTime<Utc>,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        Self {
            user_id: cart.user_id().to_string(),
            items: cart.items().iter().map(CartItemResponse::from).collect(),
            total_price: cart.total_price(),
            updated_at: cart.updated_at(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub product_id: String,
    pub quantity: u32,
    pub unit_price: Option<u64>,
}

impl From<&OrderItem> for OrderItemResponse {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_id: item.product_id.to_string(),
            quantity: item.quantity,
            unit_price: item.unit_price,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: String,
    pub user_id: String,
    pub items: Vec<OrderItemResponse>,
    pub total_amount: u64,
    pub order_placed_at: DateTime<Utc>,
    pub status_changed_at: DateTime<Utc>,
    pub status: String,
    pub payment_id: String,
    pub payment_status: PaymentStatus,
    pub shipping_address: String,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id_typed().to_string(),
            user_id: order.user_id().to_string(),
            items: order.items().iter().map(OrderItemResponse::from).collect(),
            total_amount: order.total_amount(),
            order_placed_at: order.order_placed_at(),
            status_changed_at: order.last_status_change(),
            status: order.status().to_string(),
            payment_id: order.payment_ref().to_string(),
            payment_status: order.payment_status(),
            shipping_address: order.shipping_address().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: String,
    pub title: String,
    pub price: Option<u64>,
}

impl From<ProductInfo> for ProductResponse {
    fn from(p: ProductInfo) -> Self {
        Self {
            id: p.id.to_string(),
            title: p.title,
            price: p.price,
        }
    }
}
