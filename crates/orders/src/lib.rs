//! Orders domain module.
//!
//! An order is an immutable snapshot of a cart at checkout time plus a mutable
//! status/timestamp pair that moves forward through a fixed pipeline. Pure
//! domain logic only (no IO, no HTTP, no storage).

pub mod order;
pub mod status;

pub use order::{Order, OrderItem, PaymentStatus, PlaceOrder, StatusChange, CASH_ON_DELIVERY};
pub use status::{OrderStatus, StatusPipeline};
