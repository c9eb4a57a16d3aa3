//! Shopping cart domain module.
//!
//! One mutable cart per user, implemented purely as deterministic domain logic
//! (no IO, no HTTP, no storage). Product existence and price resolution happen
//! in the service layer; the aggregate only receives the resolved snapshot.

pub mod cart;

pub use cart::{Cart, CartItem};
