//! `storefront-core`: shared domain building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the domain error model, the aggregate root trait and the clock
//! abstraction every time-driven rule reads "now" from.

pub mod aggregate;
pub mod clock;
pub mod error;
pub mod id;

pub use aggregate::AggregateRoot;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{DomainError, DomainResult};
pub use id::{OrderId, ProductId, UserId};
