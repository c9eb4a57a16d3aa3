//! Aggregate root trait for the storefront's consistency boundaries.

/// Aggregate root marker + minimal interface.
///
/// Carts and orders are each mutated as a whole and persisted as a whole; this
/// trait is the common surface the infrastructure layer relies on (identity for
/// keying, version for bookkeeping) without pulling in any IO concerns.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the aggregate identifier.
    fn id(&self) -> &Self::Id;

    /// Monotonically increasing version of the aggregate's state.
    ///
    /// Incremented by one for every accepted mutation.
    fn version(&self) -> u64;
}
