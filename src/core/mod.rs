//! In-memory store, ordering, and record normalization.

/// Conversion of AI analyses into complete records.
pub mod normalize;
/// Comparators for sorted views.
pub mod sort;
/// Authoritative record store.
pub mod store;
