//! Lightweight serializable projections of domain records.

pub mod categories;
pub mod products;
