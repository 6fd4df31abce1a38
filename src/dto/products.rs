use serde::Serialize;

/// Aggregate counts over the whole product set.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct ProductStatistics {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub featured: usize,
    pub on_sale: usize,
    pub new: usize,
}
