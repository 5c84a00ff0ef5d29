use super::record_id::RecordId;
use std::collections::HashMap;

/// Spend figures for one category.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CategoryStats {
    pub total: f64,
    pub paid: f64,
    pub pending: f64,
}

/// Dashboard aggregate. Always rebuilt from the full item set, never
/// patched incrementally.
#[derive(Debug, Clone, Default)]
pub struct StatsSnapshot {
    pub per_category: HashMap<RecordId, CategoryStats>,
    pub grand_total: f64,
    pub grand_paid: f64,
}

impl StatsSnapshot {
    /// Figures for one category; zeroes for categories without items.
    pub fn category(&self, id: &RecordId) -> CategoryStats {
        self.per_category.get(id).copied().unwrap_or_default()
    }

    pub fn grand_pending(&self) -> f64 {
        self.grand_total - self.grand_paid
    }
}
