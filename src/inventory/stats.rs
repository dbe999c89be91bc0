use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::record::InventoryRecord;

/// Aggregate figures over the whole store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    /// Number of records
    pub total: usize,
    /// Records created on the reference date
    pub created_today: usize,
    /// Records per category label, non-canonical labels included
    pub by_category: BTreeMap<String, usize>,
    /// Records per creation month (`YYYY-MM`)
    pub by_month: BTreeMap<String, usize>,
}

impl Statistics {
    /// Tally `records` with `today` as the reference date
    pub fn compute(records: &[InventoryRecord], today: NaiveDate) -> Self {
        let mut stats = Statistics {
            total: records.len(),
            ..Default::default()
        };
        for record in records {
            if record.created_at.date() == today {
                stats.created_today += 1;
            }
            *stats
                .by_category
                .entry(record.category.as_str().to_string())
                .or_default() += 1;
            *stats
                .by_month
                .entry(record.created_at.format("%Y-%m").to_string())
                .or_default() += 1;
        }
        stats
    }

    /// Count for one category label
    pub fn category_count(&self, label: &str) -> usize {
        self.by_category.get(label).copied().unwrap_or(0)
    }
}
