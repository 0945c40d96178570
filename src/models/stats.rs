use serde::{Deserialize, Serialize};

/// Processed label counters.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stats {
    pub labels_today: u64,
    pub labels_total: u64,
}

impl Stats {
    pub fn add(&mut self, labels: u64) {
        self.labels_today = self.labels_today.saturating_add(labels);
        self.labels_total = self.labels_total.saturating_add(labels);
    }
}
