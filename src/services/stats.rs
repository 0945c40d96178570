use std::sync::Arc;

use tokio::sync::Mutex;

use crate::models::stats::Stats;
use crate::services::store::KeyValueStore;

pub const KEY_LABELS_TODAY: &str = "labels_today";
pub const KEY_LABELS_TOTAL: &str = "labels_total";

/// Daily and lifetime label counters backed by the settings store.
///
/// The in-memory counters are authoritative for the session; persistence is
/// best-effort and a failed save never rolls them back.
pub struct StatsAggregator {
    stats: Mutex<Stats>,
    store: Arc<dyn KeyValueStore>,
}

impl StatsAggregator {
    /// Load the counters from `store`. Missing keys count as zero.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let counter = |value: Option<serde_json::Value>| value.and_then(|v| v.as_u64()).unwrap_or(0);
        let stats = Stats {
            labels_today: counter(store.get(KEY_LABELS_TODAY).await),
            labels_total: counter(store.get(KEY_LABELS_TOTAL).await),
        };

        Self {
            stats: Mutex::new(stats),
            store,
        }
    }

    pub async fn current(&self) -> Stats {
        *self.stats.lock().await
    }

    /// Add `labels` to both counters and persist them.
    pub async fn record_labels(&self, labels: u64) -> Stats {
        // Held across the save so concurrent cycles persist in update order.
        let mut stats = self.stats.lock().await;
        stats.add(labels);
        let updated = *stats;

        metrics::counter!("labels_printed_total").increment(labels);

        self.store
            .set(KEY_LABELS_TODAY, updated.labels_today.into())
            .await;
        self.store
            .set(KEY_LABELS_TOTAL, updated.labels_total.into())
            .await;

        if let Err(e) = self.store.save().await {
            tracing::warn!(
                error = %e,
                labels_today = updated.labels_today,
                labels_total = updated.labels_total,
                "Failed to persist label stats"
            );
        }

        updated
    }
}
