use std::sync::Arc;

use tokio::sync::{watch, RwLock};

use crate::config::AgentConfig;
use crate::models::status::ConnectivityStatus;
use crate::services::activity::ActivityLog;
use crate::services::stats::StatsAggregator;
use crate::services::store::{KeyValueStore, StoreError};

/// Session state shared by the poll loop, the job processor and the control API.
pub struct AgentContext {
    config: RwLock<AgentConfig>,
    store: Arc<dyn KeyValueStore>,
    status: watch::Sender<ConnectivityStatus>,
    stats: Arc<StatsAggregator>,
    activity: Arc<ActivityLog>,
}

impl AgentContext {
    /// Load settings and counters from `store`, filling missing settings from `seed`.
    pub async fn load(store: Arc<dyn KeyValueStore>, seed: AgentConfig) -> Self {
        let config = AgentConfig::load(store.as_ref(), seed).await;
        let stats = StatsAggregator::load(store.clone()).await;
        Self::new(store, config, stats)
    }

    pub fn new(store: Arc<dyn KeyValueStore>, config: AgentConfig, stats: StatsAggregator) -> Self {
        let (status, _) = watch::channel(ConnectivityStatus::Offline);
        Self {
            config: RwLock::new(config),
            store,
            status,
            stats: Arc::new(stats),
            activity: Arc::new(ActivityLog::default()),
        }
    }

    pub async fn config(&self) -> AgentConfig {
        self.config.read().await.clone()
    }

    /// Replace the settings and persist them. The new settings apply from the
    /// next poll cycle; they stay in effect even if the store write fails.
    pub async fn save_config(&self, config: AgentConfig) -> Result<(), StoreError> {
        tracing::info!(
            api_url = %config.api_url,
            printer = %config.printer,
            test_mode = config.test_mode,
            "Saving agent configuration"
        );
        *self.config.write().await = config.clone();
        config.persist(self.store.as_ref()).await?;
        self.activity.info("Settings saved").await;
        Ok(())
    }

    pub fn status(&self) -> ConnectivityStatus {
        *self.status.borrow()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<ConnectivityStatus> {
        self.status.subscribe()
    }

    /// Returns the previous status.
    pub(crate) fn set_status(&self, status: ConnectivityStatus) -> ConnectivityStatus {
        metrics::gauge!("queue_connectivity").set(status.as_gauge());
        let previous = self.status.send_replace(status);
        if previous != status {
            tracing::debug!(from = %previous, to = %status, "Queue connectivity changed");
        }
        previous
    }

    pub fn stats(&self) -> &Arc<StatsAggregator> {
        &self.stats
    }

    pub fn activity(&self) -> &Arc<ActivityLog> {
        &self.activity
    }
}
