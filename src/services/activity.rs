use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

const DEFAULT_CAPACITY: usize = 200;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Info,
    Success,
    Error,
}

/// One user-facing line in the activity feed.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    pub at: DateTime<Utc>,
    pub level: ActivityLevel,
    pub message: String,
}

/// Bounded feed of recent agent events, newest last.
pub struct ActivityLog {
    capacity: usize,
    entries: Mutex<VecDeque<ActivityEntry>>,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl ActivityLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(VecDeque::with_capacity(capacity.max(1))),
        }
    }

    pub async fn push(&self, level: ActivityLevel, message: impl Into<String>) {
        let mut entries = self.entries.lock().await;
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(ActivityEntry {
            at: Utc::now(),
            level,
            message: message.into(),
        });
    }

    pub async fn info(&self, message: impl Into<String>) {
        self.push(ActivityLevel::Info, message).await;
    }

    pub async fn success(&self, message: impl Into<String>) {
        self.push(ActivityLevel::Success, message).await;
    }

    pub async fn error(&self, message: impl Into<String>) {
        self.push(ActivityLevel::Error, message).await;
    }

    pub async fn snapshot(&self) -> Vec<ActivityEntry> {
        self.entries.lock().await.iter().cloned().collect()
    }

    pub async fn count(&self, level: ActivityLevel) -> usize {
        self.entries
            .lock()
            .await
            .iter()
            .filter(|e| e.level == level)
            .count()
    }
}
