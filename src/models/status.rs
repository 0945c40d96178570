use serde::Serialize;
use strum::Display;

/// Queue connectivity derived from the most recent poll attempt.
#[derive(Debug, Clone, Copy, Serialize, Display, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConnectivityStatus {
    Online,
    Offline,
    Connecting,
}

impl ConnectivityStatus {
    /// Gauge value exported to Prometheus.
    pub fn as_gauge(self) -> f64 {
        match self {
            ConnectivityStatus::Offline => 0.0,
            ConnectivityStatus::Connecting => 0.5,
            ConnectivityStatus::Online => 1.0,
        }
    }
}
