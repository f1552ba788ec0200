use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Warning,
    Critical,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub model_id: String,
    pub window_end: DateTime<Utc>,
    pub critical_count: u32,
    pub warning_count: u32,
    pub overall_status: HealthStatus,
    pub needs_retraining: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub model_id: String,
    pub date: NaiveDate,
    pub snapshot_count: u64,
    pub avg_critical_count: f64,
    pub max_critical_count: u32,
    pub avg_warning_count: f64,
    pub max_warning_count: u32,
    pub overall_status: HealthStatus,
    pub needs_retraining: bool,
    pub created_at: DateTime<Utc>,
}

// Only `created_at` is interpreted; other producer fields pass through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl Alert {
    #[cfg(test)]
    pub fn at(created_at: DateTime<Utc>) -> Self {
        Self {
            created_at,
            attributes: serde_json::Map::new(),
        }
    }
}
