use std::fmt::Display;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseReport<T> {
    pub success: bool,
    #[serde(flatten)]
    pub stats: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> PhaseReport<T> {
    pub fn succeeded(stats: T) -> Self {
        Self {
            success: true,
            stats: Some(stats),
            error: None,
        }
    }

    pub fn failed(error: impl Display) -> Self {
        Self {
            success: false,
            stats: None,
            error: Some(error.to_string()),
        }
    }

    pub fn from_result<E: Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(stats) => Self::succeeded(stats),
            Err(error) => Self::failed(error),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregationStats {
    pub aggregated: u64,
    pub deleted: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AlertCleanupStats {
    pub deleted: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SummaryArchiveStats {
    pub archived: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReport {
    pub aggregation: PhaseReport<AggregationStats>,
    pub alert_cleanup: PhaseReport<AlertCleanupStats>,
    pub summary_archive: PhaseReport<SummaryArchiveStats>,
}

impl JobReport {
    pub fn all_succeeded(&self) -> bool {
        self.aggregation.success && self.alert_cleanup.success && self.summary_archive.success
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|error| {
            format!("{{\"error\":\"report serialization failed: {}\"}}", error)
        })
    }
}
