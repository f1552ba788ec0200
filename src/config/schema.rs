use serde::Deserialize;

use crate::rollup::DayBoundary;

use super::defaults::*;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub aggregation: AggregationConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_scheduler_interval_hours")]
    pub interval_hours: u64,
    #[serde(default = "default_scheduler_run_on_start")]
    pub run_on_start: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AggregationConfig {
    #[serde(default)]
    pub day_boundary: DayBoundary,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_archive_dir")]
    pub dir: String,
}
