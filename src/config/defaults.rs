use crate::jobs::DEFAULT_INTERVAL_HOURS;

use super::schema::{ArchiveConfig, SchedulerConfig, StoreConfig};

pub(super) fn default_store_path() -> String {
    "data/health_store".to_string()
}

pub(super) fn default_scheduler_interval_hours() -> u64 {
    DEFAULT_INTERVAL_HOURS
}

pub(super) fn default_scheduler_run_on_start() -> bool {
    true
}

pub(super) fn default_archive_dir() -> String {
    "data/summary_archive".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_hours: default_scheduler_interval_hours(),
            run_on_start: default_scheduler_run_on_start(),
        }
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: default_archive_dir(),
        }
    }
}
