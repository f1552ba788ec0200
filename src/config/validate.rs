use std::time::Duration;

use thiserror::Error;

use super::schema::Config;

const MAX_INTERVAL_HOURS: u64 = 24 * 365;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Validation(String),
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "store.path must not be empty".to_string(),
            ));
        }
        if self.scheduler.interval_hours == 0 {
            return Err(ConfigError::Validation(
                "scheduler.interval_hours must be greater than 0".to_string(),
            ));
        }
        if self.scheduler.interval_hours > MAX_INTERVAL_HOURS {
            return Err(ConfigError::Validation(format!(
                "scheduler.interval_hours must be at most {}",
                MAX_INTERVAL_HOURS
            )));
        }
        if self.archive.enabled && self.archive.dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "archive.dir must not be empty when archive.enabled is true".to_string(),
            ));
        }
        Ok(())
    }

    pub fn scheduler_interval(&self) -> Duration {
        Duration::from_secs(self.scheduler.interval_hours * 3600)
    }
}
