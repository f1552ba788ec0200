mod config;
mod jobs;
mod retention;
mod rollup;
mod store;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::{Config, load_config};
use crate::jobs::{Orchestrator, Scheduler};
use crate::retention::{
    ALERT_RETENTION_DAYS, ActiveArchive, SNAPSHOT_RETENTION_DAYS, SUMMARY_RETENTION_DAYS,
};
use crate::store::SledStore;

const CONFIG_PATH_ENV: &str = "HEALTH_RETENTION_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.toml";

fn init_json_logging() {
    if let Err(error) = tracing_log::LogTracer::init() {
        eprintln!(
            "logging bridge initialization failed (continuing with existing logger): {}",
            error
        );
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .json()
        .with_current_span(false)
        .with_span_list(false)
        .finish();

    if let Err(error) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("global logger initialization failed: {}", error);
    }
}

fn config_path() -> String {
    std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

fn log_startup(config: &Config) {
    log::info!(
        "health_retention_starting store_path={} interval_hours={} run_on_start={} day_boundary={:?} archive_enabled={}",
        config.store.path,
        config.scheduler.interval_hours,
        config.scheduler.run_on_start,
        config.aggregation.day_boundary,
        config.archive.enabled,
    );
    log::info!(
        "retention_windows snapshots_days={} alerts_days={} summaries_days={}",
        SNAPSHOT_RETENTION_DAYS,
        ALERT_RETENTION_DAYS,
        SUMMARY_RETENTION_DAYS
    );
}

#[tokio::main]
async fn main() {
    init_json_logging();

    let path = config_path();
    let config = match load_config(&path) {
        Ok(config) => config,
        Err(error) => {
            log::error!("Configuration error: {}", error);
            return;
        }
    };
    log_startup(&config);

    let store = match SledStore::open(&config.store.path) {
        Ok(store) => Arc::new(store),
        Err(error) => {
            log::error!(
                "store_open_failed path={} error={}",
                config.store.path,
                error
            );
            return;
        }
    };

    let orchestrator = Orchestrator::new(
        store,
        ActiveArchive::from_config(&config.archive),
        config.aggregation.day_boundary,
    );
    let mut scheduler = Scheduler::new(orchestrator, config.scheduler_interval());

    if config.scheduler.run_on_start {
        scheduler.start().await;
    } else {
        scheduler.arm();
    }

    if let Err(error) = tokio::signal::ctrl_c().await {
        log::error!("shutdown_signal_failed error={}", error);
    }

    scheduler.stop().await;
    log::info!("health_retention_stopped");
}
