use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use thiserror::Error;

use crate::retention::{
    RetentionError, SummaryArchive, archive_expired_summaries, purge_expired_alerts,
    purge_stale_snapshots,
};
use crate::rollup::{DayBoundary, RollupError, rollup_day};
use crate::store::{HealthStore, StoreError};

use super::report::{
    AggregationStats, AlertCleanupStats, JobReport, PhaseReport, SummaryArchiveStats,
};

#[derive(Debug, Error)]
pub enum PhaseError {
    #[error(transparent)]
    Rollup(#[from] RollupError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Retention(#[from] RetentionError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Aggregate,
    AlertCleanup,
    SummaryArchive,
    Report,
}

impl Phase {
    pub(super) fn next(self) -> Self {
        match self {
            Phase::Aggregate => Phase::AlertCleanup,
            Phase::AlertCleanup => Phase::SummaryArchive,
            Phase::SummaryArchive | Phase::Report => Phase::Report,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::Aggregate => "aggregation",
            Phase::AlertCleanup => "alert_cleanup",
            Phase::SummaryArchive => "summary_archive",
            Phase::Report => "report",
        }
    }
}

#[derive(Debug, Default)]
struct ReportAccumulator {
    aggregation: Option<PhaseReport<AggregationStats>>,
    alert_cleanup: Option<PhaseReport<AlertCleanupStats>>,
    summary_archive: Option<PhaseReport<SummaryArchiveStats>>,
}

impl ReportAccumulator {
    fn finish(self) -> JobReport {
        JobReport {
            aggregation: self
                .aggregation
                .unwrap_or_else(|| PhaseReport::failed("phase did not run")),
            alert_cleanup: self
                .alert_cleanup
                .unwrap_or_else(|| PhaseReport::failed("phase did not run")),
            summary_archive: self
                .summary_archive
                .unwrap_or_else(|| PhaseReport::failed("phase did not run")),
        }
    }
}

pub struct Orchestrator<S, A> {
    store: Arc<S>,
    archive: A,
    day_boundary: DayBoundary,
}

impl<S, A> Orchestrator<S, A>
where
    S: HealthStore,
    A: SummaryArchive,
{
    pub fn new(store: Arc<S>, archive: A, day_boundary: DayBoundary) -> Self {
        Self {
            store,
            archive,
            day_boundary,
        }
    }

    // Store keys carry millisecond instants; cutoffs are derived at the same
    // resolution.
    pub async fn run(&self) -> JobReport {
        self.run_at(Utc::now().trunc_subsecs(3)).await
    }

    pub async fn run_at(&self, now: DateTime<Utc>) -> JobReport {
        let store = self.store.as_ref();
        let mut accumulator = ReportAccumulator::default();
        let mut phase = Phase::Aggregate;

        loop {
            log::info!("retention_phase_started phase={}", phase.name());
            match phase {
                Phase::Aggregate => {
                    let result = aggregation_phase(store, self.day_boundary, now).await;
                    accumulator.aggregation = Some(record(phase, result));
                }
                Phase::AlertCleanup => {
                    let result = alert_cleanup_phase(store, now).await;
                    accumulator.alert_cleanup = Some(record(phase, result));
                }
                Phase::SummaryArchive => {
                    let result =
                        summary_archive_phase(store, &self.archive, self.day_boundary, now).await;
                    accumulator.summary_archive = Some(record(phase, result));
                }
                Phase::Report => return accumulator.finish(),
            }
            phase = phase.next();
        }
    }
}

fn record<T>(phase: Phase, result: Result<T, PhaseError>) -> PhaseReport<T> {
    if let Err(error) = &result {
        log::error!(
            "retention_phase_failed phase={} error={}",
            phase.name(),
            error
        );
    }
    PhaseReport::from_result(result)
}

// A failed insert returns before the purge so unsummarized snapshots survive.
pub async fn aggregation_phase<S: HealthStore>(
    store: &S,
    boundary: DayBoundary,
    now: DateTime<Utc>,
) -> Result<AggregationStats, PhaseError> {
    let date = boundary.yesterday(now);
    let rollup = rollup_day(store, boundary, date, now).await?;

    let aggregated = if rollup.summaries.is_empty() {
        0
    } else {
        store.insert_summaries(rollup.summaries).await?
    };
    log::info!(
        "daily_rollup_persisted date={} summaries={}",
        rollup.date,
        aggregated
    );

    let deleted = purge_stale_snapshots(store, now).await?;
    Ok(AggregationStats {
        aggregated,
        deleted,
    })
}

pub async fn alert_cleanup_phase<S: HealthStore>(
    store: &S,
    now: DateTime<Utc>,
) -> Result<AlertCleanupStats, PhaseError> {
    let deleted = purge_expired_alerts(store, now).await?;
    Ok(AlertCleanupStats { deleted })
}

pub async fn summary_archive_phase<S, A>(
    store: &S,
    archive: &A,
    boundary: DayBoundary,
    now: DateTime<Utc>,
) -> Result<SummaryArchiveStats, PhaseError>
where
    S: HealthStore,
    A: SummaryArchive,
{
    let archived = archive_expired_summaries(store, archive, boundary, now).await?;
    Ok(SummaryArchiveStats { archived })
}
