mod archive;

use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use thiserror::Error;

use crate::rollup::DayBoundary;
use crate::store::{HealthStore, StoreError};

pub use archive::{ActiveArchive, ArchiveError, SummaryArchive};
#[cfg(test)]
pub use archive::{JsonlArchive, NoArchive};

pub const SNAPSHOT_RETENTION_DAYS: i64 = 7;
pub const ALERT_RETENTION_DAYS: i64 = 90;
pub const SUMMARY_RETENTION_DAYS: i64 = 30;

#[derive(Debug, Error)]
pub enum RetentionError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("summary export failed, nothing deleted: {0}")]
    Archive(#[from] ArchiveError),
}

pub fn snapshot_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - ChronoDuration::days(SNAPSHOT_RETENTION_DAYS)
}

pub fn alert_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - ChronoDuration::days(ALERT_RETENTION_DAYS)
}

pub fn summary_cutoff(boundary: DayBoundary, now: DateTime<Utc>) -> NaiveDate {
    boundary.date_of(now - ChronoDuration::days(SUMMARY_RETENTION_DAYS))
}

pub async fn purge_stale_snapshots<S: HealthStore>(
    store: &S,
    now: DateTime<Utc>,
) -> Result<u64, StoreError> {
    let cutoff = snapshot_cutoff(now);
    let deleted = store.delete_snapshots_before(cutoff).await?;
    log::info!(
        "retention_purge collection=snapshots cutoff={} deleted={}",
        cutoff.to_rfc3339(),
        deleted
    );
    Ok(deleted)
}

pub async fn purge_expired_alerts<S: HealthStore>(
    store: &S,
    now: DateTime<Utc>,
) -> Result<u64, StoreError> {
    let cutoff = alert_cutoff(now);
    let deleted = store.delete_alerts_before(cutoff).await?;
    log::info!(
        "retention_purge collection=alerts cutoff={} deleted={}",
        cutoff.to_rfc3339(),
        deleted
    );
    Ok(deleted)
}

// A failed export returns before the delete.
pub async fn archive_expired_summaries<S, A>(
    store: &S,
    archive: &A,
    boundary: DayBoundary,
    now: DateTime<Utc>,
) -> Result<u64, RetentionError>
where
    S: HealthStore,
    A: SummaryArchive,
{
    let cutoff = summary_cutoff(boundary, now);

    if archive.is_enabled() {
        let expired = store.find_summaries_before(cutoff).await?;
        archive.export(cutoff, &expired).await?;
    }

    let archived = store.delete_summaries_before(cutoff).await?;
    log::info!(
        "retention_purge collection=daily_summaries cutoff={} archived={}",
        cutoff,
        archived
    );
    Ok(archived)
}

#[cfg(test)]
mod tests;
