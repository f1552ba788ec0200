use std::fs;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use crate::rollup::DayBoundary;
use crate::store::{Alert, DailySummary, HealthStatus, MemoryStore, Snapshot, StoreOperation};

use super::{
    JsonlArchive, NoArchive, RetentionError, archive_expired_summaries, purge_expired_alerts,
    purge_stale_snapshots, summary_cutoff,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
        .single()
        .expect("valid instant")
}

fn snapshot(window_end: DateTime<Utc>) -> Snapshot {
    Snapshot {
        model_id: "m1".to_string(),
        window_end,
        critical_count: 0,
        warning_count: 0,
        overall_status: HealthStatus::Ok,
        needs_retraining: false,
    }
}

fn summary(date: NaiveDate) -> DailySummary {
    DailySummary {
        model_id: "m1".to_string(),
        date,
        snapshot_count: 1,
        avg_critical_count: 0.0,
        max_critical_count: 0,
        avg_warning_count: 0.0,
        max_warning_count: 0,
        overall_status: HealthStatus::Ok,
        needs_retraining: false,
        created_at: now(),
    }
}

#[tokio::test]
async fn snapshots_older_than_seven_days_are_purged() {
    let store = MemoryStore::new().with_snapshots(vec![
        snapshot(now() - Duration::days(30)),
        snapshot(now() - Duration::days(7) - Duration::seconds(1)),
        snapshot(now() - Duration::days(7)),
        snapshot(now() - Duration::days(1)),
    ]);

    let deleted = purge_stale_snapshots(&store, now()).await.expect("purge");

    assert_eq!(deleted, 2);
    assert!(
        store
            .snapshots()
            .iter()
            .all(|item| item.window_end >= now() - Duration::days(7))
    );
}

#[tokio::test]
async fn alerts_older_than_ninety_days_are_purged() {
    let store = MemoryStore::new().with_alerts(vec![
        Alert::at(now() - Duration::days(91)),
        Alert::at(now() - Duration::days(90)),
        Alert::at(now() - Duration::days(3)),
    ]);

    let deleted = purge_expired_alerts(&store, now()).await.expect("purge");

    assert_eq!(deleted, 1);
    assert_eq!(store.alerts().len(), 2);
}

#[tokio::test]
async fn nothing_to_delete_is_a_zero_count() {
    let store = MemoryStore::new();

    assert_eq!(purge_stale_snapshots(&store, now()).await.expect("purge"), 0);
    assert_eq!(purge_expired_alerts(&store, now()).await.expect("purge"), 0);
    let archived = archive_expired_summaries(&store, &NoArchive, DayBoundary::Utc, now())
        .await
        .expect("archive");
    assert_eq!(archived, 0);
}

#[tokio::test]
async fn summaries_older_than_thirty_days_are_deleted_without_export() {
    let cutoff = summary_cutoff(DayBoundary::Utc, now());
    assert_eq!(cutoff, NaiveDate::from_ymd_opt(2024, 5, 2).expect("valid date"));

    let store = MemoryStore::new().with_summaries(vec![
        summary(cutoff - Duration::days(10)),
        summary(cutoff - Duration::days(1)),
        summary(cutoff),
        summary(cutoff + Duration::days(5)),
    ]);

    let archived = archive_expired_summaries(&store, &NoArchive, DayBoundary::Utc, now())
        .await
        .expect("archive");

    assert_eq!(archived, 2);
    assert!(store.summaries().iter().all(|item| item.date >= cutoff));
    assert_eq!(store.calls(StoreOperation::FindSummaries), 0);
}

#[tokio::test]
async fn jsonl_archive_exports_expired_summaries_before_deleting() {
    let temp = tempfile::tempdir().expect("temp dir");
    let archive = JsonlArchive::new(temp.path().join("archive"));
    let cutoff = summary_cutoff(DayBoundary::Utc, now());

    let store = MemoryStore::new().with_summaries(vec![
        summary(cutoff - Duration::days(2)),
        summary(cutoff - Duration::days(1)),
        summary(cutoff),
    ]);

    let archived = archive_expired_summaries(&store, &archive, DayBoundary::Utc, now())
        .await
        .expect("archive");
    assert_eq!(archived, 2);

    let content = fs::read_to_string(archive.file_for(cutoff)).expect("archive file");
    let lines = content.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 2);
    let first: DailySummary = serde_json::from_str(lines[0]).expect("summary line");
    assert_eq!(first.date, cutoff - Duration::days(2));
    assert_eq!(store.summaries().len(), 1);
}

#[tokio::test]
async fn failed_export_keeps_the_summaries() {
    let temp = tempfile::tempdir().expect("temp dir");
    let blocker = temp.path().join("not-a-dir");
    fs::write(&blocker, b"occupied").expect("write blocker file");
    let archive = JsonlArchive::new(&blocker);
    let cutoff = summary_cutoff(DayBoundary::Utc, now());

    let store = MemoryStore::new().with_summaries(vec![summary(cutoff - Duration::days(1))]);

    let result = archive_expired_summaries(&store, &archive, DayBoundary::Utc, now()).await;

    assert!(matches!(result, Err(RetentionError::Archive(_))));
    assert_eq!(store.summaries().len(), 1);
    assert_eq!(store.calls(StoreOperation::DeleteSummaries), 0);
}

#[tokio::test]
async fn store_failure_surfaces_as_error() {
    let store = MemoryStore::new();
    store.fail_on(StoreOperation::DeleteAlerts);

    assert!(purge_expired_alerts(&store, now()).await.is_err());
}
