use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, de::DeserializeOwned};
use sled::IVec;

use super::{
    ALERTS, Alert, DAILY_SUMMARIES, DailySummary, HealthStore, SNAPSHOTS, Snapshot, StoreError,
};

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

// Snapshot and alert keys: millisecond prefix + generated id. Summary keys:
// `YYYY-MM-DD` + generated id, so duplicate `(model_id, date)` rows coexist.
#[derive(Clone)]
pub struct SledStore {
    db: sled::Db,
    snapshots: sled::Tree,
    daily_summaries: sled::Tree,
    alerts: sled::Tree,
}

impl SledStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        let snapshots = db.open_tree(SNAPSHOTS)?;
        let daily_summaries = db.open_tree(DAILY_SUMMARIES)?;
        let alerts = db.open_tree(ALERTS)?;
        Ok(Self {
            db,
            snapshots,
            daily_summaries,
            alerts,
        })
    }

    #[cfg(test)]
    pub fn record_snapshot(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let key = self.instant_key(snapshot.window_end)?;
        self.snapshots.insert(key, encode(SNAPSHOTS, snapshot)?)?;
        Ok(())
    }

    #[cfg(test)]
    pub fn record_alert(&self, alert: &Alert) -> Result<(), StoreError> {
        let key = self.instant_key(alert.created_at)?;
        self.alerts.insert(key, encode(ALERTS, alert)?)?;
        Ok(())
    }

    #[cfg(test)]
    pub fn summaries(&self) -> Result<Vec<DailySummary>, StoreError> {
        decode_values(DAILY_SUMMARIES, self.daily_summaries.iter())
    }

    #[cfg(test)]
    pub fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }

    #[cfg(test)]
    pub fn alert_count(&self) -> usize {
        self.alerts.len()
    }

    #[cfg(test)]
    fn instant_key(&self, at: DateTime<Utc>) -> Result<Vec<u8>, StoreError> {
        let mut key = Vec::with_capacity(16);
        key.extend_from_slice(&instant_prefix(at.timestamp_millis()));
        key.extend_from_slice(&self.db.generate_id()?.to_be_bytes());
        Ok(key)
    }

    fn date_key(&self, date: NaiveDate) -> Result<Vec<u8>, StoreError> {
        let mut key = date.format(DATE_KEY_FORMAT).to_string().into_bytes();
        key.extend_from_slice(&self.db.generate_id()?.to_be_bytes());
        Ok(key)
    }
}

impl HealthStore for SledStore {
    async fn find_snapshots(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Snapshot>, StoreError> {
        if start > end {
            return Ok(Vec::new());
        }

        let lower = instant_prefix(start.timestamp_millis());
        let upper = instant_prefix(end.timestamp_millis().saturating_add(1));
        let mut found: Vec<Snapshot> =
            decode_values(SNAPSHOTS, self.snapshots.range(lower..upper))?;
        // Edge buckets may hold sub-millisecond instants outside the range.
        found.retain(|snapshot| snapshot.window_end >= start && snapshot.window_end <= end);
        Ok(found)
    }

    async fn delete_snapshots_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        remove_before(&self.snapshots, SNAPSHOTS, cutoff, |snapshot: &Snapshot| {
            snapshot.window_end
        })
    }

    async fn insert_summaries(&self, summaries: Vec<DailySummary>) -> Result<u64, StoreError> {
        let mut batch = sled::Batch::default();
        let mut inserted = 0u64;
        for summary in &summaries {
            batch.insert(self.date_key(summary.date)?, encode(DAILY_SUMMARIES, summary)?);
            inserted += 1;
        }

        if inserted > 0 {
            self.daily_summaries.apply_batch(batch)?;
        }
        Ok(inserted)
    }

    async fn find_summaries_before(
        &self,
        cutoff: NaiveDate,
    ) -> Result<Vec<DailySummary>, StoreError> {
        let bound = cutoff.format(DATE_KEY_FORMAT).to_string();
        decode_values(
            DAILY_SUMMARIES,
            self.daily_summaries.range(..bound.as_bytes()),
        )
    }

    async fn delete_summaries_before(&self, cutoff: NaiveDate) -> Result<u64, StoreError> {
        let bound = cutoff.format(DATE_KEY_FORMAT).to_string();
        remove_all(
            &self.daily_summaries,
            self.daily_summaries.range(..bound.as_bytes()).keys(),
        )
    }

    async fn delete_alerts_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        remove_before(&self.alerts, ALERTS, cutoff, |alert: &Alert| alert.created_at)
    }
}

// Sign bit flipped so pre-epoch instants still sort before later ones.
fn instant_prefix(millis: i64) -> [u8; 8] {
    ((millis as u64) ^ (1 << 63)).to_be_bytes()
}

fn encode<T: Serialize>(collection: &'static str, value: &T) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(value).map_err(|source| StoreError::Encode { collection, source })
}

fn decode_values<T, I>(collection: &'static str, items: I) -> Result<Vec<T>, StoreError>
where
    T: DeserializeOwned,
    I: Iterator<Item = sled::Result<(IVec, IVec)>>,
{
    let mut out = Vec::new();
    for item in items {
        let (_, value) = item?;
        match serde_json::from_slice::<T>(&value) {
            Ok(record) => out.push(record),
            Err(error) => {
                log::warn!(
                    "store_record_skipped collection={} reason=decode_failed error={}",
                    collection,
                    error
                );
            }
        }
    }
    Ok(out)
}

// Whole buckets below the cutoff's millisecond go by key; the cutoff's own
// bucket is decoded and compared exactly.
fn remove_before<T, F>(
    tree: &sled::Tree,
    collection: &'static str,
    cutoff: DateTime<Utc>,
    instant_of: F,
) -> Result<u64, StoreError>
where
    T: DeserializeOwned,
    F: Fn(&T) -> DateTime<Utc>,
{
    let cutoff_ms = cutoff.timestamp_millis();
    let bucket = instant_prefix(cutoff_ms);
    let mut batch = sled::Batch::default();
    let mut removed = 0u64;

    for key in tree.range(..bucket).keys() {
        batch.remove(key?);
        removed += 1;
    }

    let bucket_end = instant_prefix(cutoff_ms.saturating_add(1));
    for item in tree.range(bucket..bucket_end) {
        let (key, value) = item?;
        match serde_json::from_slice::<T>(&value) {
            Ok(record) if instant_of(&record) < cutoff => {
                batch.remove(key);
                removed += 1;
            }
            Ok(_) => {}
            Err(error) => {
                log::warn!(
                    "store_record_skipped collection={} reason=decode_failed error={}",
                    collection,
                    error
                );
            }
        }
    }

    if removed > 0 {
        tree.apply_batch(batch)?;
    }
    Ok(removed)
}

fn remove_all<I>(tree: &sled::Tree, keys: I) -> Result<u64, StoreError>
where
    I: Iterator<Item = sled::Result<IVec>>,
{
    let mut batch = sled::Batch::default();
    let mut removed = 0u64;
    for key in keys {
        batch.remove(key?);
        removed += 1;
    }

    if removed > 0 {
        tree.apply_batch(batch)?;
    }
    Ok(removed)
}
