use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};

use super::{Alert, DailySummary, HealthStore, Snapshot, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    FindSnapshots,
    DeleteSnapshots,
    InsertSummaries,
    FindSummaries,
    DeleteSummaries,
    DeleteAlerts,
}

#[derive(Debug, Default)]
struct Collections {
    snapshots: Vec<Snapshot>,
    daily_summaries: Vec<DailySummary>,
    alerts: Vec<Alert>,
    failing: HashSet<StoreOperation>,
    calls: Vec<StoreOperation>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshots(self, snapshots: impl IntoIterator<Item = Snapshot>) -> Self {
        self.lock().snapshots.extend(snapshots);
        self
    }

    pub fn with_summaries(self, summaries: impl IntoIterator<Item = DailySummary>) -> Self {
        self.lock().daily_summaries.extend(summaries);
        self
    }

    pub fn with_alerts(self, alerts: impl IntoIterator<Item = Alert>) -> Self {
        self.lock().alerts.extend(alerts);
        self
    }

    pub fn fail_on(&self, operation: StoreOperation) {
        self.lock().failing.insert(operation);
    }

    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.lock().snapshots.clone()
    }

    pub fn summaries(&self) -> Vec<DailySummary> {
        self.lock().daily_summaries.clone()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.lock().alerts.clone()
    }

    pub fn calls(&self, operation: StoreOperation) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| **call == operation)
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, Collections> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn enter(&self, operation: StoreOperation) -> Result<MutexGuard<'_, Collections>, StoreError> {
        let mut inner = self.lock();
        inner.calls.push(operation);
        if inner.failing.contains(&operation) {
            let reason = format!("injected failure on {:?}", operation);
            return Err(StoreError::Backend(sled::Error::Io(std::io::Error::other(
                reason,
            ))));
        }
        Ok(inner)
    }
}

impl HealthStore for MemoryStore {
    async fn find_snapshots(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Snapshot>, StoreError> {
        let inner = self.enter(StoreOperation::FindSnapshots)?;
        Ok(inner
            .snapshots
            .iter()
            .filter(|snapshot| snapshot.window_end >= start && snapshot.window_end <= end)
            .cloned()
            .collect())
    }

    async fn delete_snapshots_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut inner = self.enter(StoreOperation::DeleteSnapshots)?;
        let before = inner.snapshots.len();
        inner.snapshots.retain(|snapshot| snapshot.window_end >= cutoff);
        Ok((before - inner.snapshots.len()) as u64)
    }

    async fn insert_summaries(&self, summaries: Vec<DailySummary>) -> Result<u64, StoreError> {
        let mut inner = self.enter(StoreOperation::InsertSummaries)?;
        let inserted = summaries.len() as u64;
        inner.daily_summaries.extend(summaries);
        Ok(inserted)
    }

    async fn find_summaries_before(
        &self,
        cutoff: NaiveDate,
    ) -> Result<Vec<DailySummary>, StoreError> {
        let inner = self.enter(StoreOperation::FindSummaries)?;
        Ok(inner
            .daily_summaries
            .iter()
            .filter(|summary| summary.date < cutoff)
            .cloned()
            .collect())
    }

    async fn delete_summaries_before(&self, cutoff: NaiveDate) -> Result<u64, StoreError> {
        let mut inner = self.enter(StoreOperation::DeleteSummaries)?;
        let before = inner.daily_summaries.len();
        inner.daily_summaries.retain(|summary| summary.date >= cutoff);
        Ok((before - inner.daily_summaries.len()) as u64)
    }

    async fn delete_alerts_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut inner = self.enter(StoreOperation::DeleteAlerts)?;
        let before = inner.alerts.len();
        inner.alerts.retain(|alert| alert.created_at >= cutoff);
        Ok((before - inner.alerts.len()) as u64)
    }
}
