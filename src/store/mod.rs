use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

#[cfg(test)]
mod memory;
mod model;
mod sled_store;

#[cfg(test)]
pub use memory::{MemoryStore, StoreOperation};
pub use model::{Alert, DailySummary, HealthStatus, Snapshot};
pub use sled_store::SledStore;

pub const SNAPSHOTS: &str = "snapshots";
pub const DAILY_SUMMARIES: &str = "daily_summaries";
pub const ALERTS: &str = "alerts";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend failure: {0}")]
    Backend(#[from] sled::Error),
    #[error("failed to encode {collection} record: {source}")]
    Encode {
        collection: &'static str,
        source: serde_json::Error,
    },
}

/// Every bulk operation is atomic on its own; nothing spans collections.
/// `*_before` operations are strict (`<`).
pub trait HealthStore: Send + Sync {
    /// Snapshots with `start <= window_end <= end`, in the store's natural order.
    fn find_snapshots(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<Snapshot>, StoreError>> + Send;

    fn delete_snapshots_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Appends every summary. There is no uniqueness guard on `(model_id, date)`.
    fn insert_summaries(
        &self,
        summaries: Vec<DailySummary>,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    fn find_summaries_before(
        &self,
        cutoff: NaiveDate,
    ) -> impl Future<Output = Result<Vec<DailySummary>, StoreError>> + Send;

    fn delete_summaries_before(
        &self,
        cutoff: NaiveDate,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    fn delete_alerts_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;
}
