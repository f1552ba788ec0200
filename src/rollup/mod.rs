mod aggregate;
mod window;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::store::{DailySummary, HealthStore, StoreError};

use aggregate::summarize_groups;
use window::{fetch_day, group_by_model};

pub use window::{DayBoundary, WindowError};

#[derive(Debug)]
pub struct DayRollup {
    pub date: NaiveDate,
    pub summaries: Vec<DailySummary>,
}

#[derive(Debug, Error)]
pub enum RollupError {
    #[error(transparent)]
    Window(#[from] WindowError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub async fn rollup_day<S: HealthStore>(
    store: &S,
    boundary: DayBoundary,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<DayRollup, RollupError> {
    let window = boundary.window(date)?;
    let snapshots = fetch_day(store, &window).await?;
    let groups = group_by_model(snapshots);

    log::debug!(
        "rollup_day_fetched date={} start={} end={} models={}",
        window.date,
        window.start.to_rfc3339(),
        window.end.to_rfc3339(),
        groups.len()
    );

    Ok(DayRollup {
        date,
        summaries: summarize_groups(&groups, date, now),
    })
}
