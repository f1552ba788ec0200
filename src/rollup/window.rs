use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;

use crate::store::{HealthStore, Snapshot, StoreError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum DayBoundary {
    #[default]
    Local,
    Utc,
    Zone(Tz),
}

impl TryFrom<String> for DayBoundary {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        match raw.as_str() {
            "local" => Ok(Self::Local),
            "utc" => Ok(Self::Utc),
            name => name.parse::<Tz>().map(Self::Zone).map_err(|_| {
                format!("unknown day boundary `{name}`, expected local, utc or an IANA zone")
            }),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WindowError {
    #[error("day {0} has no representable boundary in the configured time zone")]
    UnrepresentableDay(NaiveDate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub date: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelGroup {
    pub model_id: String,
    pub snapshots: Vec<Snapshot>,
}

impl DayBoundary {
    pub fn date_of(self, instant: DateTime<Utc>) -> NaiveDate {
        match self {
            Self::Local => instant.with_timezone(&Local).date_naive(),
            Self::Utc => instant.date_naive(),
            Self::Zone(tz) => instant.with_timezone(&tz).date_naive(),
        }
    }

    pub fn yesterday(self, now: DateTime<Utc>) -> NaiveDate {
        self.date_of(now - Duration::hours(24))
    }

    /// `[date 00:00:00.000, date 23:59:59.999]` in this boundary's zone.
    pub fn window(self, date: NaiveDate) -> Result<DayWindow, WindowError> {
        match self {
            Self::Local => window_in(&Local, date),
            Self::Utc => window_in(&Utc, date),
            Self::Zone(tz) => window_in(&tz, date),
        }
    }
}

// A skipped midnight has no earliest instant; a repeated 23:59:59.999 takes
// the later one so the window covers the whole wall-clock day.
fn window_in<Z: TimeZone>(zone: &Z, date: NaiveDate) -> Result<DayWindow, WindowError> {
    let (Some(first), Some(last)) = (
        date.and_hms_milli_opt(0, 0, 0, 0),
        date.and_hms_milli_opt(23, 59, 59, 999),
    ) else {
        return Err(WindowError::UnrepresentableDay(date));
    };

    let start = zone
        .from_local_datetime(&first)
        .earliest()
        .map(|instant| instant.with_timezone(&Utc));
    let end = zone
        .from_local_datetime(&last)
        .latest()
        .map(|instant| instant.with_timezone(&Utc));
    let (Some(start), Some(end)) = (start, end) else {
        return Err(WindowError::UnrepresentableDay(date));
    };

    Ok(DayWindow { date, start, end })
}

pub async fn fetch_day<S: HealthStore>(
    store: &S,
    window: &DayWindow,
) -> Result<Vec<Snapshot>, StoreError> {
    store.find_snapshots(window.start, window.end).await
}

// Groups are ordered by model id; each group stably by `window_end`.
pub fn group_by_model(snapshots: Vec<Snapshot>) -> Vec<ModelGroup> {
    let mut groups: BTreeMap<String, Vec<Snapshot>> = BTreeMap::new();
    for snapshot in snapshots {
        groups
            .entry(snapshot.model_id.clone())
            .or_default()
            .push(snapshot);
    }

    groups
        .into_iter()
        .map(|(model_id, mut snapshots)| {
            snapshots.sort_by_key(|snapshot| snapshot.window_end);
            ModelGroup {
                model_id,
                snapshots,
            }
        })
        .collect()
}
