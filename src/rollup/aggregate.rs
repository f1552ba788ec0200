use chrono::{DateTime, NaiveDate, Utc};

use crate::store::{DailySummary, HealthStatus, Snapshot};

use super::window::ModelGroup;

#[derive(Debug, Default)]
struct SummaryAccumulator {
    snapshot_count: u64,
    critical_sum: u64,
    warning_sum: u64,
    critical_max: Option<u32>,
    warning_max: Option<u32>,
    last_status: Option<HealthStatus>,
    needs_retraining: bool,
}

impl SummaryAccumulator {
    fn add_snapshot(&mut self, snapshot: &Snapshot) {
        self.snapshot_count += 1;
        self.critical_sum += u64::from(snapshot.critical_count);
        self.warning_sum += u64::from(snapshot.warning_count);

        self.critical_max = Some(
            self.critical_max
                .map_or(snapshot.critical_count, |value| value.max(snapshot.critical_count)),
        );
        self.warning_max = Some(
            self.warning_max
                .map_or(snapshot.warning_count, |value| value.max(snapshot.warning_count)),
        );

        self.last_status = Some(snapshot.overall_status);
        self.needs_retraining |= snapshot.needs_retraining;
    }

    fn finish(
        self,
        model_id: &str,
        date: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Option<DailySummary> {
        let overall_status = self.last_status?;
        let count = self.snapshot_count as f64;
        Some(DailySummary {
            model_id: model_id.to_string(),
            date,
            snapshot_count: self.snapshot_count,
            avg_critical_count: self.critical_sum as f64 / count,
            max_critical_count: self.critical_max.unwrap_or(0),
            avg_warning_count: self.warning_sum as f64 / count,
            max_warning_count: self.warning_max.unwrap_or(0),
            overall_status,
            needs_retraining: self.needs_retraining,
            created_at,
        })
    }
}

// `overall_status` comes from the last snapshot in group order.
pub fn summarize(
    group: &ModelGroup,
    date: NaiveDate,
    created_at: DateTime<Utc>,
) -> Option<DailySummary> {
    let mut accumulator = SummaryAccumulator::default();
    for snapshot in &group.snapshots {
        accumulator.add_snapshot(snapshot);
    }
    accumulator.finish(&group.model_id, date, created_at)
}

pub fn summarize_groups(
    groups: &[ModelGroup],
    date: NaiveDate,
    created_at: DateTime<Utc>,
) -> Vec<DailySummary> {
    groups
        .iter()
        .filter_map(|group| summarize(group, date, created_at))
        .collect()
}
