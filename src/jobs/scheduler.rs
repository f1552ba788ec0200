use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, MissedTickBehavior, interval_at};

use crate::retention::SummaryArchive;
use crate::store::HealthStore;

use super::orchestrator::Orchestrator;
use super::report::JobReport;

pub const DEFAULT_INTERVAL_HOURS: u64 = 24;

// Every tick spawns its own run, so runs overlap when one outlasts the interval.
pub struct Scheduler<S, A> {
    orchestrator: Arc<Orchestrator<S, A>>,
    interval: Duration,
    timer: Option<JoinHandle<()>>,
}

impl<S, A> Scheduler<S, A>
where
    S: HealthStore + 'static,
    A: SummaryArchive + 'static,
{
    pub fn new(orchestrator: Orchestrator<S, A>, interval: Duration) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            interval,
            timer: None,
        }
    }

    pub async fn run_once(&self) -> JobReport {
        run_and_log(&self.orchestrator).await
    }

    pub async fn start(&mut self) -> JobReport {
        let report = self.run_once().await;
        self.arm();
        report
    }

    // First tick fires one interval from now.
    pub fn arm(&mut self) {
        if self.timer.is_some() {
            return;
        }

        let orchestrator = Arc::clone(&self.orchestrator);
        let period = self.interval;
        self.timer = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let orchestrator = Arc::clone(&orchestrator);
                tokio::spawn(async move {
                    run_and_log(&orchestrator).await;
                });
            }
        }));

        log::info!(
            "retention_scheduler_armed interval_secs={}",
            period.as_secs()
        );
    }

    // Runs already in flight are left to finish.
    pub async fn stop(&mut self) {
        let Some(timer) = self.timer.take() else {
            return;
        };

        timer.abort();
        match timer.await {
            Err(error) if !error.is_cancelled() => {
                log::warn!("retention_scheduler_stop_error error={}", error);
            }
            _ => {}
        }
        log::info!("retention_scheduler_stopped");
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }
}

async fn run_and_log<S, A>(orchestrator: &Orchestrator<S, A>) -> JobReport
where
    S: HealthStore,
    A: SummaryArchive,
{
    let report = orchestrator.run().await;
    if report.all_succeeded() {
        log::info!("retention_job_completed report={}", report.to_json());
    } else {
        log::warn!("retention_job_degraded report={}", report.to_json());
    }
    report
}
