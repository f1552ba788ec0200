mod orchestrator;
mod report;
mod scheduler;

pub use orchestrator::Orchestrator;
pub use scheduler::{DEFAULT_INTERVAL_HOURS, Scheduler};
