//! Run command implementation
//!
//! Keeps the process alive and triggers the import once a day until a
//! shutdown signal arrives.

use super::{load_or_report, provider};
use crate::core::import::ImportCoordinator;
use crate::core::schedule::{DailySchedule, Scheduler};
use clap::Args;
use tokio::sync::watch;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Trigger one import immediately before waiting for the schedule
    #[arg(long)]
    pub now: bool,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let Some(config) = load_or_report(config_path) else {
            return Ok(2);
        };

        let schedule = match DailySchedule::from_config(&config.schedule) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Invalid schedule: {e}");
                return Ok(2);
            }
        };

        let coordinator = ImportCoordinator::new(config.clone(), provider(&config))
            .with_shutdown(shutdown_signal.clone());
        let scheduler = Scheduler::new(schedule, coordinator);

        println!(
            "Scheduler started, imports run daily at {} UTC (Ctrl+C to stop)",
            schedule.time_of_day().format("%H:%M")
        );

        if self.now {
            let summary = scheduler.trigger(chrono::Utc::now()).await;
            if !summary.is_successful() {
                tracing::warn!(failed = summary.failed_jobs(), "Initial import had failures");
            }
        }

        let runs = scheduler.run(shutdown_signal).await;
        println!("Scheduler stopped after {runs} scheduled run(s)");
        Ok(0)
    }
}
