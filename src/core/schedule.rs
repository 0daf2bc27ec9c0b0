//! Daily import trigger
//!
//! Fires once a day at a fixed UTC time. Each run is told whether it started
//! later than scheduled; the flag is logged and reported but does not change
//! what the run does.

use crate::config::ScheduleConfig;
use crate::core::import::{ImportCoordinator, ImportSummary};
use crate::domain::{Result, SyncError};
use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, Utc};
use std::time::Duration;
use tokio::sync::watch;

/// Fixed daily cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    at: NaiveTime,
    grace: Duration,
}

impl DailySchedule {
    pub fn new(at: NaiveTime, grace: Duration) -> Self {
        Self { at, grace }
    }

    pub fn from_config(config: &ScheduleConfig) -> Result<Self> {
        let at = config.time_of_day().map_err(SyncError::Configuration)?;
        Ok(Self::new(
            at,
            Duration::from_secs(config.past_due_grace_seconds),
        ))
    }

    pub fn time_of_day(&self) -> NaiveTime {
        self.at
    }

    /// First scheduled time strictly after `now`
    pub fn next_run_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.date_naive().and_time(self.at).and_utc();
        if today > now {
            today
        } else {
            today + ChronoDuration::days(1)
        }
    }

    /// Whether a run that started at `started` is late for `scheduled`
    pub fn is_past_due(&self, scheduled: DateTime<Utc>, started: DateTime<Utc>) -> bool {
        match (started - scheduled).to_std() {
            Ok(lateness) => lateness > self.grace,
            Err(_) => false,
        }
    }
}

/// Runs the import coordinator on a [`DailySchedule`]
pub struct Scheduler {
    schedule: DailySchedule,
    coordinator: ImportCoordinator,
}

impl Scheduler {
    pub fn new(schedule: DailySchedule, coordinator: ImportCoordinator) -> Self {
        Self {
            schedule,
            coordinator,
        }
    }

    /// Run the imports for one scheduled tick
    pub async fn trigger(&self, scheduled: DateTime<Utc>) -> ImportSummary {
        let started = Utc::now();
        let past_due = self.schedule.is_past_due(scheduled, started);

        tracing::info!(
            scheduled = %scheduled.to_rfc3339(),
            started = %started.to_rfc3339(),
            past_due = past_due,
            "Scheduled import triggered"
        );
        if past_due {
            tracing::warn!(
                lateness_secs = (started - scheduled).num_seconds(),
                "Scheduled import is running late"
            );
        }

        let mut summary = self.coordinator.run_enabled().await;
        summary.past_due = past_due;
        summary
    }

    /// Wait for each scheduled time and trigger, until shutdown is signalled
    ///
    /// Returns the number of completed runs.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> usize {
        let mut runs = 0usize;

        loop {
            if *shutdown.borrow() {
                break;
            }

            let next = self.schedule.next_run_after(Utc::now());
            let wait = (next - Utc::now()).to_std().unwrap_or(Duration::ZERO);
            tracing::info!(
                next_run = %next.to_rfc3339(),
                wait_secs = wait.as_secs(),
                "Waiting for next scheduled import"
            );

            tokio::select! {
                _ = tokio::time::sleep(wait) => {
                    let summary = self.trigger(next).await;
                    runs += 1;
                    if !summary.is_successful() {
                        tracing::error!(
                            failed = summary.failed_jobs(),
                            "Scheduled import finished with failures"
                        );
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!(runs = runs, "Scheduler stopped");
        runs
    }
}
