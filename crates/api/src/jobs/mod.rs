//! # Daily jobs
//!
//! The Horizon Advancer and the Retention Sweeper run once a day at a
//! configured wall-clock time. Both isolate failures per item: a failing
//! stylist or schedule is counted and logged, the rest of the run continues,
//! and the next run retries because both jobs are idempotent.

pub mod horizon;
pub mod retention;
pub mod scheduler;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use salonbook_core::errors::SalonResult;

/// Outcome of one job run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobReport {
    /// Items (stylists or schedules) the run changed
    pub succeeded: usize,
    /// Items that needed no work
    pub skipped: usize,
    /// Items whose work failed and will be retried next run
    pub failed: usize,
    /// Slot rows created or deleted
    pub slots: u64,
}

impl JobReport {
    pub fn merge(&mut self, other: JobReport) {
        self.succeeded += other.succeeded;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.slots += other.slots;
    }
}

impl fmt::Display for JobReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "succeeded={} skipped={} failed={} slots={}",
            self.succeeded, self.skipped, self.failed, self.slots
        )
    }
}

#[async_trait]
pub trait DailyJob: Send + Sync {
    fn name(&self) -> &'static str;

    /// Salon-local time of day the job fires
    fn run_at(&self) -> NaiveTime;

    /// Runs the job as if `today` were the current salon-local date.
    async fn run(&self, today: NaiveDate) -> SalonResult<JobReport>;
}
