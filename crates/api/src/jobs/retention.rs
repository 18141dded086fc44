use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;

use salonbook_core::config::SchedulingConfig;
use salonbook_core::errors::SalonResult;
use salonbook_db::SalonStore;

use super::{DailyJob, JobReport};

/// Deletes the slots of schedules older than the retention window.
///
/// Schedule rows stay behind. Bookings that old are assumed terminal; their
/// slot links disappear with the slots.
#[derive(Clone)]
pub struct RetentionSweeper {
    store: Arc<dyn SalonStore>,
    config: Arc<SchedulingConfig>,
}

impl RetentionSweeper {
    pub fn new(store: Arc<dyn SalonStore>, config: Arc<SchedulingConfig>) -> Self {
        Self { store, config }
    }

    /// Removes slots of every schedule dated before `cutoff`.
    pub async fn sweep(&self, cutoff: NaiveDate) -> SalonResult<JobReport> {
        let stale = self.store.stale_schedule_ids(cutoff).await?;
        let mut report = JobReport::default();

        for schedule_id in stale {
            match self.store.delete_schedule_slots(schedule_id).await {
                Ok(deleted) => {
                    report.succeeded += 1;
                    report.slots += deleted;
                }
                Err(e) => {
                    tracing::warn!("Failed to delete slots of schedule {}: {}", schedule_id, e);
                    report.failed += 1;
                }
            }
        }

        tracing::info!("Retention sweep before {}: {}", cutoff, report);
        Ok(report)
    }
}

#[async_trait]
impl DailyJob for RetentionSweeper {
    fn name(&self) -> &'static str {
        "retention-sweep"
    }

    fn run_at(&self) -> NaiveTime {
        self.config.retention_run_at
    }

    async fn run(&self, today: NaiveDate) -> SalonResult<JobReport> {
        self.sweep(self.config.retention_cutoff(today)).await
    }
}
