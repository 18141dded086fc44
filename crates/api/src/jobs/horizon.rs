use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::sync::Arc;

use salonbook_core::config::SchedulingConfig;
use salonbook_core::errors::{SalonError, SalonResult};
use salonbook_core::models::directory::Stylist;
use salonbook_core::models::schedule::{NewTimeSlot, NewWorkSchedule};
use salonbook_db::SalonStore;

use super::{DailyJob, JobReport};

/// Keeps every active stylist's schedule generated `horizon_days` ahead.
///
/// Running twice for the same date is a no-op the second time: existing
/// schedules are skipped, and the store's uniqueness on
/// `(stylist, working_date)` settles concurrent runs.
#[derive(Clone)]
pub struct HorizonAdvancer {
    store: Arc<dyn SalonStore>,
    config: Arc<SchedulingConfig>,
}

impl HorizonAdvancer {
    pub fn new(store: Arc<dyn SalonStore>, config: Arc<SchedulingConfig>) -> Self {
        Self { store, config }
    }

    /// Ensures every active stylist has a schedule on `target`.
    pub async fn advance(&self, target: NaiveDate) -> SalonResult<JobReport> {
        let stylists = self.store.list_active_stylists().await?;
        let mut report = JobReport::default();

        for stylist in &stylists {
            match self.advance_stylist(stylist, target).await {
                Ok(Some(slots)) => {
                    report.succeeded += 1;
                    report.slots += slots;
                }
                Ok(None) => report.skipped += 1,
                Err(e) => {
                    tracing::warn!("Failed to generate schedule for stylist {} on {}: {}", stylist.id, target, e);
                    report.failed += 1;
                }
            }
        }

        tracing::info!("Horizon advanced to {}: {}", target, report);
        Ok(report)
    }

    /// Advances every date in `[from, to]`.
    pub async fn backfill(&self, from: NaiveDate, to: NaiveDate) -> SalonResult<JobReport> {
        let mut report = JobReport::default();
        let mut date = from;
        while date <= to {
            report.merge(self.advance(date).await?);
            date += Duration::days(1);
        }
        Ok(report)
    }

    /// Creates one stylist's schedule; returns the slot count, or `None` if
    /// the schedule already existed.
    async fn advance_stylist(&self, stylist: &Stylist, date: NaiveDate) -> SalonResult<Option<u64>> {
        if self.store.find_schedule(stylist.id, date).await?.is_some() {
            return Ok(None);
        }

        let is_day_off = self.store.has_approved_leave(stylist.id, date).await?;
        let calendar = &self.config.calendar;
        let (morning_start, morning_end) = calendar.morning.on(date);
        let (afternoon_start, afternoon_end) = calendar.afternoon.on(date);

        let schedule = NewWorkSchedule {
            stylist_id: stylist.id,
            working_date: date,
            morning_start: self.instant(morning_start)?,
            morning_end: self.instant(morning_end)?,
            afternoon_start: self.instant(afternoon_start)?,
            afternoon_end: self.instant(afternoon_end)?,
            is_day_off,
        };

        let slots: Vec<NewTimeSlot> = if is_day_off && !self.config.materialize_day_off_slots {
            Vec::new()
        } else {
            calendar
                .slots_for(date)
                .filter_map(|bounds| {
                    Some(NewTimeSlot {
                        start_time: self.config.to_utc(bounds.start)?,
                        end_time: self.config.to_utc(bounds.end)?,
                    })
                })
                .collect()
        };
        let count = slots.len() as u64;

        Ok(self
            .store
            .create_schedule(schedule, slots)
            .await?
            .map(|_| count))
    }

    fn instant(&self, local: NaiveDateTime) -> SalonResult<DateTime<Utc>> {
        self.config.to_utc(local).ok_or_else(|| {
            SalonError::Internal(
                format!("Shift boundary {} does not exist in {}", local, self.config.timezone).into(),
            )
        })
    }
}

#[async_trait]
impl DailyJob for HorizonAdvancer {
    fn name(&self) -> &'static str {
        "horizon-advance"
    }

    fn run_at(&self) -> NaiveTime {
        self.config.horizon_run_at
    }

    async fn run(&self, today: NaiveDate) -> SalonResult<JobReport> {
        self.advance(self.config.horizon_date(today)).await
    }
}
