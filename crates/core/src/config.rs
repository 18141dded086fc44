//! Scheduling constants shared by the jobs and the booking services.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::policy::{CancellationPolicy, LoyaltyPolicy};
use crate::shift::{wall_clock, ShiftCalendar};

/// All recognised scheduling options.
///
/// `Default` carries the production values; the api crate overrides them from
/// the environment.
#[derive(Debug, Clone)]
pub struct SchedulingConfig {
    /// Zone in which shift times and "today" are interpreted
    pub timezone: Tz,
    pub calendar: ShiftCalendar,
    /// Schedules are generated for `today + horizon_days`
    pub horizon_days: u32,
    /// Slots of schedules older than `today - retention_days` are deleted
    pub retention_days: u32,
    /// Minimum notice for a customer cancellation to count as early
    pub early_cancel_hours: u32,
    /// `total_cancelled - total_completed` value that deactivates a customer
    pub suspension_gap: i32,
    /// Whether day-off schedules still get slot rows
    pub materialize_day_off_slots: bool,
    pub horizon_run_at: NaiveTime,
    pub retention_run_at: NaiveTime,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            calendar: ShiftCalendar::default(),
            horizon_days: 6,
            retention_days: 60,
            early_cancel_hours: 3,
            suspension_gap: -10,
            materialize_day_off_slots: true,
            horizon_run_at: wall_clock(0, 5),
            retention_run_at: wall_clock(0, 30),
        }
    }
}

impl SchedulingConfig {
    /// The salon-local calendar date of `now`.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.timezone).date_naive()
    }

    pub fn horizon_date(&self, today: NaiveDate) -> NaiveDate {
        today + Duration::days(i64::from(self.horizon_days))
    }

    pub fn retention_cutoff(&self, today: NaiveDate) -> NaiveDate {
        today - Duration::days(i64::from(self.retention_days))
    }

    /// Converts a salon-local wall-clock instant to UTC.
    ///
    /// Ambiguous instants (clocks turned back) resolve to the earlier one.
    /// Instants that do not exist (clocks turned forward) yield `None`.
    pub fn to_utc(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self.timezone.from_local_datetime(&local) {
            LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
            LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
            LocalResult::None => None,
        }
    }

    pub fn cancellation_policy(&self) -> CancellationPolicy {
        CancellationPolicy::new(Duration::hours(i64::from(self.early_cancel_hours)))
    }

    pub fn loyalty_policy(&self) -> LoyaltyPolicy {
        LoyaltyPolicy::new(self.suspension_gap)
    }
}
