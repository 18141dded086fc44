use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stylist's working day.
///
/// Unique per `(stylist_id, working_date)`. Shift boundaries are stored as
/// absolute instants computed from the salon-local shift times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkSchedule {
    pub id: Uuid,
    pub stylist_id: Uuid,
    pub working_date: NaiveDate,
    pub morning_start: DateTime<Utc>,
    pub morning_end: DateTime<Utc>,
    pub afternoon_start: DateTime<Utc>,
    pub afternoon_end: DateTime<Utc>,
    pub is_day_off: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: Uuid,
    pub schedule_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_booked: bool,
}

/// A schedule together with its slots ordered by start time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleWithSlots {
    pub schedule: WorkSchedule,
    pub slots: Vec<TimeSlot>,
}

impl ScheduleWithSlots {
    /// Slots a customer may still reserve. A day off has none, whatever rows exist.
    pub fn bookable_slots(&self) -> impl Iterator<Item = &TimeSlot> {
        let day_off = self.schedule.is_day_off;
        self.slots.iter().filter(move |slot| !day_off && !slot.is_booked)
    }
}

/// Insert payload for a freshly generated schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWorkSchedule {
    pub stylist_id: Uuid,
    pub working_date: NaiveDate,
    pub morning_start: DateTime<Utc>,
    pub morning_end: DateTime<Utc>,
    pub afternoon_start: DateTime<Utc>,
    pub afternoon_end: DateTime<Utc>,
    pub is_day_off: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewTimeSlot {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub id: Uuid,
    pub stylist_id: Uuid,
    pub working_date: NaiveDate,
    pub morning_start: DateTime<Utc>,
    pub morning_end: DateTime<Utc>,
    pub afternoon_start: DateTime<Utc>,
    pub afternoon_end: DateTime<Utc>,
    pub is_day_off: bool,
    pub slots: Vec<TimeSlotResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlotResponse {
    pub id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub is_booked: bool,
    pub is_bookable: bool,
}

impl From<ScheduleWithSlots> for ScheduleResponse {
    fn from(value: ScheduleWithSlots) -> Self {
        let ScheduleWithSlots { schedule, slots } = value;
        let day_off = schedule.is_day_off;
        Self {
            id: schedule.id,
            stylist_id: schedule.stylist_id,
            working_date: schedule.working_date,
            morning_start: schedule.morning_start,
            morning_end: schedule.morning_end,
            afternoon_start: schedule.afternoon_start,
            afternoon_end: schedule.afternoon_end,
            is_day_off: day_off,
            slots: slots
                .into_iter()
                .map(|slot| TimeSlotResponse {
                    id: slot.id,
                    start: slot.start_time,
                    end: slot.end_time,
                    is_booked: slot.is_booked,
                    is_bookable: !day_off && !slot.is_booked,
                })
                .collect(),
        }
    }
}
