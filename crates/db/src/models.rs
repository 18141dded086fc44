use chrono::{DateTime, NaiveDate, Utc};
use eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use salonbook_core::models::{
    booking::{Booking, BookingStatus},
    customer::Customer,
    directory::{SalonService, Stylist},
    leave::{LeaveRequest, LeaveStatus},
    schedule::{TimeSlot, WorkSchedule},
};
use salonbook_core::policy::SlotCandidate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbWorkSchedule {
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

impl From<DbWorkSchedule> for WorkSchedule {
    fn from(row: DbWorkSchedule) -> Self {
        Self {
            id: row.id,
            stylist_id: row.stylist_id,
            working_date: row.working_date,
            morning_start: row.morning_start,
            morning_end: row.morning_end,
            afternoon_start: row.afternoon_start,
            afternoon_end: row.afternoon_end,
            is_day_off: row.is_day_off,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbTimeSlot {
    pub id: Uuid,
    pub schedule_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_booked: bool,
}

impl From<DbTimeSlot> for TimeSlot {
    fn from(row: DbTimeSlot) -> Self {
        Self {
            id: row.id,
            schedule_id: row.schedule_id,
            start_time: row.start_time,
            end_time: row.end_time,
            is_booked: row.is_booked,
        }
    }
}

/// A slot joined with the schedule facts needed to decide whether it can be reserved.
#[derive(Debug, Clone, FromRow)]
pub struct DbSlotCandidate {
    pub id: Uuid,
    pub stylist_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub is_booked: bool,
    pub is_day_off: bool,
}

impl From<DbSlotCandidate> for SlotCandidate {
    fn from(row: DbSlotCandidate) -> Self {
        Self {
            slot_id: row.id,
            stylist_id: row.stylist_id,
            start_time: row.start_time,
            is_booked: row.is_booked,
            is_day_off: row.is_day_off,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbLeaveRequest {
    pub id: Uuid,
    pub stylist_id: Uuid,
    pub salon_id: Uuid,
    pub date: NaiveDate,
    pub reason: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbLeaveRequest> for LeaveRequest {
    type Error = eyre::Report;

    fn try_from(row: DbLeaveRequest) -> Result<Self> {
        let status = row.status.parse::<LeaveStatus>().map_err(|e| eyre!(e))?;
        Ok(Self {
            id: row.id,
            stylist_id: row.stylist_id,
            salon_id: row.salon_id,
            date: row.date,
            reason: row.reason,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBooking {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub stylist_id: Uuid,
    pub salon_id: Uuid,
    pub total_price: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbBooking {
    pub fn status(&self) -> Result<BookingStatus> {
        self.status.parse::<BookingStatus>().map_err(|e| eyre!(e))
    }

    /// Combines the booking row with its join rows.
    pub fn into_booking(self, slot_ids: Vec<Uuid>, service_ids: Vec<Uuid>) -> Result<Booking> {
        let status = self.status()?;
        Ok(Booking {
            id: self.id,
            customer_id: self.customer_id,
            stylist_id: self.stylist_id,
            salon_id: self.salon_id,
            total_price: self.total_price,
            status,
            slot_ids,
            service_ids,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbCustomer {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_completed: i32,
    pub total_cancelled: i32,
    pub total_spending: i64,
    pub is_active: bool,
}

impl From<DbCustomer> for Customer {
    fn from(row: DbCustomer) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            total_completed: row.total_completed,
            total_cancelled: row.total_cancelled,
            total_spending: row.total_spending,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbStylist {
    pub id: Uuid,
    pub user_id: Uuid,
    pub salon_id: Uuid,
    pub is_active: bool,
}

impl From<DbStylist> for Stylist {
    fn from(row: DbStylist) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            salon_id: row.salon_id,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSalonService {
    pub id: Uuid,
    pub salon_id: Uuid,
    pub price: i64,
}

impl From<DbSalonService> for SalonService {
    fn from(row: DbSalonService) -> Self {
        Self {
            id: row.id,
            salon_id: row.salon_id,
            price: row.price,
        }
    }
}
