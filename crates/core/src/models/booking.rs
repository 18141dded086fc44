use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::{SalonError, SalonResult};
use crate::models::customer::Customer;

/// Booking status.
///
/// ```text
/// PENDING -> CONFIRMED -> COMPLETED
/// PENDING | CONFIRMED -> CANCELLED | CANCELLED_EARLY | CANCELLED_DAYOFF
/// ```
///
/// `COMPLETED` and every cancellation are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    CancelledEarly,
    CancelledDayoff,
}

impl BookingStatus {
    pub fn is_cancellation(self) -> bool {
        matches!(
            self,
            BookingStatus::Cancelled | BookingStatus::CancelledEarly | BookingStatus::CancelledDayoff
        )
    }

    pub fn is_terminal(self) -> bool {
        self == BookingStatus::Completed || self.is_cancellation()
    }

    /// Statuses from which `self` can be reached.
    pub fn allowed_sources(self) -> &'static [BookingStatus] {
        match self {
            BookingStatus::Pending => &[],
            BookingStatus::Confirmed => &[BookingStatus::Pending],
            BookingStatus::Completed => &[BookingStatus::Confirmed],
            BookingStatus::Cancelled | BookingStatus::CancelledEarly | BookingStatus::CancelledDayoff => {
                &[BookingStatus::Pending, BookingStatus::Confirmed]
            }
        }
    }

    pub fn check_transition(self, to: BookingStatus) -> SalonResult<()> {
        if self.is_terminal() {
            return Err(SalonError::InvalidState(format!(
                "Booking is already {} and cannot change",
                self
            )));
        }
        if !to.allowed_sources().contains(&self) {
            return Err(SalonError::InvalidState(format!(
                "Booking cannot move from {} to {}",
                self, to
            )));
        }
        Ok(())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::CancelledEarly => "CANCELLED_EARLY",
            BookingStatus::CancelledDayoff => "CANCELLED_DAYOFF",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(BookingStatus::Pending),
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            "COMPLETED" => Ok(BookingStatus::Completed),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            "CANCELLED_EARLY" => Ok(BookingStatus::CancelledEarly),
            "CANCELLED_DAYOFF" => Ok(BookingStatus::CancelledDayoff),
            _ => Err(format!("Invalid booking status: {}", s)),
        }
    }
}

/// Writes a status change carries besides the status column itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransitionEffects {
    pub release_slots: bool,
    pub cancelled_delta: i32,
    pub completed_delta: i32,
    pub spending_delta: i64,
}

impl TransitionEffects {
    pub fn for_target(target: BookingStatus, total_price: i64) -> Self {
        match target {
            BookingStatus::Pending | BookingStatus::Confirmed => Self::default(),
            BookingStatus::Completed => Self {
                completed_delta: 1,
                spending_delta: total_price,
                ..Self::default()
            },
            BookingStatus::Cancelled => Self {
                release_slots: true,
                cancelled_delta: 1,
                ..Self::default()
            },
            BookingStatus::CancelledEarly | BookingStatus::CancelledDayoff => Self {
                release_slots: true,
                ..Self::default()
            },
        }
    }

    pub fn touches_counters(&self) -> bool {
        self.cancelled_delta != 0 || self.completed_delta != 0 || self.spending_delta != 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub stylist_id: Uuid,
    pub salon_id: Uuid,
    pub total_price: i64,
    pub status: BookingStatus,
    pub slot_ids: Vec<Uuid>,
    pub service_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub stylist_id: Uuid,
    pub salon_id: Uuid,
    pub slot_ids: Vec<Uuid>,
    pub service_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateBookingStatusRequest {
    pub status: BookingStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub customer_id: Uuid,
    pub stylist_id: Uuid,
    pub salon_id: Uuid,
    pub total_price: i64,
    pub slot_ids: Vec<Uuid>,
    pub service_ids: Vec<Uuid>,
}

/// Result of one committed status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub booking: Booking,
    pub customer: Customer,
    /// Set when this transition deactivated the customer's account
    pub suspended: bool,
}

/// Which bookings an actor may act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingScope {
    Customer(Uuid),
    Stylist(Uuid),
    Salon(Uuid),
    All,
}

impl BookingScope {
    pub fn covers(&self, booking: &Booking) -> bool {
        match self {
            BookingScope::Customer(customer_id) => booking.customer_id == *customer_id,
            BookingScope::Stylist(stylist_id) => booking.stylist_id == *stylist_id,
            BookingScope::Salon(salon_id) => booking.salon_id == *salon_id,
            BookingScope::All => true,
        }
    }
}
