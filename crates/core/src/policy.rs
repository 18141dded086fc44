//! Business rules shared by every store implementation.
//!
//! Stores run these inside their transaction so the decision and the write
//! see the same rows.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::errors::{SalonError, SalonResult};
use crate::models::booking::BookingStatus;

/// Early/late classification of customer cancellations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancellationPolicy {
    early_threshold: Duration,
}

impl CancellationPolicy {
    pub fn new(early_threshold: Duration) -> Self {
        Self { early_threshold }
    }

    /// `CANCELLED_EARLY` when at least the threshold remains before the first
    /// reserved slot starts, plain `CANCELLED` otherwise.
    pub fn classify(&self, first_slot_start: DateTime<Utc>, now: DateTime<Utc>) -> BookingStatus {
        if first_slot_start - now >= self.early_threshold {
            BookingStatus::CancelledEarly
        } else {
            BookingStatus::Cancelled
        }
    }
}

/// Account suspension rule.
///
/// The account is deactivated when `total_cancelled - total_completed`
/// equals the configured gap exactly. The rule is a one-way ratchet: it is
/// evaluated after each counter change and never reactivates anyone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoyaltyPolicy {
    suspension_gap: i32,
}

impl LoyaltyPolicy {
    pub fn new(suspension_gap: i32) -> Self {
        Self { suspension_gap }
    }

    pub fn should_suspend(&self, total_cancelled: i32, total_completed: i32) -> bool {
        total_cancelled - total_completed == self.suspension_gap
    }
}

/// Current persisted state of a slot a customer wants to reserve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotCandidate {
    pub slot_id: Uuid,
    pub stylist_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub is_booked: bool,
    pub is_day_off: bool,
}

/// Checks that every requested slot can be reserved for `stylist_id` at `now`.
///
/// Reports the first problem found, in order: unknown slot, slot of another
/// stylist, slot already started, slot unavailable (booked or on a day off).
pub fn check_reservable(
    requested: &[Uuid],
    found: &[SlotCandidate],
    stylist_id: Uuid,
    now: DateTime<Utc>,
) -> SalonResult<()> {
    let by_id: HashMap<Uuid, &SlotCandidate> = found.iter().map(|c| (c.slot_id, c)).collect();

    for slot_id in requested {
        let candidate = by_id
            .get(slot_id)
            .ok_or_else(|| SalonError::NotFound(format!("Time slot with ID {} not found", slot_id)))?;

        if candidate.stylist_id != stylist_id {
            return Err(SalonError::Validation(format!(
                "Time slot {} does not belong to stylist {}",
                slot_id, stylist_id
            )));
        }
        if candidate.start_time <= now {
            return Err(SalonError::InvalidState(format!(
                "Time slot {} has already started",
                slot_id
            )));
        }
        if candidate.is_day_off || candidate.is_booked {
            return Err(SalonError::Conflict(format!(
                "Time slot {} is no longer available; refresh availability and try again",
                slot_id
            )));
        }
    }

    Ok(())
}
