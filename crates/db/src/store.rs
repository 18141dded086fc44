//! # Store abstraction
//!
//! [`SalonStore`] is the only way services and jobs touch persisted state.
//! Every method is one unit of work: either all of its writes become visible
//! or none do, and every check it performs reads current state inside the
//! same unit. Business rules come from `salonbook_core::policy` and the state
//! machines in `salonbook_core::models`, so the Postgres store and the
//! in-memory store agree on behaviour.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use salonbook_core::errors::SalonResult;
use salonbook_core::models::{
    booking::{Booking, BookingStatus, NewBooking, TransitionOutcome},
    customer::Customer,
    directory::{SalonService, Stylist},
    leave::{LeaveRequest, LeaveScope, LeaveStatus, NewLeaveRequest},
    schedule::{NewTimeSlot, NewWorkSchedule, ScheduleWithSlots, TimeSlot, WorkSchedule},
};
use salonbook_core::policy::LoyaltyPolicy;

#[async_trait]
pub trait SalonStore: Send + Sync {
    // Directory lookups

    /// Stylists that should receive generated schedules
    async fn list_active_stylists(&self) -> SalonResult<Vec<Stylist>>;

    async fn get_stylist(&self, id: Uuid) -> SalonResult<Option<Stylist>>;

    async fn find_stylist_by_user(&self, user_id: Uuid) -> SalonResult<Option<Stylist>>;

    /// Salon a manager account is attached to
    async fn find_manager_salon(&self, user_id: Uuid) -> SalonResult<Option<Uuid>>;

    async fn find_customer_by_user(&self, user_id: Uuid) -> SalonResult<Option<Customer>>;

    async fn get_customer(&self, id: Uuid) -> SalonResult<Option<Customer>>;

    async fn get_services(&self, ids: &[Uuid]) -> SalonResult<Vec<SalonService>>;

    // Schedules

    async fn find_schedule(&self, stylist_id: Uuid, date: NaiveDate) -> SalonResult<Option<WorkSchedule>>;

    /// Creates a schedule and its slots together.
    ///
    /// Returns `None`, writing nothing, when the stylist already has a
    /// schedule for that date.
    async fn create_schedule(
        &self,
        schedule: NewWorkSchedule,
        slots: Vec<NewTimeSlot>,
    ) -> SalonResult<Option<WorkSchedule>>;

    /// Schedules in `[from, to]` with their slots, ordered by date.
    async fn list_schedules(
        &self,
        stylist_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> SalonResult<Vec<ScheduleWithSlots>>;

    /// Schedules dated before `cutoff` that still own slots.
    ///
    /// Schedules with a slot held by a `PENDING` or `CONFIRMED` booking are
    /// left out.
    async fn stale_schedule_ids(&self, cutoff: NaiveDate) -> SalonResult<Vec<Uuid>>;

    /// Deletes the slots of one schedule; returns how many were removed.
    async fn delete_schedule_slots(&self, schedule_id: Uuid) -> SalonResult<u64>;

    // Leave register

    /// Inserts a `PENDING` request, or fails with `Conflict` if the stylist
    /// already has a pending or approved request for the date.
    async fn insert_leave_request(&self, request: NewLeaveRequest) -> SalonResult<LeaveRequest>;

    async fn get_leave_request(&self, id: Uuid) -> SalonResult<Option<LeaveRequest>>;

    async fn list_leave_requests(&self, scope: LeaveScope) -> SalonResult<Vec<LeaveRequest>>;

    /// Compare-and-set; `None` when the request is missing or no longer in `from`.
    async fn update_leave_status(
        &self,
        id: Uuid,
        from: LeaveStatus,
        to: LeaveStatus,
    ) -> SalonResult<Option<LeaveRequest>>;

    async fn has_approved_leave(&self, stylist_id: Uuid, date: NaiveDate) -> SalonResult<bool>;

    // Booking lifecycle

    /// Reserves every requested slot and inserts a `PENDING` booking.
    ///
    /// All-or-nothing: if any slot fails `check_reservable` at `now`, no slot
    /// changes and no booking exists afterwards.
    async fn create_booking(&self, booking: NewBooking, now: DateTime<Utc>) -> SalonResult<Booking>;

    async fn get_booking(&self, id: Uuid) -> SalonResult<Option<Booking>>;

    /// Slots held by a booking, ordered by start time.
    async fn booking_slots(&self, booking_id: Uuid) -> SalonResult<Vec<TimeSlot>>;

    /// Moves a booking to `target` together with its side effects.
    ///
    /// Status change, slot release, counter updates and the suspension check
    /// commit together. Fails with `NotFound` for an unknown booking and
    /// `InvalidState` when the current status cannot reach `target`.
    async fn transition_booking(
        &self,
        booking_id: Uuid,
        target: BookingStatus,
        loyalty: LoyaltyPolicy,
    ) -> SalonResult<TransitionOutcome>;
}
