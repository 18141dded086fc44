use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use salonbook_core::errors::{SalonError, SalonResult};
use salonbook_core::models::{
    booking::{Booking, BookingStatus, NewBooking, TransitionEffects, TransitionOutcome},
    customer::Customer,
    directory::{SalonService, Stylist},
    leave::{LeaveRequest, LeaveScope, LeaveStatus, NewLeaveRequest},
    schedule::{NewTimeSlot, NewWorkSchedule, ScheduleWithSlots, TimeSlot, WorkSchedule},
};
use salonbook_core::policy::{check_reservable, LoyaltyPolicy, SlotCandidate};

use crate::repositories::{booking, customer, directory, leave, schedule, time_slot};
use crate::store::SalonStore;
use crate::DbPool;

/// [`SalonStore`] backed by PostgreSQL.
///
/// Multi-row units of work run in one transaction; dropping the transaction
/// on an early return rolls it back.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn sql_error(err: sqlx::Error) -> SalonError {
    SalonError::Database(err.into())
}

#[async_trait]
impl SalonStore for PgStore {
    async fn list_active_stylists(&self) -> SalonResult<Vec<Stylist>> {
        let rows = directory::list_active_stylists(&self.pool)
            .await
            .map_err(SalonError::Database)?;
        Ok(rows.into_iter().map(Stylist::from).collect())
    }

    async fn get_stylist(&self, id: Uuid) -> SalonResult<Option<Stylist>> {
        let row = directory::get_stylist_by_id(&self.pool, id)
            .await
            .map_err(SalonError::Database)?;
        Ok(row.map(Stylist::from))
    }

    async fn find_stylist_by_user(&self, user_id: Uuid) -> SalonResult<Option<Stylist>> {
        let row = directory::get_stylist_by_user_id(&self.pool, user_id)
            .await
            .map_err(SalonError::Database)?;
        Ok(row.map(Stylist::from))
    }

    async fn find_manager_salon(&self, user_id: Uuid) -> SalonResult<Option<Uuid>> {
        directory::get_manager_salon_id(&self.pool, user_id)
            .await
            .map_err(SalonError::Database)
    }

    async fn find_customer_by_user(&self, user_id: Uuid) -> SalonResult<Option<Customer>> {
        let row = customer::get_customer_by_user_id(&self.pool, user_id)
            .await
            .map_err(SalonError::Database)?;
        Ok(row.map(Customer::from))
    }

    async fn get_customer(&self, id: Uuid) -> SalonResult<Option<Customer>> {
        let row = customer::get_customer_by_id(&self.pool, id)
            .await
            .map_err(SalonError::Database)?;
        Ok(row.map(Customer::from))
    }

    async fn get_services(&self, ids: &[Uuid]) -> SalonResult<Vec<SalonService>> {
        let rows = directory::get_services_by_ids(&self.pool, ids)
            .await
            .map_err(SalonError::Database)?;
        Ok(rows.into_iter().map(SalonService::from).collect())
    }

    async fn find_schedule(&self, stylist_id: Uuid, date: NaiveDate) -> SalonResult<Option<WorkSchedule>> {
        let row = schedule::get_schedule_by_stylist_and_date(&self.pool, stylist_id, date)
            .await
            .map_err(SalonError::Database)?;
        Ok(row.map(WorkSchedule::from))
    }

    async fn create_schedule(
        &self,
        new_schedule: NewWorkSchedule,
        slots: Vec<NewTimeSlot>,
    ) -> SalonResult<Option<WorkSchedule>> {
        let mut tx = self.pool.begin().await.map_err(sql_error)?;

        let Some(row) = schedule::insert_schedule(&mut *tx, &new_schedule)
            .await
            .map_err(SalonError::Database)?
        else {
            tracing::debug!(
                "Schedule already exists: stylist_id={}, date={}",
                new_schedule.stylist_id, new_schedule.working_date
            );
            return Ok(None);
        };

        if !slots.is_empty() {
            time_slot::insert_time_slots(&mut *tx, row.id, &slots)
                .await
                .map_err(SalonError::Database)?;
        }

        tx.commit().await.map_err(sql_error)?;
        Ok(Some(row.into()))
    }

    async fn list_schedules(
        &self,
        stylist_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> SalonResult<Vec<ScheduleWithSlots>> {
        let schedules = schedule::list_schedules_in_range(&self.pool, stylist_id, from, to)
            .await
            .map_err(SalonError::Database)?;
        if schedules.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = schedules.iter().map(|s| s.id).collect();
        let slots = time_slot::get_time_slots_by_schedule_ids(&self.pool, &ids)
            .await
            .map_err(SalonError::Database)?;

        let mut by_schedule: HashMap<Uuid, Vec<TimeSlot>> = HashMap::new();
        for slot in slots {
            by_schedule.entry(slot.schedule_id).or_default().push(slot.into());
        }

        Ok(schedules
            .into_iter()
            .map(|row| {
                let slots = by_schedule.remove(&row.id).unwrap_or_default();
                ScheduleWithSlots {
                    schedule: row.into(),
                    slots,
                }
            })
            .collect())
    }

    async fn stale_schedule_ids(&self, cutoff: NaiveDate) -> SalonResult<Vec<Uuid>> {
        schedule::list_stale_schedule_ids(&self.pool, cutoff)
            .await
            .map_err(SalonError::Database)
    }

    async fn delete_schedule_slots(&self, schedule_id: Uuid) -> SalonResult<u64> {
        time_slot::delete_time_slots_by_schedule_id(&self.pool, schedule_id)
            .await
            .map_err(SalonError::Database)
    }

    async fn insert_leave_request(&self, request: NewLeaveRequest) -> SalonResult<LeaveRequest> {
        let row = leave::insert_leave_request(&self.pool, &request)
            .await
            .map_err(SalonError::Database)?
            .ok_or_else(|| {
                SalonError::Conflict(format!(
                    "A pending or approved leave request already exists for {}",
                    request.date
                ))
            })?;
        LeaveRequest::try_from(row).map_err(SalonError::Database)
    }

    async fn get_leave_request(&self, id: Uuid) -> SalonResult<Option<LeaveRequest>> {
        let row = leave::get_leave_request_by_id(&self.pool, id)
            .await
            .map_err(SalonError::Database)?;
        row.map(LeaveRequest::try_from)
            .transpose()
            .map_err(SalonError::Database)
    }

    async fn list_leave_requests(&self, scope: LeaveScope) -> SalonResult<Vec<LeaveRequest>> {
        let (stylist_id, salon_id) = match scope {
            LeaveScope::Own(stylist_id) => (Some(stylist_id), None),
            LeaveScope::Salon(salon_id) => (None, Some(salon_id)),
            LeaveScope::All => (None, None),
        };
        let rows = leave::list_leave_requests(&self.pool, stylist_id, salon_id)
            .await
            .map_err(SalonError::Database)?;
        rows.into_iter()
            .map(LeaveRequest::try_from)
            .collect::<eyre::Result<Vec<_>>>()
            .map_err(SalonError::Database)
    }

    async fn update_leave_status(
        &self,
        id: Uuid,
        from: LeaveStatus,
        to: LeaveStatus,
    ) -> SalonResult<Option<LeaveRequest>> {
        let row = leave::update_leave_status(&self.pool, id, from, to)
            .await
            .map_err(SalonError::Database)?;
        row.map(LeaveRequest::try_from)
            .transpose()
            .map_err(SalonError::Database)
    }

    async fn has_approved_leave(&self, stylist_id: Uuid, date: NaiveDate) -> SalonResult<bool> {
        leave::has_approved_leave(&self.pool, stylist_id, date)
            .await
            .map_err(SalonError::Database)
    }

    async fn create_booking(&self, new_booking: NewBooking, now: DateTime<Utc>) -> SalonResult<Booking> {
        let mut tx = self.pool.begin().await.map_err(sql_error)?;

        let candidates: Vec<SlotCandidate> = time_slot::lock_slot_candidates(&mut *tx, &new_booking.slot_ids)
            .await
            .map_err(SalonError::Database)?
            .into_iter()
            .map(SlotCandidate::from)
            .collect();
        check_reservable(&new_booking.slot_ids, &candidates, new_booking.stylist_id, now)?;

        let flipped = time_slot::mark_slots_booked(&mut *tx, &new_booking.slot_ids)
            .await
            .map_err(SalonError::Database)?;
        if flipped != new_booking.slot_ids.len() as u64 {
            return Err(SalonError::Conflict(
                "Some time slots are no longer available; refresh availability and try again".to_string(),
            ));
        }

        let row = booking::insert_booking(&mut *tx, &new_booking)
            .await
            .map_err(SalonError::Database)?;
        booking::insert_booking_slots(&mut *tx, row.id, &new_booking.slot_ids)
            .await
            .map_err(SalonError::Database)?;
        booking::insert_booking_services(&mut *tx, row.id, &new_booking.service_ids)
            .await
            .map_err(SalonError::Database)?;

        tx.commit().await.map_err(sql_error)?;

        tracing::debug!("Booking created: id={}, slots={}", row.id, new_booking.slot_ids.len());
        row.into_booking(new_booking.slot_ids, new_booking.service_ids)
            .map_err(SalonError::Database)
    }

    async fn get_booking(&self, id: Uuid) -> SalonResult<Option<Booking>> {
        let Some(row) = booking::get_booking_by_id(&self.pool, id)
            .await
            .map_err(SalonError::Database)?
        else {
            return Ok(None);
        };
        let slot_ids = booking::get_booking_slot_ids(&self.pool, id)
            .await
            .map_err(SalonError::Database)?;
        let service_ids = booking::get_booking_service_ids(&self.pool, id)
            .await
            .map_err(SalonError::Database)?;
        row.into_booking(slot_ids, service_ids)
            .map(Some)
            .map_err(SalonError::Database)
    }

    async fn booking_slots(&self, booking_id: Uuid) -> SalonResult<Vec<TimeSlot>> {
        let rows = time_slot::get_time_slots_for_booking(&self.pool, booking_id)
            .await
            .map_err(SalonError::Database)?;
        Ok(rows.into_iter().map(TimeSlot::from).collect())
    }

    async fn transition_booking(
        &self,
        booking_id: Uuid,
        target: BookingStatus,
        loyalty: LoyaltyPolicy,
    ) -> SalonResult<TransitionOutcome> {
        let mut tx = self.pool.begin().await.map_err(sql_error)?;

        let updated = booking::update_booking_status_if(&mut *tx, booking_id, target.allowed_sources(), target)
            .await
            .map_err(SalonError::Database)?;
        let Some(row) = updated else {
            let current = booking::get_booking_by_id(&mut *tx, booking_id)
                .await
                .map_err(SalonError::Database)?
                .ok_or_else(|| SalonError::NotFound(format!("Booking with ID {} not found", booking_id)))?;
            let status = current.status().map_err(SalonError::Database)?;
            status.check_transition(target)?;
            return Err(SalonError::InvalidState(format!(
                "Booking {} changed while moving to {}",
                booking_id, target
            )));
        };

        let effects = TransitionEffects::for_target(target, row.total_price);

        if effects.release_slots {
            let released = time_slot::release_slots_for_booking(&mut *tx, booking_id)
                .await
                .map_err(SalonError::Database)?;
            tracing::debug!("Released {} slots of booking {}", released, booking_id);
        }

        let mut suspended = false;
        let customer_row = if effects.touches_counters() {
            let mut updated = customer::apply_counter_deltas(
                &mut *tx,
                row.customer_id,
                effects.cancelled_delta,
                effects.completed_delta,
                effects.spending_delta,
            )
            .await
            .map_err(SalonError::Database)?
            .ok_or_else(|| SalonError::NotFound(format!("Customer with ID {} not found", row.customer_id)))?;

            if loyalty.should_suspend(updated.total_cancelled, updated.total_completed) {
                suspended = customer::deactivate_user(&mut *tx, updated.user_id)
                    .await
                    .map_err(SalonError::Database)?;
                updated.is_active = false;
            }
            updated
        } else {
            customer::get_customer_by_id(&mut *tx, row.customer_id)
                .await
                .map_err(SalonError::Database)?
                .ok_or_else(|| SalonError::NotFound(format!("Customer with ID {} not found", row.customer_id)))?
        };

        let slot_ids = booking::get_booking_slot_ids(&mut *tx, booking_id)
            .await
            .map_err(SalonError::Database)?;
        let service_ids = booking::get_booking_service_ids(&mut *tx, booking_id)
            .await
            .map_err(SalonError::Database)?;

        tx.commit().await.map_err(sql_error)?;

        let booking = row
            .into_booking(slot_ids, service_ids)
            .map_err(SalonError::Database)?;
        Ok(TransitionOutcome {
            booking,
            customer: customer_row.into(),
            suspended,
        })
    }
}
