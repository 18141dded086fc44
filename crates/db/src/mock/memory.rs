//! In-process [`SalonStore`] used by tests and by `DATABASE_URL=memory://`.
//!
//! Every trait method holds one lock over the whole state for its full
//! duration, which gives it the same all-or-nothing behaviour the Postgres
//! store gets from a transaction.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;
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

use crate::store::SalonStore;

#[derive(Debug, Default)]
struct State {
    /// user id -> account active flag
    users: HashMap<Uuid, bool>,
    customers: HashMap<Uuid, Customer>,
    stylists: HashMap<Uuid, Stylist>,
    /// manager user id -> salon id
    managers: HashMap<Uuid, Uuid>,
    services: HashMap<Uuid, SalonService>,
    schedules: HashMap<Uuid, WorkSchedule>,
    slots: HashMap<Uuid, TimeSlot>,
    leaves: HashMap<Uuid, LeaveRequest>,
    bookings: HashMap<Uuid, Booking>,
}

impl State {
    fn user_active(&self, user_id: Uuid) -> bool {
        self.users.get(&user_id).copied().unwrap_or(false)
    }

    fn customer_view(&self, customer: &Customer) -> Customer {
        Customer {
            is_active: self.user_active(customer.user_id),
            ..customer.clone()
        }
    }

    fn slots_sorted(&self, mut slots: Vec<TimeSlot>) -> Vec<TimeSlot> {
        slots.sort_by_key(|slot| (slot.start_time, slot.id));
        slots
    }

    fn booking_view(&self, booking: &Booking) -> Booking {
        let slots: Vec<TimeSlot> = booking
            .slot_ids
            .iter()
            .filter_map(|id| self.slots.get(id).cloned())
            .collect();
        Booking {
            slot_ids: self.slots_sorted(slots).into_iter().map(|s| s.id).collect(),
            ..booking.clone()
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an active stylist account in `salon_id`.
    pub async fn add_stylist(&self, salon_id: Uuid) -> Stylist {
        let mut state = self.state.lock().await;
        let stylist = Stylist {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            salon_id,
            is_active: true,
        };
        state.users.insert(stylist.user_id, true);
        state.stylists.insert(stylist.id, stylist.clone());
        stylist
    }

    /// Registers an active customer account with zeroed counters.
    pub async fn add_customer(&self) -> Customer {
        let mut state = self.state.lock().await;
        let customer = Customer {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            total_completed: 0,
            total_cancelled: 0,
            total_spending: 0,
            is_active: true,
        };
        state.users.insert(customer.user_id, true);
        state.customers.insert(customer.id, customer.clone());
        customer
    }

    /// Overwrites a customer's counters, keeping identity and account state.
    pub async fn set_customer_counters(&self, customer_id: Uuid, total_cancelled: i32, total_completed: i32) {
        let mut state = self.state.lock().await;
        if let Some(customer) = state.customers.get_mut(&customer_id) {
            customer.total_cancelled = total_cancelled;
            customer.total_completed = total_completed;
        }
    }

    /// Registers a manager account and returns its user id.
    pub async fn add_manager(&self, salon_id: Uuid) -> Uuid {
        let mut state = self.state.lock().await;
        let user_id = Uuid::new_v4();
        state.users.insert(user_id, true);
        state.managers.insert(user_id, salon_id);
        user_id
    }

    pub async fn add_service(&self, salon_id: Uuid, price: i64) -> SalonService {
        let mut state = self.state.lock().await;
        let service = SalonService {
            id: Uuid::new_v4(),
            salon_id,
            price,
        };
        state.services.insert(service.id, service.clone());
        service
    }

    pub async fn set_user_active(&self, user_id: Uuid, active: bool) {
        let mut state = self.state.lock().await;
        state.users.insert(user_id, active);
    }

    /// Number of slot rows currently stored.
    pub async fn slot_count(&self) -> usize {
        self.state.lock().await.slots.len()
    }

    pub async fn get_slot(&self, id: Uuid) -> Option<TimeSlot> {
        self.state.lock().await.slots.get(&id).cloned()
    }
}

#[async_trait]
impl SalonStore for MemoryStore {
    async fn list_active_stylists(&self) -> SalonResult<Vec<Stylist>> {
        let state = self.state.lock().await;
        let mut stylists: Vec<Stylist> = state
            .stylists
            .values()
            .filter(|s| s.is_active && state.user_active(s.user_id))
            .cloned()
            .collect();
        stylists.sort_by_key(|s| s.id);
        Ok(stylists)
    }

    async fn get_stylist(&self, id: Uuid) -> SalonResult<Option<Stylist>> {
        Ok(self.state.lock().await.stylists.get(&id).cloned())
    }

    async fn find_stylist_by_user(&self, user_id: Uuid) -> SalonResult<Option<Stylist>> {
        let state = self.state.lock().await;
        Ok(state.stylists.values().find(|s| s.user_id == user_id).cloned())
    }

    async fn find_manager_salon(&self, user_id: Uuid) -> SalonResult<Option<Uuid>> {
        Ok(self.state.lock().await.managers.get(&user_id).copied())
    }

    async fn find_customer_by_user(&self, user_id: Uuid) -> SalonResult<Option<Customer>> {
        let state = self.state.lock().await;
        Ok(state
            .customers
            .values()
            .find(|c| c.user_id == user_id)
            .map(|c| state.customer_view(c)))
    }

    async fn get_customer(&self, id: Uuid) -> SalonResult<Option<Customer>> {
        let state = self.state.lock().await;
        Ok(state.customers.get(&id).map(|c| state.customer_view(c)))
    }

    async fn get_services(&self, ids: &[Uuid]) -> SalonResult<Vec<SalonService>> {
        let state = self.state.lock().await;
        let unique: HashSet<&Uuid> = ids.iter().collect();
        let mut services: Vec<SalonService> = unique
            .into_iter()
            .filter_map(|id| state.services.get(id).cloned())
            .collect();
        services.sort_by_key(|s| s.id);
        Ok(services)
    }

    async fn find_schedule(&self, stylist_id: Uuid, date: NaiveDate) -> SalonResult<Option<WorkSchedule>> {
        let state = self.state.lock().await;
        Ok(state
            .schedules
            .values()
            .find(|s| s.stylist_id == stylist_id && s.working_date == date)
            .cloned())
    }

    async fn create_schedule(
        &self,
        new_schedule: NewWorkSchedule,
        slots: Vec<NewTimeSlot>,
    ) -> SalonResult<Option<WorkSchedule>> {
        let mut state = self.state.lock().await;

        let exists = state
            .schedules
            .values()
            .any(|s| s.stylist_id == new_schedule.stylist_id && s.working_date == new_schedule.working_date);
        if exists {
            return Ok(None);
        }

        let schedule = WorkSchedule {
            id: Uuid::new_v4(),
            stylist_id: new_schedule.stylist_id,
            working_date: new_schedule.working_date,
            morning_start: new_schedule.morning_start,
            morning_end: new_schedule.morning_end,
            afternoon_start: new_schedule.afternoon_start,
            afternoon_end: new_schedule.afternoon_end,
            is_day_off: new_schedule.is_day_off,
            created_at: Utc::now(),
        };

        for slot in slots {
            let row = TimeSlot {
                id: Uuid::new_v4(),
                schedule_id: schedule.id,
                start_time: slot.start_time,
                end_time: slot.end_time,
                is_booked: false,
            };
            state.slots.insert(row.id, row);
        }
        state.schedules.insert(schedule.id, schedule.clone());

        Ok(Some(schedule))
    }

    async fn list_schedules(
        &self,
        stylist_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> SalonResult<Vec<ScheduleWithSlots>> {
        let state = self.state.lock().await;

        let mut schedules: Vec<&WorkSchedule> = state
            .schedules
            .values()
            .filter(|s| s.stylist_id == stylist_id && s.working_date >= from && s.working_date <= to)
            .collect();
        schedules.sort_by_key(|s| s.working_date);

        Ok(schedules
            .into_iter()
            .map(|schedule| {
                let slots = state
                    .slots
                    .values()
                    .filter(|slot| slot.schedule_id == schedule.id)
                    .cloned()
                    .collect();
                ScheduleWithSlots {
                    schedule: schedule.clone(),
                    slots: state.slots_sorted(slots),
                }
            })
            .collect())
    }

    async fn stale_schedule_ids(&self, cutoff: NaiveDate) -> SalonResult<Vec<Uuid>> {
        let state = self.state.lock().await;
        let with_slots: HashSet<Uuid> = state.slots.values().map(|slot| slot.schedule_id).collect();
        let held: HashSet<Uuid> = state
            .bookings
            .values()
            .filter(|b| !b.status.is_terminal())
            .flat_map(|b| b.slot_ids.iter())
            .filter_map(|slot_id| state.slots.get(slot_id))
            .map(|slot| slot.schedule_id)
            .collect();

        let mut stale: Vec<&WorkSchedule> = state
            .schedules
            .values()
            .filter(|s| s.working_date < cutoff && with_slots.contains(&s.id) && !held.contains(&s.id))
            .collect();
        stale.sort_by_key(|s| s.working_date);
        Ok(stale.into_iter().map(|s| s.id).collect())
    }

    async fn delete_schedule_slots(&self, schedule_id: Uuid) -> SalonResult<u64> {
        let mut state = self.state.lock().await;

        let doomed: HashSet<Uuid> = state
            .slots
            .values()
            .filter(|slot| slot.schedule_id == schedule_id)
            .map(|slot| slot.id)
            .collect();
        state.slots.retain(|id, _| !doomed.contains(id));
        for booking in state.bookings.values_mut() {
            booking.slot_ids.retain(|id| !doomed.contains(id));
        }

        Ok(doomed.len() as u64)
    }

    async fn insert_leave_request(&self, request: NewLeaveRequest) -> SalonResult<LeaveRequest> {
        let mut state = self.state.lock().await;

        let open = state.leaves.values().any(|existing| {
            existing.stylist_id == request.stylist_id
                && existing.date == request.date
                && existing.status.blocks_new_request()
        });
        if open {
            return Err(SalonError::Conflict(format!(
                "A pending or approved leave request already exists for {}",
                request.date
            )));
        }

        let now = Utc::now();
        let leave = LeaveRequest {
            id: Uuid::new_v4(),
            stylist_id: request.stylist_id,
            salon_id: request.salon_id,
            date: request.date,
            reason: request.reason,
            status: LeaveStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        state.leaves.insert(leave.id, leave.clone());
        Ok(leave)
    }

    async fn get_leave_request(&self, id: Uuid) -> SalonResult<Option<LeaveRequest>> {
        Ok(self.state.lock().await.leaves.get(&id).cloned())
    }

    async fn list_leave_requests(&self, scope: LeaveScope) -> SalonResult<Vec<LeaveRequest>> {
        let state = self.state.lock().await;
        let mut leaves: Vec<LeaveRequest> = state.leaves.values().filter(|l| scope.covers(l)).cloned().collect();
        leaves.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(leaves)
    }

    async fn update_leave_status(
        &self,
        id: Uuid,
        from: LeaveStatus,
        to: LeaveStatus,
    ) -> SalonResult<Option<LeaveRequest>> {
        let mut state = self.state.lock().await;
        match state.leaves.get_mut(&id) {
            Some(leave) if leave.status == from => {
                leave.status = to;
                leave.updated_at = Utc::now();
                Ok(Some(leave.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn has_approved_leave(&self, stylist_id: Uuid, date: NaiveDate) -> SalonResult<bool> {
        let state = self.state.lock().await;
        Ok(state
            .leaves
            .values()
            .any(|l| l.stylist_id == stylist_id && l.date == date && l.status == LeaveStatus::Approved))
    }

    async fn create_booking(&self, new_booking: NewBooking, now: DateTime<Utc>) -> SalonResult<Booking> {
        let mut state = self.state.lock().await;

        let candidates: Vec<SlotCandidate> = new_booking
            .slot_ids
            .iter()
            .filter_map(|id| state.slots.get(id))
            .filter_map(|slot| {
                state.schedules.get(&slot.schedule_id).map(|schedule| SlotCandidate {
                    slot_id: slot.id,
                    stylist_id: schedule.stylist_id,
                    start_time: slot.start_time,
                    is_booked: slot.is_booked,
                    is_day_off: schedule.is_day_off,
                })
            })
            .collect();
        check_reservable(&new_booking.slot_ids, &candidates, new_booking.stylist_id, now)?;

        let unique: HashSet<&Uuid> = new_booking.slot_ids.iter().collect();
        if unique.len() != new_booking.slot_ids.len() {
            return Err(SalonError::Conflict(
                "Some time slots are no longer available; refresh availability and try again".to_string(),
            ));
        }

        for id in &new_booking.slot_ids {
            if let Some(slot) = state.slots.get_mut(id) {
                slot.is_booked = true;
            }
        }

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            customer_id: new_booking.customer_id,
            stylist_id: new_booking.stylist_id,
            salon_id: new_booking.salon_id,
            total_price: new_booking.total_price,
            status: BookingStatus::Pending,
            slot_ids: new_booking.slot_ids,
            service_ids: new_booking.service_ids,
            created_at: now,
            updated_at: now,
        };
        state.bookings.insert(booking.id, booking.clone());

        Ok(booking)
    }

    async fn get_booking(&self, id: Uuid) -> SalonResult<Option<Booking>> {
        let state = self.state.lock().await;
        Ok(state.bookings.get(&id).map(|b| state.booking_view(b)))
    }

    async fn booking_slots(&self, booking_id: Uuid) -> SalonResult<Vec<TimeSlot>> {
        let state = self.state.lock().await;
        let slots = state
            .bookings
            .get(&booking_id)
            .map(|b| b.slot_ids.iter().filter_map(|id| state.slots.get(id).cloned()).collect())
            .unwrap_or_default();
        Ok(state.slots_sorted(slots))
    }

    async fn transition_booking(
        &self,
        booking_id: Uuid,
        target: BookingStatus,
        loyalty: LoyaltyPolicy,
    ) -> SalonResult<TransitionOutcome> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let booking = state
            .bookings
            .get(&booking_id)
            .cloned()
            .ok_or_else(|| SalonError::NotFound(format!("Booking with ID {} not found", booking_id)))?;
        booking.status.check_transition(target)?;

        let customer = state
            .customers
            .get(&booking.customer_id)
            .cloned()
            .ok_or_else(|| SalonError::NotFound(format!("Customer with ID {} not found", booking.customer_id)))?;

        let effects = TransitionEffects::for_target(target, booking.total_price);

        if effects.release_slots {
            for id in &booking.slot_ids {
                if let Some(slot) = state.slots.get_mut(id) {
                    slot.is_booked = false;
                }
            }
        }

        let mut suspended = false;
        if effects.touches_counters() {
            let updated = Customer {
                total_cancelled: customer.total_cancelled + effects.cancelled_delta,
                total_completed: customer.total_completed + effects.completed_delta,
                total_spending: customer.total_spending + effects.spending_delta,
                ..customer
            };
            if loyalty.should_suspend(updated.total_cancelled, updated.total_completed) {
                suspended = state.user_active(updated.user_id);
                state.users.insert(updated.user_id, false);
            }
            state.customers.insert(updated.id, updated);
        }

        let stored = state
            .bookings
            .get_mut(&booking_id)
            .ok_or_else(|| SalonError::NotFound(format!("Booking with ID {} not found", booking_id)))?;
        stored.status = target;
        stored.updated_at = Utc::now();
        let stored = stored.clone();

        let customer = state
            .customers
            .get(&booking.customer_id)
            .map(|c| state.customer_view(c))
            .ok_or_else(|| SalonError::NotFound(format!("Customer with ID {} not found", booking.customer_id)))?;

        Ok(TransitionOutcome {
            booking: state.booking_view(&stored),
            customer,
            suspended,
        })
    }
}
