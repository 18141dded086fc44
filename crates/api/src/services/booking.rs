//! Booking Lifecycle entry points.
//!
//! Customers create and cancel their own bookings; staff move bookings
//! through confirmation and completion. The store applies every transition
//! together with its slot and loyalty side effects.

use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use salonbook_core::clock::Clock;
use salonbook_core::config::SchedulingConfig;
use salonbook_core::errors::{SalonError, SalonResult};
use salonbook_core::models::{
    actor::{Actor, Role},
    booking::{Booking, BookingScope, BookingStatus, CreateBookingRequest, NewBooking, TransitionOutcome},
    customer::Customer,
};
use salonbook_core::notify::NotificationSink;
use salonbook_db::SalonStore;

use super::deliver;

/// Targets staff may set directly. Customer cancellations go through
/// [`BookingService::cancel`], which picks the variant itself.
pub const STAFF_TARGETS: [BookingStatus; 3] = [
    BookingStatus::Confirmed,
    BookingStatus::Completed,
    BookingStatus::CancelledDayoff,
];

#[derive(Clone)]
pub struct BookingService {
    store: Arc<dyn SalonStore>,
    notifier: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
    config: Arc<SchedulingConfig>,
}

impl BookingService {
    pub fn new(
        store: Arc<dyn SalonStore>,
        notifier: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
        config: Arc<SchedulingConfig>,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            config,
        }
    }

    /// Reserves the requested slots for the calling customer.
    pub async fn create(&self, actor: &Actor, request: CreateBookingRequest) -> SalonResult<Booking> {
        let customer = self.acting_customer(actor).await?;

        if request.slot_ids.is_empty() {
            return Err(SalonError::Validation("At least one time slot is required".to_string()));
        }
        if request.service_ids.is_empty() {
            return Err(SalonError::Validation("At least one service is required".to_string()));
        }
        if has_duplicates(&request.slot_ids) {
            return Err(SalonError::Validation("Time slots must not repeat".to_string()));
        }
        if has_duplicates(&request.service_ids) {
            return Err(SalonError::Validation("Services must not repeat".to_string()));
        }

        let stylist = self
            .store
            .get_stylist(request.stylist_id)
            .await?
            .ok_or_else(|| SalonError::NotFound(format!("Stylist with ID {} not found", request.stylist_id)))?;
        if stylist.salon_id != request.salon_id {
            return Err(SalonError::Validation(format!(
                "Stylist {} does not work at salon {}",
                stylist.id, request.salon_id
            )));
        }
        if !stylist.is_active {
            return Err(SalonError::Validation(format!(
                "Stylist {} is not accepting bookings",
                stylist.id
            )));
        }

        let services = self.store.get_services(&request.service_ids).await?;
        for id in &request.service_ids {
            let service = services
                .iter()
                .find(|s| s.id == *id)
                .ok_or_else(|| SalonError::NotFound(format!("Service with ID {} not found", id)))?;
            if service.salon_id != request.salon_id {
                return Err(SalonError::Validation(format!(
                    "Service {} is not offered by salon {}",
                    id, request.salon_id
                )));
            }
        }
        let total_price: i64 = services.iter().map(|s| s.price).sum();

        let booking = self
            .store
            .create_booking(
                NewBooking {
                    customer_id: customer.id,
                    stylist_id: stylist.id,
                    salon_id: stylist.salon_id,
                    total_price,
                    slot_ids: request.slot_ids,
                    service_ids: request.service_ids,
                },
                self.clock.now(),
            )
            .await?;

        tracing::info!(
            "Booking {} created for customer {} with {} slots",
            booking.id,
            customer.id,
            booking.slot_ids.len()
        );
        deliver(
            self.notifier.as_ref(),
            stylist.user_id,
            "New booking",
            format!("Booking {} is waiting for confirmation", booking.id),
        )
        .await;

        Ok(booking)
    }

    /// Cancels one of the calling customer's bookings.
    ///
    /// Cancelling at least the configured number of hours before the first
    /// reserved slot is an early cancellation and does not count against the
    /// customer.
    pub async fn cancel(&self, actor: &Actor, booking_id: Uuid) -> SalonResult<Booking> {
        let customer = self.acting_customer(actor).await?;
        let booking = self.find(booking_id).await?;

        if !BookingScope::Customer(customer.id).covers(&booking) {
            return Err(SalonError::Forbidden(
                "Customers may only cancel their own bookings".to_string(),
            ));
        }
        booking.status.check_transition(BookingStatus::Cancelled)?;

        let slots = self.store.booking_slots(booking_id).await?;
        let now = self.clock.now();
        let target = match slots.iter().map(|s| s.start_time).min() {
            Some(first_start) => self.config.cancellation_policy().classify(first_start, now),
            None => BookingStatus::Cancelled,
        };

        let outcome = self.transition(booking_id, target).await?;
        Ok(outcome.booking)
    }

    /// Staff-initiated status change.
    pub async fn update_status(
        &self,
        actor: &Actor,
        booking_id: Uuid,
        target: BookingStatus,
    ) -> SalonResult<Booking> {
        if !STAFF_TARGETS.contains(&target) {
            return Err(SalonError::Validation(format!(
                "Status {} cannot be set directly",
                target
            )));
        }

        let scope = self.staff_scope(actor).await?;
        let booking = self.find(booking_id).await?;
        if !scope.covers(&booking) {
            return Err(SalonError::Forbidden(format!(
                "Booking {} is outside your scope",
                booking_id
            )));
        }

        let outcome = self.transition(booking_id, target).await?;
        Ok(outcome.booking)
    }

    async fn transition(&self, booking_id: Uuid, target: BookingStatus) -> SalonResult<TransitionOutcome> {
        let outcome = self
            .store
            .transition_booking(booking_id, target, self.config.loyalty_policy())
            .await?;

        tracing::info!("Booking {} moved to {}", booking_id, target);
        let user_id = outcome.customer.user_id;
        deliver(
            self.notifier.as_ref(),
            user_id,
            "Booking updated",
            format!("Your booking {} is now {}", booking_id, target),
        )
        .await;

        if outcome.suspended {
            tracing::info!("Customer {} suspended after booking {}", outcome.customer.id, booking_id);
            deliver(
                self.notifier.as_ref(),
                user_id,
                "Account suspended",
                "Your account has been deactivated".to_string(),
            )
            .await;
        }

        Ok(outcome)
    }

    async fn find(&self, booking_id: Uuid) -> SalonResult<Booking> {
        self.store
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| SalonError::NotFound(format!("Booking with ID {} not found", booking_id)))
    }

    async fn acting_customer(&self, actor: &Actor) -> SalonResult<Customer> {
        match actor.role {
            Role::Customer => {
                let customer = self
                    .store
                    .find_customer_by_user(actor.user_id)
                    .await?
                    .ok_or_else(|| SalonError::NotFound(format!("No customer profile for user {}", actor.user_id)))?;
                if !customer.is_active {
                    return Err(SalonError::Forbidden("Customer account is suspended".to_string()));
                }
                Ok(customer)
            }
            role => Err(SalonError::Forbidden(format!(
                "Only customers can book or cancel, not {}",
                role
            ))),
        }
    }

    async fn staff_scope(&self, actor: &Actor) -> SalonResult<BookingScope> {
        match actor.role {
            Role::Stylist => {
                let stylist = self
                    .store
                    .find_stylist_by_user(actor.user_id)
                    .await?
                    .ok_or_else(|| SalonError::NotFound(format!("No stylist profile for user {}", actor.user_id)))?;
                Ok(BookingScope::Stylist(stylist.id))
            }
            Role::Manager => {
                let salon_id = self
                    .store
                    .find_manager_salon(actor.user_id)
                    .await?
                    .ok_or_else(|| SalonError::Forbidden(format!("User {} does not manage a salon", actor.user_id)))?;
                Ok(BookingScope::Salon(salon_id))
            }
            Role::Admin => Ok(BookingScope::All),
            Role::Customer => Err(SalonError::Forbidden(
                "Customers cannot change booking status".to_string(),
            )),
        }
    }
}

fn has_duplicates(ids: &[Uuid]) -> bool {
    let unique: HashSet<&Uuid> = ids.iter().collect();
    unique.len() != ids.len()
}
