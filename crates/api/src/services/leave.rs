//! Leave Register: stylists' day-off requests.
//!
//! ```text
//! PENDING -> APPROVED | REJECTED   (manager of the salon, or admin)
//! PENDING -> CANCELED              (owning stylist)
//! ```
//!
//! An approved request makes the Horizon Advancer generate a day-off schedule
//! for that date.

use std::sync::Arc;
use uuid::Uuid;

use salonbook_core::clock::Clock;
use salonbook_core::config::SchedulingConfig;
use salonbook_core::errors::{SalonError, SalonResult};
use salonbook_core::models::{
    actor::{Actor, Role},
    directory::Stylist,
    leave::{CreateLeaveRequest, LeaveDecision, LeaveRequest, LeaveScope, LeaveStatus, NewLeaveRequest},
};
use salonbook_core::notify::NotificationSink;
use salonbook_db::SalonStore;

use super::deliver;

#[derive(Clone)]
pub struct LeaveService {
    store: Arc<dyn SalonStore>,
    notifier: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
    config: Arc<SchedulingConfig>,
}

impl LeaveService {
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

    /// Files a `PENDING` request for the calling stylist.
    pub async fn create(&self, actor: &Actor, request: CreateLeaveRequest) -> SalonResult<LeaveRequest> {
        let stylist = self.acting_stylist(actor).await?;

        let today = self.config.today(self.clock.now());
        if request.date < today {
            return Err(SalonError::InvalidState(format!(
                "Leave date {} is in the past",
                request.date
            )));
        }

        let leave = self
            .store
            .insert_leave_request(NewLeaveRequest {
                stylist_id: stylist.id,
                salon_id: stylist.salon_id,
                date: request.date,
                reason: request.reason.filter(|r| !r.trim().is_empty()),
            })
            .await?;

        tracing::info!("Leave request {} filed by stylist {} for {}", leave.id, stylist.id, leave.date);
        Ok(leave)
    }

    /// Withdraws one of the calling stylist's own pending requests.
    pub async fn cancel(&self, actor: &Actor, id: Uuid) -> SalonResult<LeaveRequest> {
        let stylist = self.acting_stylist(actor).await?;
        let leave = self.find(id).await?;

        if !LeaveScope::Own(stylist.id).covers(&leave) {
            return Err(SalonError::Forbidden(
                "Stylists may only cancel their own leave requests".to_string(),
            ));
        }

        let canceled = self.change_status(&leave, LeaveStatus::Canceled).await?;
        tracing::info!("Leave request {} canceled by stylist {}", id, stylist.id);
        Ok(canceled)
    }

    /// Requests visible to the caller, newest date first.
    pub async fn list(&self, actor: &Actor) -> SalonResult<Vec<LeaveRequest>> {
        let scope = self.view_scope(actor).await?;
        self.store.list_leave_requests(scope).await
    }

    /// Approves or rejects a pending request and tells the stylist.
    pub async fn resolve(&self, actor: &Actor, id: Uuid, decision: LeaveDecision) -> SalonResult<LeaveRequest> {
        let scope = self.approval_scope(actor).await?;
        let leave = self.find(id).await?;

        if !scope.covers(&leave) {
            return Err(SalonError::Forbidden(
                "Managers may only resolve requests of their own salon".to_string(),
            ));
        }

        let resolved = self.change_status(&leave, decision.into()).await?;
        tracing::info!("Leave request {} resolved as {} by user {}", id, resolved.status, actor.user_id);

        match self.store.get_stylist(resolved.stylist_id).await {
            Ok(Some(stylist)) => {
                let title = match decision {
                    LeaveDecision::Approved => "Leave request approved",
                    LeaveDecision::Rejected => "Leave request rejected",
                };
                let content = format!(
                    "Your leave request for {} was {}",
                    resolved.date,
                    resolved.status.as_str().to_lowercase()
                );
                deliver(self.notifier.as_ref(), stylist.user_id, title, content).await;
            }
            Ok(None) => tracing::warn!("Stylist {} vanished before notification", resolved.stylist_id),
            Err(e) => tracing::warn!("Could not look up stylist {} for notification: {}", resolved.stylist_id, e),
        }

        Ok(resolved)
    }

    async fn find(&self, id: Uuid) -> SalonResult<LeaveRequest> {
        self.store
            .get_leave_request(id)
            .await?
            .ok_or_else(|| SalonError::NotFound(format!("Leave request with ID {} not found", id)))
    }

    async fn change_status(&self, leave: &LeaveRequest, to: LeaveStatus) -> SalonResult<LeaveRequest> {
        leave.status.check_transition(to)?;
        match self.store.update_leave_status(leave.id, leave.status, to).await? {
            Some(updated) => Ok(updated),
            None => {
                // Lost a race; report what the request became.
                let current = self.find(leave.id).await?;
                current.status.check_transition(to)?;
                Err(SalonError::InvalidState(format!(
                    "Leave request {} changed concurrently",
                    leave.id
                )))
            }
        }
    }

    async fn acting_stylist(&self, actor: &Actor) -> SalonResult<Stylist> {
        match actor.role {
            Role::Stylist => self
                .store
                .find_stylist_by_user(actor.user_id)
                .await?
                .ok_or_else(|| SalonError::NotFound(format!("No stylist profile for user {}", actor.user_id))),
            role => Err(SalonError::Forbidden(format!(
                "Only stylists can manage their leave, not {}",
                role
            ))),
        }
    }

    async fn view_scope(&self, actor: &Actor) -> SalonResult<LeaveScope> {
        match actor.role {
            Role::Stylist => Ok(LeaveScope::Own(self.acting_stylist(actor).await?.id)),
            Role::Manager => Ok(LeaveScope::Salon(self.managed_salon(actor).await?)),
            Role::Admin => Ok(LeaveScope::All),
            Role::Customer => Err(SalonError::Forbidden(
                "Customers cannot view leave requests".to_string(),
            )),
        }
    }

    async fn approval_scope(&self, actor: &Actor) -> SalonResult<LeaveScope> {
        match actor.role {
            Role::Manager => Ok(LeaveScope::Salon(self.managed_salon(actor).await?)),
            Role::Admin => Ok(LeaveScope::All),
            role => Err(SalonError::Forbidden(format!(
                "Only managers and admins can resolve leave requests, not {}",
                role
            ))),
        }
    }

    async fn managed_salon(&self, actor: &Actor) -> SalonResult<Uuid> {
        self.store
            .find_manager_salon(actor.user_id)
            .await?
            .ok_or_else(|| SalonError::Forbidden(format!("User {} does not manage a salon", actor.user_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone, Utc};
    use mockall::mock;
    use salonbook_core::clock::ManualClock;
    use salonbook_core::notify::Notification;
    use salonbook_db::MemoryStore;

    mock! {
        pub Notifier {}

        #[async_trait]
        impl NotificationSink for Notifier {
            async fn notify(&self, notification: Notification) -> eyre::Result<()>;
        }
    }

    fn service(store: Arc<MemoryStore>, notifier: MockNotifier) -> LeaveService {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap());
        LeaveService::new(store, Arc::new(notifier), Arc::new(clock), Arc::new(SchedulingConfig::default()))
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[tokio::test]
    async fn approval_notifies_the_stylist() {
        let store = Arc::new(MemoryStore::new());
        let salon = Uuid::new_v4();
        let stylist = store.add_stylist(salon).await;
        let manager = store.add_manager(salon).await;

        let stylist_user = stylist.user_id;
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(move |n| n.target_user_id == stylist_user && n.title == "Leave request approved")
            .times(1)
            .returning(|_| Ok(()));

        let service = service(store, notifier);
        let leave = service
            .create(
                &Actor::new(stylist.user_id, Role::Stylist),
                CreateLeaveRequest {
                    date: day(20),
                    reason: None,
                },
            )
            .await
            .unwrap();

        let resolved = service
            .resolve(&Actor::new(manager, Role::Manager), leave.id, LeaveDecision::Approved)
            .await
            .unwrap();

        assert_eq!(resolved.status, LeaveStatus::Approved);
    }

    #[tokio::test]
    async fn failed_delivery_does_not_fail_resolution() {
        let store = Arc::new(MemoryStore::new());
        let salon = Uuid::new_v4();
        let stylist = store.add_stylist(salon).await;

        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .times(1)
            .returning(|_| Err(eyre::eyre!("transport down")));

        let service = service(store, notifier);
        let leave = service
            .create(
                &Actor::new(stylist.user_id, Role::Stylist),
                CreateLeaveRequest {
                    date: day(14),
                    reason: Some("dentist".to_string()),
                },
            )
            .await
            .unwrap();

        let resolved = service
            .resolve(&Actor::new(Uuid::new_v4(), Role::Admin), leave.id, LeaveDecision::Rejected)
            .await
            .unwrap();

        assert_eq!(resolved.status, LeaveStatus::Rejected);
    }

    #[tokio::test]
    async fn manager_of_another_salon_is_forbidden() {
        let store = Arc::new(MemoryStore::new());
        let stylist = store.add_stylist(Uuid::new_v4()).await;
        let outsider = store.add_manager(Uuid::new_v4()).await;

        let mut notifier = MockNotifier::new();
        notifier.expect_notify().never();

        let service = service(store, notifier);
        let leave = service
            .create(
                &Actor::new(stylist.user_id, Role::Stylist),
                CreateLeaveRequest {
                    date: day(21),
                    reason: None,
                },
            )
            .await
            .unwrap();

        let err = service
            .resolve(&Actor::new(outsider, Role::Manager), leave.id, LeaveDecision::Approved)
            .await
            .unwrap_err();

        assert!(matches!(err, SalonError::Forbidden(_)));
    }

    #[tokio::test]
    async fn past_dates_are_rejected() {
        let store = Arc::new(MemoryStore::new());
        let stylist = store.add_stylist(Uuid::new_v4()).await;
        let service = service(store, MockNotifier::new());

        let err = service
            .create(
                &Actor::new(stylist.user_id, Role::Stylist),
                CreateLeaveRequest {
                    date: day(13),
                    reason: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, SalonError::InvalidState(_)));
    }
}
