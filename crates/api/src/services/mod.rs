//! Request-scoped operations of the scheduling core.
//!
//! Services resolve the caller's access scope, validate input and then hand a
//! single unit of work to the [`SalonStore`](salonbook_db::SalonStore).
//! Notifications go out after the store has committed.

pub mod booking;
pub mod leave;
pub mod schedule;

use salonbook_core::notify::{Notification, NotificationSink};
use uuid::Uuid;

/// Hands a notification to the sink; delivery failures are logged only.
pub(crate) async fn deliver(notifier: &dyn NotificationSink, target_user_id: Uuid, title: &str, content: String) {
    let notification = Notification {
        target_user_id,
        title: title.to_string(),
        content,
    };
    if let Err(e) = notifier.notify(notification).await {
        tracing::warn!("Failed to deliver notification to user {}: {:?}", target_user_id, e);
    }
}
