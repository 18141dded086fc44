use async_trait::async_trait;
use salonbook_core::notify::{Notification, NotificationSink};

/// Sink that records notifications in the trace log.
///
/// Stands in for the notification service when none is wired up.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn notify(&self, notification: Notification) -> eyre::Result<()> {
        tracing::info!(
            target_user_id = %notification.target_user_id,
            "Notification: {} - {}",
            notification.title,
            notification.content
        );
        Ok(())
    }
}
