//! Outbound notification contract.
//!
//! Storage and delivery belong to the notification service; the scheduling
//! core only hands over `(target user, title, content)` triples.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub target_user_id: Uuid,
    pub title: String,
    pub content: String,
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: Notification) -> eyre::Result<()>;
}
