use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Loyalty counters of a customer and the state of the underlying account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_completed: i32,
    pub total_cancelled: i32,
    pub total_spending: i64,
    pub is_active: bool,
}
