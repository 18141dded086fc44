//! Read-only views of the salon directory the scheduling core consults.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stylist {
    pub id: Uuid,
    pub user_id: Uuid,
    pub salon_id: Uuid,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalonService {
    pub id: Uuid,
    pub salon_id: Uuid,
    pub price: i64,
}
