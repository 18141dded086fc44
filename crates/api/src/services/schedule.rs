use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use salonbook_core::errors::{SalonError, SalonResult};
use salonbook_core::models::schedule::ScheduleResponse;
use salonbook_db::SalonStore;

/// Longest date range a single availability query may span
pub const MAX_QUERY_DAYS: i64 = 62;

/// Availability reads for the presentation layer.
#[derive(Clone)]
pub struct ScheduleService {
    store: Arc<dyn SalonStore>,
}

impl ScheduleService {
    pub fn new(store: Arc<dyn SalonStore>) -> Self {
        Self { store }
    }

    /// Schedules of `stylist_id` dated within `[from, to]`, with their slots.
    pub async fn list_for_stylist(
        &self,
        stylist_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> SalonResult<Vec<ScheduleResponse>> {
        if from > to {
            return Err(SalonError::Validation(format!(
                "Range start {} is after range end {}",
                from, to
            )));
        }
        if (to - from).num_days() > MAX_QUERY_DAYS {
            return Err(SalonError::Validation(format!(
                "Range may span at most {} days",
                MAX_QUERY_DAYS
            )));
        }

        self.store
            .get_stylist(stylist_id)
            .await?
            .ok_or_else(|| SalonError::NotFound(format!("Stylist with ID {} not found", stylist_id)))?;

        let schedules = self.store.list_schedules(stylist_id, from, to).await?;
        Ok(schedules.into_iter().map(ScheduleResponse::from).collect())
    }
}
