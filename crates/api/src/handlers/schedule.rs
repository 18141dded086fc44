use axum::{
    extract::{Path, Query, State},
    Json,
};
use salonbook_core::models::schedule::{ScheduleQuery, ScheduleResponse};
use std::sync::Arc;
use uuid::Uuid;

use crate::{middleware::error_handling::AppError, ApiState};

/// Availability of one stylist over a date range.
///
/// Day-off schedules are returned with every slot marked not bookable.
#[axum::debug_handler]
pub async fn list_stylist_schedules(
    State(state): State<Arc<ApiState>>,
    Path(stylist_id): Path<Uuid>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<Vec<ScheduleResponse>>, AppError> {
    let schedules = state
        .schedules
        .list_for_stylist(stylist_id, query.from, query.to)
        .await?;

    Ok(Json(schedules))
}
