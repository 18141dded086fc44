//! Admin triggers for the daily jobs.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use salonbook_core::errors::SalonError;
use salonbook_core::models::actor::{Actor, Role};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    jobs::{DailyJob, JobReport},
    middleware::{auth::Identity, error_handling::AppError},
    ApiState,
};

#[derive(Debug, Deserialize)]
pub struct RunJobQuery {
    /// Date to treat as "today"; defaults to the current salon-local date.
    /// The retention sweep only accepts dates up to the current one.
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RunJobResponse {
    pub job: String,
    pub today: NaiveDate,
    pub report: JobReport,
}

#[axum::debug_handler]
pub async fn run_horizon(
    State(state): State<Arc<ApiState>>,
    Identity(actor): Identity,
    Query(query): Query<RunJobQuery>,
) -> Result<Json<RunJobResponse>, AppError> {
    run_now(&state, &actor, state.horizon.as_ref(), query, true).await
}

#[axum::debug_handler]
pub async fn run_retention(
    State(state): State<Arc<ApiState>>,
    Identity(actor): Identity,
    Query(query): Query<RunJobQuery>,
) -> Result<Json<RunJobResponse>, AppError> {
    run_now(&state, &actor, state.retention.as_ref(), query, false).await
}

async fn run_now(
    state: &ApiState,
    actor: &Actor,
    job: &dyn DailyJob,
    query: RunJobQuery,
    allow_future: bool,
) -> Result<Json<RunJobResponse>, AppError> {
    if actor.role != Role::Admin {
        return Err(SalonError::Forbidden("Only admins can run jobs".to_string()).into());
    }

    let current = state.config.today(state.clock.now());
    let today = query.date.unwrap_or(current);
    if !allow_future && today > current {
        return Err(SalonError::Validation(format!(
            "Job {} cannot run for {}, which is after today ({})",
            job.name(),
            today,
            current
        ))
        .into());
    }
    tracing::info!("Job {} triggered by user {} for {}", job.name(), actor.user_id, today);
    let report = job.run(today).await?;

    Ok(Json(RunJobResponse {
        job: job.name().to_string(),
        today,
        report,
    }))
}
