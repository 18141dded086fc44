use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use salonbook_core::models::leave::{CreateLeaveRequest, LeaveRequest, ResolveLeaveRequest};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    middleware::{auth::Identity, error_handling::AppError},
    ApiState,
};

#[axum::debug_handler]
pub async fn create_leave(
    State(state): State<Arc<ApiState>>,
    Identity(actor): Identity,
    Json(payload): Json<CreateLeaveRequest>,
) -> Result<(StatusCode, Json<LeaveRequest>), AppError> {
    let leave = state.leaves.create(&actor, payload).await?;

    Ok((StatusCode::CREATED, Json(leave)))
}

#[axum::debug_handler]
pub async fn list_leaves(
    State(state): State<Arc<ApiState>>,
    Identity(actor): Identity,
) -> Result<Json<Vec<LeaveRequest>>, AppError> {
    let leaves = state.leaves.list(&actor).await?;

    Ok(Json(leaves))
}

#[axum::debug_handler]
pub async fn cancel_leave(
    State(state): State<Arc<ApiState>>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<LeaveRequest>, AppError> {
    let leave = state.leaves.cancel(&actor, id).await?;

    Ok(Json(leave))
}

#[axum::debug_handler]
pub async fn resolve_leave(
    State(state): State<Arc<ApiState>>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
    Json(payload): Json<ResolveLeaveRequest>,
) -> Result<Json<LeaveRequest>, AppError> {
    let leave = state.leaves.resolve(&actor, id, payload.status).await?;

    Ok(Json(leave))
}
