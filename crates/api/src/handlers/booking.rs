use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use salonbook_core::models::booking::{Booking, CreateBookingRequest, UpdateBookingStatusRequest};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    middleware::{auth::Identity, error_handling::AppError},
    ApiState,
};

#[axum::debug_handler]
pub async fn create_booking(
    State(state): State<Arc<ApiState>>,
    Identity(actor): Identity,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let booking = state.bookings.create(&actor, payload).await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

#[axum::debug_handler]
pub async fn cancel_booking(
    State(state): State<Arc<ApiState>>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    let booking = state.bookings.cancel(&actor, id).await?;

    Ok(Json(booking))
}

#[axum::debug_handler]
pub async fn update_booking_status(
    State(state): State<Arc<ApiState>>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBookingStatusRequest>,
) -> Result<Json<Booking>, AppError> {
    let booking = state.bookings.update_status(&actor, id, payload.status).await?;

    Ok(Json(booking))
}
