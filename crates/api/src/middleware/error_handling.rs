//! # Error Handling Middleware
//!
//! Maps [`SalonError`] to HTTP status codes and JSON error bodies so every
//! endpoint reports failures the same way.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use salonbook_core::errors::SalonError;
use serde_json::json;

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::Json;
/// use salonbook_api::middleware::error_handling::AppError;
/// use salonbook_core::errors::SalonError;
/// use uuid::Uuid;
///
/// async fn handler(id: Uuid) -> Result<Json<()>, AppError> {
///     Err(AppError(SalonError::NotFound(format!("Booking with ID {} not found", id))))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub SalonError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            SalonError::NotFound(_) => StatusCode::NOT_FOUND,
            SalonError::Conflict(_) => StatusCode::CONFLICT,
            SalonError::InvalidState(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SalonError::Forbidden(_) => StatusCode::FORBIDDEN,
            SalonError::Validation(_) => StatusCode::BAD_REQUEST,
            SalonError::Authentication(_) => StatusCode::UNAUTHORIZED,
            SalonError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SalonError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {:?}", self.0);
        }

        let message = self.0.to_string();
        let body = Json(json!({ "error": message }));

        (status, body).into_response()
    }
}

/// Allows `?` on `SalonResult` inside handlers.
impl From<SalonError> for AppError {
    fn from(err: SalonError) -> Self {
        AppError(err)
    }
}

/// Maps a SalonError to an HTTP response
pub fn map_error(err: SalonError) -> Response {
    AppError(err).into_response()
}
