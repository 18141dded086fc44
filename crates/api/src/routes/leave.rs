use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/leaves",
            get(handlers::leave::list_leaves).post(handlers::leave::create_leave),
        )
        .route("/api/leaves/:id/cancel", post(handlers::leave::cancel_leave))
        .route("/api/leaves/:id/resolve", put(handlers::leave::resolve_leave))
}
