use axum::{routing::post, Router};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/admin/jobs/horizon/run", post(handlers::jobs::run_horizon))
        .route("/api/admin/jobs/retention/run", post(handlers::jobs::run_retention))
}
