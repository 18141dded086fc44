//! # salonbook API
//!
//! The API crate provides the web server for the salon scheduling core: stylist
//! availability, bookings, leave requests and the two daily jobs.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Extract requests and shape responses
//! - **Services**: Role checks, validation and notifications around store calls
//! - **Jobs**: Horizon Advancer, Retention Sweeper and their daily scheduler
//! - **Middleware**: Identity extraction and error mapping
//! - **Config**: Environment and scheduling configuration
//!
//! Persistence goes through the [`SalonStore`] trait, so the same server runs
//! against PostgreSQL or the in-process store.

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Daily jobs and their scheduler
pub mod jobs;
/// Middleware for identity and error handling
pub mod middleware;
/// Default notification sink
pub mod notify;
/// Route definitions and API endpoint structure
pub mod routes;
/// Business operations behind the handlers
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use eyre::Result;
use salonbook_core::clock::{Clock, SystemClock};
use salonbook_core::config::SchedulingConfig;
use salonbook_core::notify::NotificationSink;
use salonbook_db::SalonStore;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

use jobs::{horizon::HorizonAdvancer, retention::RetentionSweeper, scheduler};
use services::{booking::BookingService, leave::LeaveService, schedule::ScheduleService};

/// Shared application state that is accessible to all request handlers
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use salonbook_api::{notify::LogNotifier, ApiState};
/// use salonbook_core::clock::SystemClock;
/// use salonbook_core::config::SchedulingConfig;
/// use salonbook_db::MemoryStore;
///
/// let state = ApiState::new(
///     Arc::new(MemoryStore::new()),
///     Arc::new(LogNotifier),
///     Arc::new(SystemClock),
///     SchedulingConfig::default(),
/// );
/// let app = salonbook_api::build_router(Arc::new(state));
/// ```
pub struct ApiState {
    pub store: Arc<dyn SalonStore>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<SchedulingConfig>,
    pub schedules: ScheduleService,
    pub leaves: LeaveService,
    pub bookings: BookingService,
    pub horizon: Arc<HorizonAdvancer>,
    pub retention: Arc<RetentionSweeper>,
}

impl ApiState {
    pub fn new(
        store: Arc<dyn SalonStore>,
        notifier: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
        config: SchedulingConfig,
    ) -> Self {
        let config = Arc::new(config);
        Self {
            schedules: ScheduleService::new(store.clone()),
            leaves: LeaveService::new(store.clone(), notifier.clone(), clock.clone(), config.clone()),
            bookings: BookingService::new(store.clone(), notifier, clock.clone(), config.clone()),
            horizon: Arc::new(HorizonAdvancer::new(store.clone(), config.clone())),
            retention: Arc::new(RetentionSweeper::new(store.clone(), config.clone())),
            store,
            clock,
            config,
        }
    }
}

/// Builds the application router with every route attached to `state`.
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Stylist availability
        .merge(routes::schedule::routes())
        // Booking lifecycle
        .merge(routes::booking::routes())
        // Leave register
        .merge(routes::leave::routes())
        // Admin job triggers
        .merge(routes::jobs::routes())
        .with_state(state)
}

/// Starts the API server and the daily jobs
///
/// Before listening, the horizon is backfilled from today through today plus
/// the horizon, so a fresh deployment has a full bookable week.
///
/// # Example
///
/// ```no_run
/// # async fn run() -> eyre::Result<()> {
/// let config = salonbook_api::config::ApiConfig::from_env()?;
/// let store = salonbook_db::open_store(&config.database_url).await?;
/// salonbook_api::start_server(config, store).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_server(config: config::ApiConfig, store: Arc<dyn SalonStore>) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let state = Arc::new(ApiState::new(
        store,
        Arc::new(notify::LogNotifier),
        clock.clone(),
        config.scheduling.clone(),
    ));

    // Bring the rolling week up to date before taking traffic
    let today = state.config.today(clock.now());
    match state.horizon.backfill(today, state.config.horizon_date(today)).await {
        Ok(report) => info!("Schedule backfill complete: {}", report),
        Err(e) => warn!("Schedule backfill failed, the daily run will retry: {}", e),
    }

    scheduler::spawn_daily(state.horizon.clone(), clock.clone(), state.config.clone());
    scheduler::spawn_daily(state.retention.clone(), clock.clone(), state.config.clone());

    let app = build_router(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let allowed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin {:?}", origin);
                    None
                }
            })
            .collect();
        let cors = CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([
                header::CONTENT_TYPE,
                header::AUTHORIZATION,
                header::ACCEPT,
                header::HeaderName::from_static(middleware::auth::USER_ID_HEADER),
                header::HeaderName::from_static(middleware::auth::USER_ROLE_HEADER),
            ])
            .allow_origin(allowed)
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Request tracing and timeout
    let app = app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout))),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
