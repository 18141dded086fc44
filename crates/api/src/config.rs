//! # API Configuration Module
//!
//! This module loads the server and scheduling configuration from environment
//! variables, providing defaults where appropriate.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: The host address to bind the server to (default: "0.0.0.0")
//! - `API_PORT`: The port to listen on (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string, or `memory://` (required)
//! - `LOG_LEVEL`: Logging level (default: "info")
//! - `API_CORS_ORIGINS`: Comma-separated list of allowed CORS origins
//! - `API_REQUEST_TIMEOUT_SECONDS`: Per-request timeout (default: 30)
//! - `SALON_TIMEZONE`: IANA zone for shift times and "today" (default: "UTC")
//! - `SHIFT_MORNING` / `SHIFT_AFTERNOON`: `HH:MM-HH:MM` (default: "08:00-11:30" / "13:30-20:00")
//! - `SLOT_DURATION_MINUTES`: Slot length (default: 15)
//! - `SCHEDULE_HORIZON_DAYS`: How far ahead schedules are generated (default: 6)
//! - `SLOT_RETENTION_DAYS`: How long slots are kept (default: 60)
//! - `EARLY_CANCEL_HOURS`: Notice needed for an early cancellation (default: 3)
//! - `SUSPENSION_GAP`: `cancelled - completed` value that suspends a customer (default: -10)
//! - `MATERIALIZE_DAY_OFF_SLOTS`: Whether day-off schedules get slot rows (default: true)
//! - `HORIZON_RUN_AT` / `RETENTION_RUN_AT`: Daily trigger times `HH:MM` (default: "00:05" / "00:30")

use chrono::NaiveTime;
use chrono_tz::Tz;
use eyre::{eyre, Result, WrapErr};
use salonbook_core::config::SchedulingConfig;
use salonbook_core::shift::ShiftDefinition;
use std::env;
use std::str::FromStr;
use tracing::Level;

/// Configuration for the salonbook API server
///
/// # Example
///
/// ```no_run
/// use eyre::Result;
/// use salonbook_api::config::ApiConfig;
///
/// fn example() -> Result<()> {
///     let config = ApiConfig::from_env()?;
///     println!("Starting server on {}:{}", config.host, config.port);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// PostgreSQL connection string, or a `memory:` URL for the in-process store
    pub database_url: String,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Shift, horizon, retention and loyalty settings
    pub scheduling: SchedulingConfig,
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The DATABASE_URL environment variable is not set
    /// - The API_PORT value cannot be parsed as a u16
    /// - Any scheduling variable is set to a value that cannot be parsed
    pub fn from_env() -> Result<Self> {
        // Network settings
        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        // Database settings
        let database_url = env::var("DATABASE_URL")
            .wrap_err("DATABASE_URL environment variable must be set")?;

        // Logging settings
        let log_level = match env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()).as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        // CORS settings
        let cors_origins = env::var("API_CORS_ORIGINS").ok().map(|origins| {
            origins.split(',').map(|s| s.trim().to_string()).collect()
        });

        // Performance settings
        let request_timeout = env::var("API_REQUEST_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        let scheduling = scheduling_from_env()?;

        Ok(Self {
            host,
            port,
            database_url,
            log_level,
            cors_origins,
            request_timeout,
            scheduling,
        })
    }

    /// Returns the server address as a string (e.g., "127.0.0.1:8080")
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Reads the scheduling options, keeping the default for every unset variable.
pub fn scheduling_from_env() -> Result<SchedulingConfig> {
    let mut config = SchedulingConfig::default();

    if let Some(zone) = optional_var("SALON_TIMEZONE") {
        config.timezone = zone
            .parse::<Tz>()
            .map_err(|e| eyre!(e))
            .wrap_err("Invalid SALON_TIMEZONE value")?;
    }
    if let Some(shift) = parse_var::<ShiftDefinition>("SHIFT_MORNING")? {
        config.calendar.morning = shift;
    }
    if let Some(shift) = parse_var::<ShiftDefinition>("SHIFT_AFTERNOON")? {
        config.calendar.afternoon = shift;
    }
    config
        .calendar
        .check_shifts()
        .map_err(|e| eyre!(e))
        .wrap_err("Invalid SHIFT_MORNING / SHIFT_AFTERNOON combination")?;
    if let Some(minutes) = parse_var::<u32>("SLOT_DURATION_MINUTES")? {
        if minutes == 0 {
            return Err(eyre!("SLOT_DURATION_MINUTES must be greater than zero"));
        }
        config.calendar.slot_minutes = minutes;
    }
    if let Some(days) = parse_var("SCHEDULE_HORIZON_DAYS")? {
        config.horizon_days = days;
    }
    if let Some(days) = parse_var("SLOT_RETENTION_DAYS")? {
        config.retention_days = days;
    }
    if let Some(hours) = parse_var("EARLY_CANCEL_HOURS")? {
        config.early_cancel_hours = hours;
    }
    if let Some(gap) = parse_var("SUSPENSION_GAP")? {
        config.suspension_gap = gap;
    }
    if let Some(flag) = parse_var("MATERIALIZE_DAY_OFF_SLOTS")? {
        config.materialize_day_off_slots = flag;
    }
    if let Some(at) = optional_var("HORIZON_RUN_AT") {
        config.horizon_run_at = parse_time_of_day("HORIZON_RUN_AT", &at)?;
    }
    if let Some(at) = optional_var("RETENTION_RUN_AT") {
        config.retention_run_at = parse_time_of_day("RETENTION_RUN_AT", &at)?;
    }

    Ok(config)
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    optional_var(name)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| eyre!("Invalid {} value {:?}: {}", name, raw, e))
        })
        .transpose()
}

fn parse_time_of_day(name: &str, raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M").wrap_err_with(|| format!("Invalid {} value {:?}", name, raw))
}
