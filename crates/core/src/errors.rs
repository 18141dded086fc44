use thiserror::Error;

#[derive(Error, Debug)]
pub enum SalonError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl SalonError {
    /// Whether the caller may retry the whole operation unchanged.
    ///
    /// Business-rule failures are final; only storage failures, which roll
    /// back completely, are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SalonError::Database(_))
    }
}

pub type SalonResult<T> = Result<T, SalonError>;
