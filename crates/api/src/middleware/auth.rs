//! # Identity extraction
//!
//! Authentication happens upstream. The gateway forwards the caller's
//! identity as two headers, which this module turns into an [`Actor`]:
//!
//! - `x-user-id`: the user's UUID
//! - `x-user-role`: one of `CUSTOMER`, `STYLIST`, `MANAGER`, `ADMIN`

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use salonbook_core::errors::SalonError;
use salonbook_core::models::actor::{Actor, Role};
use uuid::Uuid;

use crate::middleware::error_handling::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// The authenticated caller of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header(parts, USER_ID_HEADER)?
            .parse::<Uuid>()
            .map_err(|_| SalonError::Authentication(format!("{} is not a valid UUID", USER_ID_HEADER)))?;
        let role = header(parts, USER_ROLE_HEADER)?
            .parse::<Role>()
            .map_err(SalonError::Authentication)?;

        Ok(Identity(Actor::new(user_id, role)))
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, SalonError> {
    parts
        .headers
        .get(name)
        .ok_or_else(|| SalonError::Authentication(format!("Missing {} header", name)))?
        .to_str()
        .map_err(|_| SalonError::Authentication(format!("{} header is not valid text", name)))
}
