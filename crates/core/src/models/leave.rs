use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::{SalonError, SalonResult};

/// Day-off request status.
///
/// `PENDING` moves to exactly one of the other three, all of which are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Canceled,
}

impl LeaveStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, LeaveStatus::Pending)
    }

    /// Whether a request in this status prevents a new one for the same day.
    pub fn blocks_new_request(self) -> bool {
        matches!(self, LeaveStatus::Pending | LeaveStatus::Approved)
    }

    pub fn check_transition(self, to: LeaveStatus) -> SalonResult<()> {
        match (self, to) {
            (LeaveStatus::Pending, LeaveStatus::Approved | LeaveStatus::Rejected | LeaveStatus::Canceled) => Ok(()),
            (from, to) => Err(SalonError::InvalidState(format!(
                "Leave request cannot move from {} to {}",
                from, to
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LeaveStatus::Pending => "PENDING",
            LeaveStatus::Approved => "APPROVED",
            LeaveStatus::Rejected => "REJECTED",
            LeaveStatus::Canceled => "CANCELED",
        }
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeaveStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(LeaveStatus::Pending),
            "APPROVED" => Ok(LeaveStatus::Approved),
            "REJECTED" => Ok(LeaveStatus::Rejected),
            "CANCELED" => Ok(LeaveStatus::Canceled),
            _ => Err(format!("Invalid leave status: {}", s)),
        }
    }
}

/// The two outcomes a manager or admin may choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveDecision {
    Approved,
    Rejected,
}

impl From<LeaveDecision> for LeaveStatus {
    fn from(decision: LeaveDecision) -> Self {
        match decision {
            LeaveDecision::Approved => LeaveStatus::Approved,
            LeaveDecision::Rejected => LeaveStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: Uuid,
    pub stylist_id: Uuid,
    pub salon_id: Uuid,
    pub date: NaiveDate,
    pub reason: Option<String>,
    pub status: LeaveStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLeaveRequest {
    pub date: NaiveDate,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveLeaveRequest {
    pub status: LeaveDecision,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLeaveRequest {
    pub stylist_id: Uuid,
    pub salon_id: Uuid,
    pub date: NaiveDate,
    pub reason: Option<String>,
}

/// Which leave requests a viewer may see or act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveScope {
    Own(Uuid),
    Salon(Uuid),
    All,
}

impl LeaveScope {
    pub fn covers(&self, request: &LeaveRequest) -> bool {
        match self {
            LeaveScope::Own(stylist_id) => request.stylist_id == *stylist_id,
            LeaveScope::Salon(salon_id) => request.salon_id == *salon_id,
            LeaveScope::All => true,
        }
    }
}
