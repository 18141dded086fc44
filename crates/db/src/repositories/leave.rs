use crate::models::DbLeaveRequest;
use chrono::{NaiveDate, Utc};
use eyre::Result;
use sqlx::PgExecutor;
use uuid::Uuid;

use salonbook_core::models::leave::{LeaveStatus, NewLeaveRequest};

/// Inserts a `PENDING` request.
///
/// Returns `None` when the partial unique index on open requests rejected it,
/// i.e. the stylist already has a pending or approved request for that day.
pub async fn insert_leave_request<'e>(
    executor: impl PgExecutor<'e>,
    request: &NewLeaveRequest,
) -> Result<Option<DbLeaveRequest>> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let row = sqlx::query_as::<_, DbLeaveRequest>(
        r#"
        INSERT INTO leave_requests (id, stylist_id, salon_id, date, reason, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
        ON CONFLICT DO NOTHING
        RETURNING id, stylist_id, salon_id, date, reason, status, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(request.stylist_id)
    .bind(request.salon_id)
    .bind(request.date)
    .bind(request.reason.as_deref())
    .bind(LeaveStatus::Pending.as_str())
    .bind(now)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

pub async fn get_leave_request_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> Result<Option<DbLeaveRequest>> {
    let row = sqlx::query_as::<_, DbLeaveRequest>(
        r#"
        SELECT id, stylist_id, salon_id, date, reason, status, created_at, updated_at
        FROM leave_requests
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

/// Lists requests, optionally narrowed to one stylist and/or one salon.
pub async fn list_leave_requests<'e>(
    executor: impl PgExecutor<'e>,
    stylist_id: Option<Uuid>,
    salon_id: Option<Uuid>,
) -> Result<Vec<DbLeaveRequest>> {
    let rows = sqlx::query_as::<_, DbLeaveRequest>(
        r#"
        SELECT id, stylist_id, salon_id, date, reason, status, created_at, updated_at
        FROM leave_requests
        WHERE ($1::uuid IS NULL OR stylist_id = $1)
          AND ($2::uuid IS NULL OR salon_id = $2)
        ORDER BY date DESC, created_at DESC
        "#,
    )
    .bind(stylist_id)
    .bind(salon_id)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

/// Moves a request from `from` to `to` only if it is still in `from`.
pub async fn update_leave_status<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    from: LeaveStatus,
    to: LeaveStatus,
) -> Result<Option<DbLeaveRequest>> {
    let row = sqlx::query_as::<_, DbLeaveRequest>(
        r#"
        UPDATE leave_requests
        SET status = $3, updated_at = NOW()
        WHERE id = $1 AND status = $2
        RETURNING id, stylist_id, salon_id, date, reason, status, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(from.as_str())
    .bind(to.as_str())
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

pub async fn has_approved_leave<'e>(
    executor: impl PgExecutor<'e>,
    stylist_id: Uuid,
    date: NaiveDate,
) -> Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM leave_requests
            WHERE stylist_id = $1 AND date = $2 AND status = $3
        )
        "#,
    )
    .bind(stylist_id)
    .bind(date)
    .bind(LeaveStatus::Approved.as_str())
    .fetch_one(executor)
    .await?;

    Ok(exists)
}
