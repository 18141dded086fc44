use crate::models::DbBooking;
use chrono::Utc;
use eyre::Result;
use sqlx::PgExecutor;
use uuid::Uuid;

use salonbook_core::models::booking::{BookingStatus, NewBooking};

pub async fn insert_booking<'e>(executor: impl PgExecutor<'e>, booking: &NewBooking) -> Result<DbBooking> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let row = sqlx::query_as::<_, DbBooking>(
        r#"
        INSERT INTO bookings (id, customer_id, stylist_id, salon_id, total_price, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
        RETURNING id, customer_id, stylist_id, salon_id, total_price, status, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(booking.customer_id)
    .bind(booking.stylist_id)
    .bind(booking.salon_id)
    .bind(booking.total_price)
    .bind(BookingStatus::Pending.as_str())
    .bind(now)
    .fetch_one(executor)
    .await?;

    Ok(row)
}

pub async fn insert_booking_slots<'e>(
    executor: impl PgExecutor<'e>,
    booking_id: Uuid,
    slot_ids: &[Uuid],
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO booking_slots (booking_id, time_slot_id)
        SELECT $1, slot_id FROM UNNEST($2::uuid[]) AS slot_id
        "#,
    )
    .bind(booking_id)
    .bind(slot_ids)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn insert_booking_services<'e>(
    executor: impl PgExecutor<'e>,
    booking_id: Uuid,
    service_ids: &[Uuid],
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO booking_services (booking_id, service_id)
        SELECT $1, service_id FROM UNNEST($2::uuid[]) AS service_id
        "#,
    )
    .bind(booking_id)
    .bind(service_ids)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn get_booking_by_id<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<Option<DbBooking>> {
    let row = sqlx::query_as::<_, DbBooking>(
        r#"
        SELECT id, customer_id, stylist_id, salon_id, total_price, status, created_at, updated_at
        FROM bookings
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

pub async fn get_booking_slot_ids<'e>(executor: impl PgExecutor<'e>, booking_id: Uuid) -> Result<Vec<Uuid>> {
    let ids = sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT bs.time_slot_id
        FROM booking_slots bs
        JOIN time_slots ts ON ts.id = bs.time_slot_id
        WHERE bs.booking_id = $1
        ORDER BY ts.start_time ASC
        "#,
    )
    .bind(booking_id)
    .fetch_all(executor)
    .await?;

    Ok(ids)
}

pub async fn get_booking_service_ids<'e>(executor: impl PgExecutor<'e>, booking_id: Uuid) -> Result<Vec<Uuid>> {
    let ids = sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT service_id
        FROM booking_services
        WHERE booking_id = $1
        "#,
    )
    .bind(booking_id)
    .fetch_all(executor)
    .await?;

    Ok(ids)
}

/// Compare-and-set on the status column.
///
/// Returns `None` when the booking does not exist or is not in any of `from`.
pub async fn update_booking_status_if<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    from: &[BookingStatus],
    to: BookingStatus,
) -> Result<Option<DbBooking>> {
    let from: Vec<String> = from.iter().map(|s| s.to_string()).collect();

    let row = sqlx::query_as::<_, DbBooking>(
        r#"
        UPDATE bookings
        SET status = $3, updated_at = NOW()
        WHERE id = $1 AND status = ANY($2)
        RETURNING id, customer_id, stylist_id, salon_id, total_price, status, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(from)
    .bind(to.as_str())
    .fetch_optional(executor)
    .await?;

    Ok(row)
}
