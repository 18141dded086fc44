use crate::models::{DbSlotCandidate, DbTimeSlot};
use chrono::{DateTime, Utc};
use eyre::Result;
use sqlx::PgExecutor;
use uuid::Uuid;

use salonbook_core::models::schedule::NewTimeSlot;

pub async fn insert_time_slots<'e>(
    executor: impl PgExecutor<'e>,
    schedule_id: Uuid,
    slots: &[NewTimeSlot],
) -> Result<u64> {
    let starts: Vec<DateTime<Utc>> = slots.iter().map(|s| s.start_time).collect();
    let ends: Vec<DateTime<Utc>> = slots.iter().map(|s| s.end_time).collect();

    let result = sqlx::query(
        r#"
        INSERT INTO time_slots (schedule_id, start_time, end_time, is_booked)
        SELECT $1, slot.start_time, slot.end_time, FALSE
        FROM UNNEST($2::timestamptz[], $3::timestamptz[]) AS slot(start_time, end_time)
        "#,
    )
    .bind(schedule_id)
    .bind(starts)
    .bind(ends)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

pub async fn get_time_slots_by_schedule_ids<'e>(
    executor: impl PgExecutor<'e>,
    schedule_ids: &[Uuid],
) -> Result<Vec<DbTimeSlot>> {
    let time_slots = sqlx::query_as::<_, DbTimeSlot>(
        r#"
        SELECT id, schedule_id, start_time, end_time, is_booked
        FROM time_slots
        WHERE schedule_id = ANY($1)
        ORDER BY start_time ASC
        "#,
    )
    .bind(schedule_ids)
    .fetch_all(executor)
    .await?;

    Ok(time_slots)
}

pub async fn get_time_slots_for_booking<'e>(
    executor: impl PgExecutor<'e>,
    booking_id: Uuid,
) -> Result<Vec<DbTimeSlot>> {
    let time_slots = sqlx::query_as::<_, DbTimeSlot>(
        r#"
        SELECT ts.id, ts.schedule_id, ts.start_time, ts.end_time, ts.is_booked
        FROM time_slots ts
        JOIN booking_slots bs ON bs.time_slot_id = ts.id
        WHERE bs.booking_id = $1
        ORDER BY ts.start_time ASC
        "#,
    )
    .bind(booking_id)
    .fetch_all(executor)
    .await?;

    Ok(time_slots)
}

/// Reads the requested slots and row-locks them until the transaction ends.
///
/// Locks are taken in id order so overlapping reservations queue instead of
/// deadlocking.
pub async fn lock_slot_candidates<'e>(
    executor: impl PgExecutor<'e>,
    slot_ids: &[Uuid],
) -> Result<Vec<DbSlotCandidate>> {
    let rows = sqlx::query_as::<_, DbSlotCandidate>(
        r#"
        SELECT ts.id, ws.stylist_id, ts.start_time, ts.is_booked, ws.is_day_off
        FROM time_slots ts
        JOIN work_schedules ws ON ws.id = ts.schedule_id
        WHERE ts.id = ANY($1)
        ORDER BY ts.id
        FOR UPDATE OF ts
        "#,
    )
    .bind(slot_ids)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

/// Marks free slots as booked and returns how many flipped.
pub async fn mark_slots_booked<'e>(executor: impl PgExecutor<'e>, slot_ids: &[Uuid]) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE time_slots
        SET is_booked = TRUE
        WHERE id = ANY($1) AND is_booked = FALSE
        "#,
    )
    .bind(slot_ids)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

pub async fn release_slots_for_booking<'e>(executor: impl PgExecutor<'e>, booking_id: Uuid) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE time_slots
        SET is_booked = FALSE
        WHERE id IN (SELECT time_slot_id FROM booking_slots WHERE booking_id = $1)
        "#,
    )
    .bind(booking_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

pub async fn delete_time_slots_by_schedule_id<'e>(
    executor: impl PgExecutor<'e>,
    schedule_id: Uuid,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM time_slots
        WHERE schedule_id = $1
        "#,
    )
    .bind(schedule_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}
