use crate::models::DbWorkSchedule;
use chrono::NaiveDate;
use eyre::Result;
use sqlx::PgExecutor;
use uuid::Uuid;

use salonbook_core::models::schedule::NewWorkSchedule;

/// Inserts a schedule unless one already exists for the stylist and date.
///
/// Returns `None` when the `(stylist_id, working_date)` uniqueness constraint
/// suppressed the insert.
pub async fn insert_schedule<'e>(
    executor: impl PgExecutor<'e>,
    schedule: &NewWorkSchedule,
) -> Result<Option<DbWorkSchedule>> {
    let id = Uuid::new_v4();

    tracing::debug!(
        "Creating schedule: id={}, stylist_id={}, date={}, day_off={}",
        id, schedule.stylist_id, schedule.working_date, schedule.is_day_off
    );

    let row = sqlx::query_as::<_, DbWorkSchedule>(
        r#"
        INSERT INTO work_schedules (
            id, stylist_id, working_date,
            morning_start, morning_end, afternoon_start, afternoon_end,
            is_day_off
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (stylist_id, working_date) DO NOTHING
        RETURNING id, stylist_id, working_date, morning_start, morning_end,
                  afternoon_start, afternoon_end, is_day_off, created_at
        "#,
    )
    .bind(id)
    .bind(schedule.stylist_id)
    .bind(schedule.working_date)
    .bind(schedule.morning_start)
    .bind(schedule.morning_end)
    .bind(schedule.afternoon_start)
    .bind(schedule.afternoon_end)
    .bind(schedule.is_day_off)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

pub async fn get_schedule_by_stylist_and_date<'e>(
    executor: impl PgExecutor<'e>,
    stylist_id: Uuid,
    working_date: NaiveDate,
) -> Result<Option<DbWorkSchedule>> {
    let row = sqlx::query_as::<_, DbWorkSchedule>(
        r#"
        SELECT id, stylist_id, working_date, morning_start, morning_end,
               afternoon_start, afternoon_end, is_day_off, created_at
        FROM work_schedules
        WHERE stylist_id = $1 AND working_date = $2
        "#,
    )
    .bind(stylist_id)
    .bind(working_date)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

pub async fn list_schedules_in_range<'e>(
    executor: impl PgExecutor<'e>,
    stylist_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<DbWorkSchedule>> {
    let rows = sqlx::query_as::<_, DbWorkSchedule>(
        r#"
        SELECT id, stylist_id, working_date, morning_start, morning_end,
               afternoon_start, afternoon_end, is_day_off, created_at
        FROM work_schedules
        WHERE stylist_id = $1 AND working_date BETWEEN $2 AND $3
        ORDER BY working_date ASC
        "#,
    )
    .bind(stylist_id)
    .bind(from)
    .bind(to)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

/// Schedules dated before `cutoff` that still own slot rows.
pub async fn list_stale_schedule_ids<'e>(
    executor: impl PgExecutor<'e>,
    cutoff: NaiveDate,
) -> Result<Vec<Uuid>> {
    let ids = sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT ws.id
        FROM work_schedules ws
        WHERE ws.working_date < $1
          AND EXISTS (SELECT 1 FROM time_slots ts WHERE ts.schedule_id = ws.id)
          AND NOT EXISTS (
              SELECT 1
              FROM time_slots ts
              JOIN booking_slots bs ON bs.time_slot_id = ts.id
              JOIN bookings b ON b.id = bs.booking_id
              WHERE ts.schedule_id = ws.id
                AND b.status IN ('PENDING', 'CONFIRMED')
          )
        ORDER BY ws.working_date ASC
        "#,
    )
    .bind(cutoff)
    .fetch_all(executor)
    .await?;

    Ok(ids)
}
