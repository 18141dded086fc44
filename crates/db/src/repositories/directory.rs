//! Read-only lookups against the salon directory tables.

use crate::models::{DbSalonService, DbStylist};
use eyre::Result;
use sqlx::PgExecutor;
use uuid::Uuid;

pub async fn list_active_stylists<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<DbStylist>> {
    let rows = sqlx::query_as::<_, DbStylist>(
        r#"
        SELECT s.id, s.user_id, s.salon_id, s.is_active
        FROM stylists s
        JOIN users u ON u.id = s.user_id
        WHERE s.is_active = TRUE AND u.is_active = TRUE
        ORDER BY s.id
        "#,
    )
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

pub async fn get_stylist_by_id<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<Option<DbStylist>> {
    let row = sqlx::query_as::<_, DbStylist>(
        r#"
        SELECT id, user_id, salon_id, is_active
        FROM stylists
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

pub async fn get_stylist_by_user_id<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
) -> Result<Option<DbStylist>> {
    let row = sqlx::query_as::<_, DbStylist>(
        r#"
        SELECT id, user_id, salon_id, is_active
        FROM stylists
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

pub async fn get_manager_salon_id<'e>(executor: impl PgExecutor<'e>, user_id: Uuid) -> Result<Option<Uuid>> {
    let salon_id = sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT salon_id
        FROM managers
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await?;

    Ok(salon_id)
}

pub async fn get_services_by_ids<'e>(
    executor: impl PgExecutor<'e>,
    ids: &[Uuid],
) -> Result<Vec<DbSalonService>> {
    let rows = sqlx::query_as::<_, DbSalonService>(
        r#"
        SELECT id, salon_id, price
        FROM salon_services
        WHERE id = ANY($1)
        "#,
    )
    .bind(ids)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}
