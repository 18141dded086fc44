use crate::models::DbCustomer;
use eyre::Result;
use sqlx::PgExecutor;
use uuid::Uuid;

pub async fn get_customer_by_id<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<Option<DbCustomer>> {
    let row = sqlx::query_as::<_, DbCustomer>(
        r#"
        SELECT c.id, c.user_id, c.total_completed, c.total_cancelled, c.total_spending, u.is_active
        FROM customers c
        JOIN users u ON u.id = c.user_id
        WHERE c.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

pub async fn get_customer_by_user_id<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
) -> Result<Option<DbCustomer>> {
    let row = sqlx::query_as::<_, DbCustomer>(
        r#"
        SELECT c.id, c.user_id, c.total_completed, c.total_cancelled, c.total_spending, u.is_active
        FROM customers c
        JOIN users u ON u.id = c.user_id
        WHERE c.user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

/// Adds the given deltas to the loyalty counters and returns the new values.
pub async fn apply_counter_deltas<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    cancelled_delta: i32,
    completed_delta: i32,
    spending_delta: i64,
) -> Result<Option<DbCustomer>> {
    let row = sqlx::query_as::<_, DbCustomer>(
        r#"
        UPDATE customers c
        SET total_cancelled = c.total_cancelled + $2,
            total_completed = c.total_completed + $3,
            total_spending = c.total_spending + $4
        FROM users u
        WHERE c.id = $1 AND u.id = c.user_id
        RETURNING c.id, c.user_id, c.total_completed, c.total_cancelled, c.total_spending, u.is_active
        "#,
    )
    .bind(id)
    .bind(cancelled_delta)
    .bind(completed_delta)
    .bind(spending_delta)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

/// Deactivates a user account; returns whether it was active before.
pub async fn deactivate_user<'e>(executor: impl PgExecutor<'e>, user_id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET is_active = FALSE
        WHERE id = $1 AND is_active = TRUE
        "#,
    )
    .bind(user_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}
