use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Identity and directory tables are owned by other services; only the
    // columns the scheduling core reads or writes are declared here.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            role VARCHAR(32) NOT NULL,
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS customers (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_id UUID NOT NULL UNIQUE REFERENCES users(id),
            total_completed INTEGER NOT NULL DEFAULT 0,
            total_cancelled INTEGER NOT NULL DEFAULT 0,
            total_spending BIGINT NOT NULL DEFAULT 0
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS stylists (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_id UUID NOT NULL UNIQUE REFERENCES users(id),
            salon_id UUID NOT NULL,
            is_active BOOLEAN NOT NULL DEFAULT TRUE
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS managers (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_id UUID NOT NULL UNIQUE REFERENCES users(id),
            salon_id UUID NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS salon_services (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            salon_id UUID NOT NULL,
            name VARCHAR(255) NOT NULL,
            price BIGINT NOT NULL CHECK (price >= 0)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // One schedule per stylist and day; concurrent horizon runs rely on it.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS work_schedules (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            stylist_id UUID NOT NULL REFERENCES stylists(id),
            working_date DATE NOT NULL,
            morning_start TIMESTAMP WITH TIME ZONE NOT NULL,
            morning_end TIMESTAMP WITH TIME ZONE NOT NULL,
            afternoon_start TIMESTAMP WITH TIME ZONE NOT NULL,
            afternoon_end TIMESTAMP WITH TIME ZONE NOT NULL,
            is_day_off BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT uq_work_schedules_stylist_date UNIQUE (stylist_id, working_date)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS time_slots (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            schedule_id UUID NOT NULL REFERENCES work_schedules(id) ON DELETE CASCADE,
            start_time TIMESTAMP WITH TIME ZONE NOT NULL,
            end_time TIMESTAMP WITH TIME ZONE NOT NULL,
            is_booked BOOLEAN NOT NULL DEFAULT FALSE,
            CONSTRAINT valid_time_range CHECK (end_time > start_time)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS leave_requests (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            stylist_id UUID NOT NULL REFERENCES stylists(id),
            salon_id UUID NOT NULL,
            date DATE NOT NULL,
            reason TEXT NULL,
            status VARCHAR(16) NOT NULL DEFAULT 'PENDING',
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bookings (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            customer_id UUID NOT NULL REFERENCES customers(id),
            stylist_id UUID NOT NULL REFERENCES stylists(id),
            salon_id UUID NOT NULL,
            total_price BIGINT NOT NULL,
            status VARCHAR(32) NOT NULL DEFAULT 'PENDING',
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS booking_slots (
            booking_id UUID NOT NULL REFERENCES bookings(id) ON DELETE CASCADE,
            time_slot_id UUID NOT NULL REFERENCES time_slots(id) ON DELETE CASCADE,
            PRIMARY KEY (booking_id, time_slot_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS booking_services (
            booking_id UUID NOT NULL REFERENCES bookings(id) ON DELETE CASCADE,
            service_id UUID NOT NULL REFERENCES salon_services(id),
            PRIMARY KEY (booking_id, service_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes, one statement per prepared query
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_time_slots_schedule_id ON time_slots(schedule_id)",
        "CREATE INDEX IF NOT EXISTS idx_time_slots_start_time ON time_slots(start_time)",
        "CREATE INDEX IF NOT EXISTS idx_work_schedules_working_date ON work_schedules(working_date)",
        "CREATE INDEX IF NOT EXISTS idx_leave_requests_salon_id ON leave_requests(salon_id)",
        "CREATE UNIQUE INDEX IF NOT EXISTS uq_leave_requests_open \
            ON leave_requests(stylist_id, date) WHERE status IN ('PENDING', 'APPROVED')",
        "CREATE INDEX IF NOT EXISTS idx_bookings_customer_id ON bookings(customer_id)",
        "CREATE INDEX IF NOT EXISTS idx_booking_slots_time_slot_id ON booking_slots(time_slot_id)",
    ];
    for statement in indexes {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
