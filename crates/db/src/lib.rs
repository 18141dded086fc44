pub mod models;
pub mod repositories;
pub mod schema;
pub mod store;
pub mod postgres;

pub mod mock;

use eyre::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::sync::Arc;

pub use mock::MemoryStore;
pub use postgres::PgStore;
pub use store::SalonStore;

pub type DbPool = Pool<Postgres>;

pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Opens the store named by `database_url`.
///
/// `memory:` URLs get a fresh [`MemoryStore`]; anything else is treated as a
/// Postgres connection string and the schema is created if missing.
pub async fn open_store(database_url: &str) -> Result<Arc<dyn SalonStore>> {
    if database_url.starts_with("memory:") {
        tracing::warn!("Using in-memory store; data is lost on shutdown");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let pool = create_pool(database_url).await?;
    schema::initialize_database(&pool).await?;
    Ok(Arc::new(PgStore::new(pool)))
}
