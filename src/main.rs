use color_eyre::eyre::Result;
use dotenv::dotenv;
use salonbook_api::config::ApiConfig;
use salonbook_db::open_store;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = ApiConfig::from_env()?;

    // Open the store; creates the schema on Postgres
    let store = open_store(&config.database_url).await?;

    // Start API server and daily jobs
    salonbook_api::start_server(config, store).await?;

    Ok(())
}
