use migration::{Migrator, MigratorTrait};
use polkadothub_indexer::config::AppConfig;
use polkadothub_indexer::infrastructure::persistence::DbPool;
use polkadothub_indexer::utils::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logger();

    let config = AppConfig::from_env();
    let db_pool = DbPool::new(&config).await?;

    logging::log_info("Running database migrations...");
    Migrator::up(db_pool.get_connection(), None).await?;
    logging::log_info("Migrations completed successfully!");

    Ok(())
}
