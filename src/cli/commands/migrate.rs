use crate::config::AppConfig;
use crate::database::DatabaseManager;

pub async fn handle(config: AppConfig) -> anyhow::Result<()> {
    let manager = DatabaseManager::connect(&config.database).await?;
    manager.migrate().await?;
    manager.close().await;
    Ok(())
}
