pub mod init;
pub mod user;

use crate::config::AppConfig;
use crate::database::Database;

/// Connects with the same environment-driven settings as the server.
pub(crate) async fn connect() -> anyhow::Result<(AppConfig, Database)> {
    let config = AppConfig::from_env();
    let db = Database::connect(&config).await?;
    Ok((config, db))
}
