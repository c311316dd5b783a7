use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::{initialize, SeedAdmin};

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let (config, db) = super::connect().await?;
    let report = initialize(&db, &SeedAdmin::from(&config.security)).await?;
    db.close().await;

    let message = match &report.seeded_admin {
        Some(email) => format!("Schema ready; created administrator {}", email),
        None => "Schema ready; existing users kept".to_string(),
    };
    output_success(
        output_format,
        &message,
        Some(json!({
            "database": config.database.url,
            "tables": report.tables,
            "seeded_admin": report.seeded_admin,
        })),
    )
}
