use std::sync::Arc;
use tower_sessions_sqlx_store::SqliteStore;

use crate::auth::session_store;
use crate::config::AppConfig;
use crate::database::{initialize, Database, SchemaError, SchemaReport, SeedAdmin};

/// Shared by every request handler
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub sessions: SqliteStore,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        Self {
            sessions: session_store(db.pool()),
            db,
            config: Arc::new(config),
        }
    }
}

/// Opens the database and applies the schema. Any failure here must stop the
/// process before it serves requests.
pub async fn bootstrap(config: AppConfig) -> Result<(AppState, SchemaReport), SchemaError> {
    let db = Database::connect(&config).await?;
    let report = initialize(&db, &SeedAdmin::from(&config.security)).await?;
    Ok((AppState::new(db, config), report))
}
