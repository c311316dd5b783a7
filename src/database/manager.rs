use sqlx::error::ErrorKind;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::AppConfig;
use crate::filter::FilterError;

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl From<FilterError> for DatabaseError {
    fn from(err: FilterError) -> Self {
        DatabaseError::QueryError(err.to_string())
    }
}

impl DatabaseError {
    /// Classifies a failed write: storage-level constraint failures become
    /// `Constraint`, everything else stays a driver error.
    pub fn from_write(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => {
                    return DatabaseError::Constraint(db_err.message().to_string());
                }
                _ => {}
            }
        }
        DatabaseError::Sqlx(err)
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DatabaseError::Constraint(msg) if msg.starts_with("UNIQUE"))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct QuerySettings {
    pub enable_query_logging: bool,
    pub slow_query_threshold_ms: u64,
    pub max_limit: Option<i64>,
}

/// Connection pool handle shared by every request.
///
/// Statements borrow a pooled connection for their own duration only; the
/// connection goes back to the pool when the statement future completes or is
/// dropped.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    settings: Arc<QuerySettings>,
}

impl Database {
    pub async fn connect(config: &AppConfig) -> Result<Self, DatabaseError> {
        let db_config = &config.database;
        let options = SqliteConnectOptions::from_str(&db_config.url)
            .map_err(|e| DatabaseError::InvalidDatabaseUrl(e.to_string()))?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every connection to `:memory:` opens its own empty database, so the
        // pool is pinned to a single long-lived connection.
        let in_memory = Self::is_memory_url(&db_config.url);
        let mut pool_options = SqlitePoolOptions::new()
            .acquire_timeout(Duration::from_secs(db_config.connection_timeout));
        pool_options = if in_memory {
            pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options.max_connections(db_config.max_connections)
        };

        let pool = pool_options.connect_with(options).await?;
        info!("Opened database pool for: {}", db_config.url);

        Ok(Self {
            pool,
            settings: Arc::new(QuerySettings {
                enable_query_logging: db_config.enable_query_logging,
                slow_query_threshold_ms: db_config.slow_query_threshold_ms,
                max_limit: config.filter.max_limit,
            }),
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub(crate) fn settings(&self) -> &QuerySettings {
        &self.settings
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }

    fn is_memory_url(url: &str) -> bool {
        url.contains(":memory:") || url.contains("mode=memory")
    }
}
