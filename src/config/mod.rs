use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub filter: FilterConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub enable_query_logging: bool,
    pub slow_query_threshold_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    pub max_limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub session_expiry_hours: u64,
    pub session_cookie_secure: bool,
    pub seed_admin_email: String,
    pub seed_admin_password: String,
}

/// Credentials of the first administrator, created when the users table is empty.
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Upper bound on `SESSION_EXPIRY_HOURS`; one year.
pub const MAX_SESSION_EXPIRY_HOURS: u64 = 24 * 365;

const DEFAULT_DATABASE_URL: &str = "sqlite://property_manager.db";

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    /// Development settings against a private in-memory database.
    pub fn for_tests() -> Self {
        let mut config = Self::development();
        config.database.url = "sqlite::memory:".to_string();
        config.database.enable_query_logging = false;
        config
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Some(port) = env::var("PM_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_ENABLE_QUERY_LOGGING") {
            self.database.enable_query_logging = v.parse().unwrap_or(self.database.enable_query_logging);
        }
        if let Ok(v) = env::var("DATABASE_SLOW_QUERY_THRESHOLD_MS") {
            self.database.slow_query_threshold_ms = v.parse().unwrap_or(self.database.slow_query_threshold_ms);
        }

        // Filter overrides
        if let Ok(v) = env::var("FILTER_MAX_LIMIT") {
            self.filter.max_limit = v.parse().ok();
        }

        // Security overrides
        if let Ok(v) = env::var("SESSION_EXPIRY_HOURS") {
            self.security.session_expiry_hours = parse_session_hours(&v, self.security.session_expiry_hours);
        }
        if let Ok(v) = env::var("SESSION_COOKIE_SECURE") {
            self.security.session_cookie_secure = v.parse().unwrap_or(self.security.session_cookie_secure);
        }
        if let Ok(v) = env::var("SEED_ADMIN_EMAIL") {
            self.security.seed_admin_email = v.trim().to_lowercase();
        }
        if let Ok(v) = env::var("SEED_ADMIN_PASSWORD") {
            self.security.seed_admin_password = v;
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: 5,
                connection_timeout: 30,
                enable_query_logging: true,
                slow_query_threshold_ms: 100,
            },
            filter: FilterConfig {
                max_limit: Some(1000),
            },
            security: SecurityConfig {
                session_expiry_hours: 24 * 7, // 1 week
                session_cookie_secure: false,
                seed_admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
                seed_admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: 10,
                connection_timeout: 10,
                enable_query_logging: true,
                slow_query_threshold_ms: 500,
            },
            filter: FilterConfig {
                max_limit: Some(500),
            },
            security: SecurityConfig {
                session_expiry_hours: 24,
                session_cookie_secure: true,
                seed_admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
                seed_admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: 10,
                connection_timeout: 5,
                enable_query_logging: false,
                slow_query_threshold_ms: 1000,
            },
            filter: FilterConfig {
                max_limit: Some(200),
            },
            security: SecurityConfig {
                session_expiry_hours: 12,
                session_cookie_secure: true,
                seed_admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
                seed_admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
            },
        }
    }
}

impl SecurityConfig {
    /// Session lifetime in hours, within `1..=MAX_SESSION_EXPIRY_HOURS`.
    pub fn session_hours(&self) -> i64 {
        self.session_expiry_hours.clamp(1, MAX_SESSION_EXPIRY_HOURS) as i64
    }
}

/// Unparseable values keep `current`; out-of-range values are clamped.
fn parse_session_hours(raw: &str, current: u64) -> u64 {
    raw.trim()
        .parse::<u64>()
        .map(|hours| hours.clamp(1, MAX_SESSION_EXPIRY_HOURS))
        .unwrap_or(current)
}
