use chrono::Utc;
use sqlx::Row;
use tracing::{info, warn};

use crate::auth::{hash_password_async, session_store, AuthError};
use crate::config::SecurityConfig;
use crate::database::manager::{Database, DatabaseError};
use crate::database::models::user::{normalize_email, DEFAULT_ROLE};

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Schema statement failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Credential(#[from] AuthError),
}

/// Credentials for the administrator created on first start
#[derive(Debug, Clone)]
pub struct SeedAdmin {
    pub email: String,
    pub password: String,
}

impl From<&SecurityConfig> for SeedAdmin {
    fn from(security: &SecurityConfig) -> Self {
        Self {
            email: security.seed_admin_email.clone(),
            password: security.seed_admin_password.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaReport {
    pub tables: Vec<&'static str>,
    /// Email of the administrator created by this run, if any
    pub seeded_admin: Option<String>,
}

const TABLES: &[(&str, &str)] = &[
    (
        "users",
        r#"CREATE TABLE IF NOT EXISTS "users" (
            "id" INTEGER PRIMARY KEY AUTOINCREMENT,
            "email" TEXT NOT NULL UNIQUE,
            "password_hash" TEXT NOT NULL,
            "role" TEXT NOT NULL DEFAULT 'admin',
            "created_at" TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )"#,
    ),
    (
        "properties",
        r#"CREATE TABLE IF NOT EXISTS "properties" (
            "id" INTEGER PRIMARY KEY AUTOINCREMENT,
            "name" TEXT NOT NULL,
            "address" TEXT,
            "status" TEXT NOT NULL DEFAULT 'vacant' CHECK ("status" IN ('vacant', 'occupied')),
            "utility_ref" TEXT,
            "unit_type" TEXT,
            "bedrooms" INTEGER,
            "bathrooms" INTEGER,
            "size_sqft" REAL,
            "furnished" INTEGER NOT NULL DEFAULT 0,
            "price" REAL,
            "notes" TEXT,
            "created_by" INTEGER REFERENCES "users" ("id") ON DELETE SET NULL,
            "created_at" TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )"#,
    ),
    (
        "tenants",
        r#"CREATE TABLE IF NOT EXISTS "tenants" (
            "id" INTEGER PRIMARY KEY AUTOINCREMENT,
            "name" TEXT NOT NULL,
            "phone" TEXT,
            "email" TEXT,
            "id_number" TEXT,
            "emergency_contact" TEXT,
            "notes" TEXT,
            "created_at" TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )"#,
    ),
    (
        "contracts",
        r#"CREATE TABLE IF NOT EXISTS "contracts" (
            "id" INTEGER PRIMARY KEY AUTOINCREMENT,
            "property_id" INTEGER NOT NULL REFERENCES "properties" ("id"),
            "tenant_id" INTEGER NOT NULL REFERENCES "tenants" ("id"),
            "start_date" TEXT,
            "end_date" TEXT,
            "rent_amount" REAL,
            "billing_frequency" TEXT NOT NULL DEFAULT 'monthly'
                CHECK ("billing_frequency" IN ('monthly', 'quarterly', 'semiannual', 'annual')),
            "deposit_amount" REAL,
            "status" TEXT NOT NULL DEFAULT 'active' CHECK ("status" IN ('active', 'expired', 'terminated')),
            "renewal_notice_days" INTEGER NOT NULL DEFAULT 60,
            "terms" TEXT,
            "created_at" TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )"#,
    ),
    (
        "cheques",
        r#"CREATE TABLE IF NOT EXISTS "cheques" (
            "id" INTEGER PRIMARY KEY AUTOINCREMENT,
            "contract_id" INTEGER NOT NULL REFERENCES "contracts" ("id"),
            "cheque_number" TEXT,
            "bank_name" TEXT,
            "amount" REAL,
            "issue_date" TEXT,
            "due_date" TEXT,
            "status" TEXT NOT NULL DEFAULT 'issued'
                CHECK ("status" IN ('issued', 'deposited', 'cleared', 'bounced')),
            "created_at" TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )"#,
    ),
];

const INDEXES: &[&str] = &[
    r#"CREATE INDEX IF NOT EXISTS "idx_properties_status" ON "properties" ("status")"#,
    r#"CREATE INDEX IF NOT EXISTS "idx_contracts_property" ON "contracts" ("property_id")"#,
    r#"CREATE INDEX IF NOT EXISTS "idx_contracts_tenant" ON "contracts" ("tenant_id")"#,
    r#"CREATE INDEX IF NOT EXISTS "idx_cheques_contract" ON "cheques" ("contract_id")"#,
];

/// Creates any missing table, including the session store's, and seeds the first administrator when the
/// users table is empty. Safe to run on every start.
pub async fn initialize(db: &Database, seed: &SeedAdmin) -> Result<SchemaReport, SchemaError> {
    for (name, ddl) in TABLES {
        sqlx::query(ddl).execute(db.pool()).await?;
        tracing::debug!("Ensured table {}", name);
    }
    for ddl in INDEXES {
        sqlx::query(ddl).execute(db.pool()).await?;
    }
    session_store(db.pool()).migrate().await?;

    let seeded_admin = seed_admin(db, seed).await?;
    info!("Database schema ready ({} tables)", TABLES.len());

    Ok(SchemaReport {
        tables: TABLES.iter().map(|(name, _)| *name).collect(),
        seeded_admin,
    })
}

async fn seed_admin(db: &Database, seed: &SeedAdmin) -> Result<Option<String>, SchemaError> {
    let users: i64 = sqlx::query("SELECT COUNT(*) AS count FROM \"users\"")
        .fetch_one(db.pool())
        .await?
        .try_get("count")?;
    if users > 0 {
        return Ok(None);
    }

    let email = normalize_email(&seed.email);
    let password_hash = hash_password_async(&seed.password).await?;

    // Guarded so concurrent starts cannot both seed
    let result = sqlx::query(
        r#"INSERT INTO "users" ("email", "password_hash", "role", "created_at")
           SELECT ?, ?, ?, ? WHERE NOT EXISTS (SELECT 1 FROM "users")"#,
    )
    .bind(&email)
    .bind(&password_hash)
    .bind(DEFAULT_ROLE)
    .bind(Utc::now())
    .execute(db.pool())
    .await
    .map_err(DatabaseError::from_write)?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    warn!(
        "Seeded default administrator {}; change its password with `pm user passwd {}`",
        email, email
    );
    Ok(Some(email))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;
    use crate::config::AppConfig;

    async fn connect() -> Database {
        Database::connect(&AppConfig::for_tests()).await.unwrap()
    }

    fn seed() -> SeedAdmin {
        SeedAdmin::from(&AppConfig::for_tests().security)
    }

    async fn user_rows(db: &Database) -> Vec<(String, String)> {
        sqlx::query_as::<_, (String, String)>("SELECT email, password_hash FROM users")
            .fetch_all(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn first_run_creates_tables_and_one_admin() {
        let db = connect().await;
        let report = initialize(&db, &seed()).await.unwrap();
        assert_eq!(report.tables, vec!["users", "properties", "tenants", "contracts", "cheques"]);
        assert_eq!(report.seeded_admin.as_deref(), Some("admin@example.com"));

        let users = user_rows(&db).await;
        assert_eq!(users.len(), 1);
        assert!(verify_password("admin123", &users[0].1));
        assert_ne!(users[0].1, "admin123");
    }

    #[tokio::test]
    async fn rerun_is_idempotent() {
        let db = connect().await;
        initialize(&db, &seed()).await.unwrap();
        sqlx::query("INSERT INTO properties (name, created_at) VALUES ('Kept', '2026-01-01T00:00:00Z')")
            .execute(db.pool())
            .await
            .unwrap();

        let again = initialize(&db, &seed()).await.unwrap();
        assert_eq!(again.seeded_admin, None);
        assert_eq!(user_rows(&db).await.len(), 1);

        let kept: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM properties")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(kept, 1);
    }

    #[tokio::test]
    async fn existing_users_suppress_seeding() {
        let db = connect().await;
        for (_, ddl) in TABLES {
            sqlx::query(ddl).execute(db.pool()).await.unwrap();
        }
        sqlx::query("INSERT INTO users (email, password_hash) VALUES ('owner@example.com', 'x')")
            .execute(db.pool())
            .await
            .unwrap();

        let report = initialize(&db, &seed()).await.unwrap();
        assert_eq!(report.seeded_admin, None);
        let emails: Vec<String> = user_rows(&db).await.into_iter().map(|(e, _)| e).collect();
        assert_eq!(emails, vec!["owner@example.com".to_string()]);
    }
}
