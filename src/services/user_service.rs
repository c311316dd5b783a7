use chrono::Utc;

use crate::auth::{hash_password_async, verify_dummy_async, verify_password_async, AuthError};
use crate::database::manager::{Database, DatabaseError};
use crate::database::models::user::{normalize_email, validate_email_format, User, DEFAULT_ROLE};

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("User not found: {0}")]
    NotFound(String),
    #[error("User already exists: {0}")]
    AlreadyExists(String),
    #[error("Invalid email: {0}")]
    InvalidEmail(String),
    #[error("Password must be at least 8 characters")]
    WeakPassword,
}

impl From<sqlx::Error> for UserError {
    fn from(err: sqlx::Error) -> Self {
        UserError::Database(DatabaseError::Sqlx(err))
    }
}

pub struct UserService {
    db: Database,
}

impl UserService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, UserError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM \"users\" WHERE \"id\" = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM \"users\" WHERE \"email\" = ?")
            .bind(normalize_email(email))
            .fetch_optional(self.db.pool())
            .await?;
        Ok(user)
    }

    /// The user owning `email` if `password` matches its stored hash.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>, UserError> {
        match self.find_by_email(email).await? {
            Some(user) if verify_password_async(password, &user.password_hash).await => Ok(Some(user)),
            Some(_) => Ok(None),
            None => {
                verify_dummy_async(password).await;
                Ok(None)
            }
        }
    }

    pub async fn create_user(&self, email: &str, password: &str, role: Option<&str>) -> Result<User, UserError> {
        let email = normalize_email(email);
        validate_email_format(&email).map_err(UserError::InvalidEmail)?;
        Self::check_password(password)?;
        let password_hash = hash_password_async(password).await?;

        let result = sqlx::query(
            "INSERT INTO \"users\" (\"email\", \"password_hash\", \"role\", \"created_at\") VALUES (?, ?, ?, ?)",
        )
        .bind(&email)
        .bind(&password_hash)
        .bind(role.unwrap_or(DEFAULT_ROLE))
        .bind(Utc::now())
        .execute(self.db.pool())
        .await
        .map_err(DatabaseError::from_write);

        let id = match result {
            Ok(done) => done.last_insert_rowid(),
            Err(e) if e.is_unique_violation() => return Err(UserError::AlreadyExists(email)),
            Err(e) => return Err(e.into()),
        };
        tracing::info!("Created user {} (id {})", email, id);

        self.find_by_id(id).await?.ok_or(UserError::NotFound(email))
    }

    pub async fn set_password(&self, email: &str, password: &str) -> Result<(), UserError> {
        Self::check_password(password)?;
        let password_hash = hash_password_async(password).await?;
        let email = normalize_email(email);

        let result = sqlx::query("UPDATE \"users\" SET \"password_hash\" = ? WHERE \"email\" = ?")
            .bind(&password_hash)
            .bind(&email)
            .execute(self.db.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(email));
        }
        tracing::info!("Updated password for {}", email);
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<User>, UserError> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM \"users\" ORDER BY \"id\"")
            .fetch_all(self.db.pool())
            .await?;
        Ok(users)
    }

    pub async fn count(&self) -> Result<i64, UserError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM \"users\"")
            .fetch_one(self.db.pool())
            .await?;
        Ok(count)
    }

    fn check_password(password: &str) -> Result<(), UserError> {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(UserError::WeakPassword);
        }
        Ok(())
    }
}
