//! Cookie-keyed sessions stored in SQLite through `tower-sessions`.
//!
//! A session holds the authenticated user id and pending flash messages.
//! Anonymous visitors only get a session when a flash has to survive a
//! redirect, and that session is short-lived and dropped once its flashes are
//! shown. Authenticating cycles the session id.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use time::Duration;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, Session, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

use crate::config::SecurityConfig;

pub const SESSION_COOKIE: &str = "pm_session";

/// Lifetime of a session that only carries flashes for an anonymous visitor
pub const ANONYMOUS_TTL: Duration = Duration::minutes(10);

const USER_ID_KEY: &str = "user_id";
const FLASHES_KEY: &str = "flashes";

pub type SessionError = tower_sessions::session::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Info,
    Success,
    Warning,
}

impl FlashLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Info => "info",
            FlashLevel::Success => "success",
            FlashLevel::Warning => "warning",
        }
    }
}

/// One-shot message shown on the next rendered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: FlashLevel::Info, message: message.into() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: FlashLevel::Success, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: FlashLevel::Warning, message: message.into() }
    }
}

/// Session store sharing the application's pool. Its table is created by
/// [`crate::database::initialize`].
pub fn session_store(pool: &SqlitePool) -> SqliteStore {
    SqliteStore::new(pool.clone())
}

pub fn session_layer(store: SqliteStore, security: &SecurityConfig) -> SessionManagerLayer<SqliteStore> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_secure(security.session_cookie_secure)
        .with_expiry(Expiry::OnInactivity(login_ttl(security)))
}

/// Inactivity timeout of an authenticated session
pub fn login_ttl(security: &SecurityConfig) -> Duration {
    Duration::hours(security.session_hours())
}

/// The authenticated user bound to this session, if any.
pub async fn user_id(session: &Session) -> Result<Option<i64>, SessionError> {
    session.get::<i64>(USER_ID_KEY).await
}

/// Binds `user_id` under a fresh session id. Pending flashes carry over and
/// the previous id stops working.
pub async fn log_in(session: &Session, user_id: i64, ttl: Duration) -> Result<(), SessionError> {
    session.cycle_id().await?;
    session.set_expiry(Some(Expiry::OnInactivity(ttl)));
    session.insert(USER_ID_KEY, user_id).await
}

/// Deletes the session and its stored record.
pub async fn log_out(session: &Session) -> Result<(), SessionError> {
    session.flush().await
}

/// Queues a flash. An anonymous session is kept for [`ANONYMOUS_TTL`] only.
pub async fn push_flash(session: &Session, flash: Flash) -> Result<(), SessionError> {
    if user_id(session).await?.is_none() {
        session.set_expiry(Some(Expiry::OnInactivity(ANONYMOUS_TTL)));
    }
    let mut flashes = session.get::<Vec<Flash>>(FLASHES_KEY).await?.unwrap_or_default();
    flashes.push(flash);
    session.insert(FLASHES_KEY, flashes).await
}

/// Drains pending flashes. An anonymous session has nothing left after this
/// and is deleted.
pub async fn take_flashes(session: &Session) -> Result<Vec<Flash>, SessionError> {
    let flashes = session.remove::<Vec<Flash>>(FLASHES_KEY).await?.unwrap_or_default();
    if session.id().is_some() && user_id(session).await?.is_none() {
        session.flush().await?;
    }
    Ok(flashes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::memory_database;
    use std::sync::Arc;
    use time::OffsetDateTime;
    use tower_sessions::session::{Id, Record};
    use tower_sessions::{ExpiredDeletion, SessionStore};

    async fn stored_sessions(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM tower_sessions")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn flashes_are_drained_once() {
        let db = memory_database().await;
        let session = Session::new(None, Arc::new(session_store(db.pool())), None);

        push_flash(&session, Flash::info("one")).await.unwrap();
        push_flash(&session, Flash::success("two")).await.unwrap();
        assert_eq!(
            take_flashes(&session).await.unwrap(),
            vec![Flash::info("one"), Flash::success("two")]
        );
        assert!(take_flashes(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn anonymous_flash_sessions_are_short_lived() {
        let db = memory_database().await;
        let session = Session::new(None, Arc::new(session_store(db.pool())), None);

        push_flash(&session, Flash::warning("Please log in first.")).await.unwrap();
        assert!(matches!(session.expiry(), Some(Expiry::OnInactivity(ttl)) if ttl == ANONYMOUS_TTL));

        log_in(&session, 7, Duration::hours(12)).await.unwrap();
        assert!(matches!(session.expiry(), Some(Expiry::OnInactivity(ttl)) if ttl == Duration::hours(12)));
        assert_eq!(user_id(&session).await.unwrap(), Some(7));
        // Carried over from the anonymous session
        assert_eq!(take_flashes(&session).await.unwrap().len(), 1);
        // Still authenticated after the flashes are read
        assert_eq!(user_id(&session).await.unwrap(), Some(7));
    }

    #[tokio::test]
    async fn expired_records_are_deleted() {
        let db = memory_database().await;
        let store = session_store(db.pool());

        let expired = Record {
            id: Id(1),
            data: Default::default(),
            expiry_date: OffsetDateTime::now_utc() - Duration::minutes(1),
        };
        let live = Record {
            id: Id(2),
            data: Default::default(),
            expiry_date: OffsetDateTime::now_utc() + ANONYMOUS_TTL,
        };
        store.save(&expired).await.unwrap();
        store.save(&live).await.unwrap();
        assert_eq!(stored_sessions(db.pool()).await, 2);

        store.delete_expired().await.unwrap();
        assert_eq!(stored_sessions(db.pool()).await, 1);
        assert!(store.load(&Id(2)).await.unwrap().is_some());
    }
}
