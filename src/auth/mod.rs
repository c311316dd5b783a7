pub mod password;
pub mod session;

pub use password::{hash_password, hash_password_async, verify_dummy_async, verify_password, verify_password_async};
pub use session::{
    log_in, log_out, login_ttl, push_flash, session_layer, session_store, take_flashes, user_id, Flash, FlashLevel,
    SessionError, ANONYMOUS_TTL, SESSION_COOKIE,
};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Password hashing failed: {0}")]
    Hash(String),
}
