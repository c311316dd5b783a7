use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use std::sync::OnceLock;

use super::AuthError;

/// Salted argon2id hash in PHC string form.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// An unparseable stored hash never verifies.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(e) => {
            tracing::warn!("Stored password hash is not a valid PHC string: {}", e);
            false
        }
    }
}

/// Spends the same work as a real verification for logins with an unknown email.
pub fn verify_dummy(password: &str) {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();
    let dummy = DUMMY_HASH.get_or_init(|| hash_password("not-a-real-password").ok());
    if let Some(hash) = dummy {
        let _ = verify_password(password, hash);
    }
}

// argon2 is CPU-bound; request paths run it on tokio's blocking pool.

pub async fn hash_password_async(password: &str) -> Result<String, AuthError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::Hash(e.to_string()))?
}

pub async fn verify_password_async(password: &str, stored_hash: &str) -> bool {
    let (password, stored_hash) = (password.to_string(), stored_hash.to_string());
    match tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash)).await {
        Ok(verified) => verified,
        Err(e) => {
            tracing::error!("Password verification task failed: {}", e);
            false
        }
    }
}

pub async fn verify_dummy_async(password: &str) {
    let password = password.to_string();
    if let Err(e) = tokio::task::spawn_blocking(move || verify_dummy(&password)).await {
        tracing::error!("Password verification task failed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_only_the_exact_password() {
        let hash = hash_password("admin123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("admin123", &hash));

        for wrong in ["admin12", "admin1234", "Admin123", "admin124", " admin123", ""] {
            assert!(!verify_password(wrong, &hash), "{:?} should not verify", wrong);
        }
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("same", &a) && verify_password("same", &b));
    }

    #[tokio::test]
    async fn blocking_pool_variants_agree() {
        let hash = hash_password_async("admin123").await.unwrap();
        assert!(verify_password_async("admin123", &hash).await);
        assert!(!verify_password_async("admin124", &hash).await);
        verify_dummy_async("admin123").await;
    }

    #[test]
    fn garbage_hash_is_rejected() {
        assert!(!verify_password("admin123", "admin123"));
        assert!(!verify_password("admin123", ""));
    }
}
