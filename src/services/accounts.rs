//! Registration, login and session tokens.
//!
//! Passwords are stored as argon2id PHC strings. Session tokens are 32
//! random bytes handed to the client once; only their SHA-256 digest is
//! persisted.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::Serialize;
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use crate::db::{session_repo, user_repo};
use crate::errors::{is_unique_violation, AppError};
use crate::models::{CurrentUser, User};

const TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone, Serialize)]
pub struct LoginToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?;

    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

pub fn validate_username(username: &str) -> Result<(), AppError> {
    let len = username.chars().count();
    if !(3..=64).contains(&len) {
        return Err(AppError::BadRequest("username must be 3 to 64 characters".into()));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err(AppError::BadRequest(
            "username may only contain letters, digits, '_', '-' and '.'".into(),
        ));
    }

    Ok(())
}

pub fn validate_password_strength(password: &str) -> Result<(), AppError> {
    if password.chars().count() < 8 {
        return Err(AppError::BadRequest("password must be at least 8 characters".into()));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AppError::BadRequest("password must contain a digit".into()));
    }
    if !password.chars().any(|c| c.is_alphabetic()) {
        return Err(AppError::BadRequest("password must contain a letter".into()));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Digest stored in the sessions table for a client token.
pub fn hash_token(token: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(token.as_bytes()))
}

// ---------------------------------------------------------------------------
// Flows
// ---------------------------------------------------------------------------

pub async fn register(pool: &PgPool, username: &str, password: &str) -> Result<User, AppError> {
    validate_username(username)?;
    validate_password_strength(password)?;

    let hash = hash_password(password)?;
    match user_repo::create_user(pool, username, &hash).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, username = %user.username, "User registered");
            Ok(user)
        }
        Err(e) if is_unique_violation(&e) => {
            Err(AppError::Conflict("username already taken".into()))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn login(
    pool: &PgPool,
    username: &str,
    password: &str,
    ttl_hours: i64,
) -> Result<LoginToken, AppError> {
    let user = user_repo::get_user_by_username(pool, username)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(password, &user.password_hash) {
        tracing::warn!(username = %username, "Failed login attempt");
        return Err(AppError::Unauthorized);
    }

    let token = generate_token();
    let expires_at = Utc::now() + Duration::hours(ttl_hours);
    session_repo::create_session(pool, user.id, &hash_token(&token), expires_at).await?;

    let purged = session_repo::delete_expired_sessions(pool, user.id).await?;
    tracing::info!(user_id = %user.id, purged_sessions = purged, "User logged in");

    Ok(LoginToken { token, expires_at })
}

pub async fn authenticate(pool: &PgPool, token: &str) -> Result<CurrentUser, AppError> {
    session_repo::find_active_session(pool, &hash_token(token))
        .await?
        .ok_or(AppError::Unauthorized)
}

pub async fn logout(pool: &PgPool, user: &CurrentUser) -> Result<(), AppError> {
    session_repo::delete_session(pool, user.session_id).await?;
    tracing::info!(user_id = %user.id, "User logged out");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("Journal2024").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("Journal2024", &hash));
        assert!(!verify_password("journal2024", &hash));
    }

    #[test]
    fn test_verify_against_malformed_hash() {
        assert!(!verify_password("whatever1", "not-a-phc-string"));
    }

    #[test]
    fn test_password_strength() {
        assert!(validate_password_strength("abcd1234").is_ok());
        assert!(validate_password_strength("short1").is_err());
        assert!(validate_password_strength("onlyletters").is_err());
        assert!(validate_password_strength("12345678").is_err());
    }

    #[test]
    fn test_username_rules() {
        assert!(validate_username("trader_01").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_tokens_are_unique_and_hash_stably() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert_eq!(hash_token(&a), hash_token(&a));
        assert_ne!(hash_token(&a), hash_token(&b));
        assert_ne!(hash_token(&a), a);
    }
}
