//! Accounts, server-side sessions and signed session cookies.
//!
//! Passwords are stored as bcrypt hashes; hashing and verification run on
//! the blocking pool. A session is a random token stored in the `sessions`
//! table. The cookie carries the token plus an HMAC-SHA256 signature:
//!
//! ```text
//! {token}.{hex(hmac_sha256(secret, token))}
//! ```
//!
//! A cookie whose signature does not verify is treated as absent.

use anyhow::{anyhow, Result};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use sqlx::{Row, SqlitePool};
use thiserror::Error;

use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::models::User;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("All fields are required")]
    MissingFields,
    #[error("That email is already registered")]
    EmailTaken,
    #[error("Incorrect email or password")]
    InvalidCredentials,
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        AuthError::Internal(err.into())
    }
}

impl AuthError {
    /// Short code passed back to the forms as `?error=`.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingFields => "missing_fields",
            AuthError::EmailTaken => "email_taken",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::Internal(_) => "internal",
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// ============ Accounts ============

/// Creates an account and returns it.
pub async fn register_user(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    password: &str,
    cost: u32,
) -> std::result::Result<User, AuthError> {
    let name = name.trim();
    let email = normalize_email(email);
    if name.is_empty() || email.is_empty() || password.is_empty() {
        return Err(AuthError::MissingFields);
    }

    let password = password.to_string();
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| anyhow!("password hashing task failed: {}", e))?
        .map_err(|e| anyhow!("password hashing failed: {}", e))?;

    let inserted = sqlx::query(
        "INSERT INTO users (name, email, password_hash, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(name)
    .bind(&email)
    .bind(&hash)
    .bind(chrono::Utc::now().timestamp())
    .execute(pool)
    .await;

    match inserted {
        Ok(done) => Ok(User {
            id: done.last_insert_rowid(),
            name: name.to_string(),
            email,
        }),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(AuthError::EmailTaken),
        Err(e) => Err(e.into()),
    }
}

/// Checks an email/password pair. Unknown emails and wrong passwords are
/// indistinguishable to the caller.
pub async fn verify_credentials(
    pool: &SqlitePool,
    email: &str,
    password: &str,
) -> std::result::Result<User, AuthError> {
    let email = normalize_email(email);
    if email.is_empty() || password.is_empty() {
        return Err(AuthError::MissingFields);
    }

    let row = sqlx::query("SELECT id, name, email, password_hash FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(pool)
        .await?;

    let Some(row) = row else {
        return Err(AuthError::InvalidCredentials);
    };

    let hash: String = row.get("password_hash");
    let password = password.to_string();
    let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| anyhow!("password verification task failed: {}", e))?
        // A corrupt stored hash is a failed login, not a server error.
        .unwrap_or(false);

    if !valid {
        return Err(AuthError::InvalidCredentials);
    }

    Ok(User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
    })
}

/// CLI entry point for `bloom user add`.
pub async fn run_user_add(config: &Config, name: &str, email: &str, password: &str) -> Result<()> {
    let pool = db::connect(config).await?;
    migrate::apply(&pool).await?;

    let user = register_user(&pool, name, email, password, config.auth.bcrypt_cost).await?;
    println!("Created user {} <{}> (id {})", user.name, user.email, user.id);

    pool.close().await;
    Ok(())
}

// ============ Sessions ============

/// Opens a session for `user_id` and returns its token.
pub async fn create_session(pool: &SqlitePool, user_id: i64, ttl: chrono::Duration) -> Result<String> {
    let token = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now();

    sqlx::query("INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)")
        .bind(&token)
        .bind(user_id)
        .bind(now.timestamp())
        .bind((now + ttl).timestamp())
        .execute(pool)
        .await?;

    Ok(token)
}

/// Looks up the user owning an unexpired session.
pub async fn find_session_user(pool: &SqlitePool, token: &str) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT u.id, u.name, u.email
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token = ? AND s.expires_at > ?
        "#,
    )
    .bind(token)
    .bind(chrono::Utc::now().timestamp())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
    }))
}

pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

/// Removes expired sessions and returns how many were deleted.
pub async fn purge_expired_sessions(pool: &SqlitePool) -> Result<u64> {
    let done = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(chrono::Utc::now().timestamp())
        .execute(pool)
        .await?;
    Ok(done.rows_affected())
}

// ============ Cookie signing ============

fn mac_for(secret: &str) -> Result<HmacSha256> {
    HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| anyhow!("invalid HMAC key"))
}

/// Produces the cookie value for a session token.
pub fn sign_token(secret: &str, token: &str) -> Result<String> {
    let mut mac = mac_for(secret)?;
    mac.update(token.as_bytes());
    Ok(format!("{}.{}", token, hex::encode(mac.finalize().into_bytes())))
}

/// Returns the session token if the cookie's signature verifies.
pub fn verify_signed_token(secret: &str, cookie: &str) -> Option<String> {
    let (token, signature) = cookie.rsplit_once('.')?;
    if token.is_empty() {
        return None;
    }

    let signature = hex::decode(signature).ok()?;
    let mut mac = mac_for(secret).ok()?;
    mac.update(token.as_bytes());
    mac.verify_slice(&signature).ok()?;

    Some(token.to_string())
}
