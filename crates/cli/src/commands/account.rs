//! Account management commands.
//!
//! Operator path for creating accounts directly, without the registration
//! code the public API requires.

use pinmark_core::{Username, UsernameError};
use pinmark_server::db::{self, AccountRepository, RepositoryError};
use pinmark_server::services::{AuthError, hash_password};
use thiserror::Error;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Username failed validation.
    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    /// Password was empty.
    #[error("Password must not be empty")]
    EmptyPassword,

    /// Account already exists.
    #[error("Account already exists with username: {0}")]
    Exists(String),

    /// Password hashing failed.
    #[error("Password hashing failed: {0}")]
    Hash(#[from] AuthError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),
}

impl From<sqlx::Error> for AccountError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(RepositoryError::Database(err))
    }
}

/// Create a new account.
///
/// Migrations are applied first so this works against a fresh database file.
///
/// # Errors
///
/// Returns `AccountError::Exists` if the username is taken.
pub async fn create(username: &str, password: &str) -> Result<(), AccountError> {
    let username = Username::parse(username)?;
    if password.is_empty() {
        return Err(AccountError::EmptyPassword);
    }

    let pool = super::connect().await?;
    db::run_migrations(&pool).await?;

    let password_hash = hash_password(password)?;
    let account = AccountRepository::new(&pool)
        .create(&username, &password_hash)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => AccountError::Exists(username.to_string()),
            other => AccountError::Database(other),
        })?;

    tracing::info!(account_id = %account.id, username = %account.username, "Account created");
    Ok(())
}
