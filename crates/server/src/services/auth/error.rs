//! Authentication error types.

use thiserror::Error;

use pinmark_core::UsernameError;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required input was missing or empty.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Username failed validation.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    /// Registration code did not match the configured one.
    #[error("invalid verification code")]
    InvalidCode,

    /// Username is already taken.
    #[error("username already exists")]
    DuplicateUsername,

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Session token missing, malformed, forged or expired.
    #[error("unauthenticated")]
    Unauthenticated,

    /// Session token could not be signed.
    #[error("token encoding error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
