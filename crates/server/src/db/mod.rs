//! Database operations for the Pinmark `SQLite` store.
//!
//! ## Tables
//!
//! - `account` - Username + Argon2 password hash
//! - `bookmark` - Owner-scoped bookmarks with `sort_order` and `is_pinned`
//!
//! # Migrations
//!
//! Migrations live in `crates/server/migrations/` and are embedded in the
//! binary. Run them via:
//! ```bash
//! cargo run -p pinmark-cli -- migrate
//! ```
//!
//! Every query is a single statement scoped by owner, so each row mutation is
//! atomic without any explicit locking on our side.

pub mod accounts;
pub mod bookmarks;

use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::SqlitePool;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

pub use accounts::AccountRepository;
pub use bookmarks::BookmarkRepository;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `SQLite` connection pool with sensible defaults.
///
/// The database file is created if it does not exist. File databases use WAL
/// so readers never block the single writer.
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the connection cannot be
/// established.
pub async fn create_pool(database_url: &SecretString) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url.expose_secret())?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Create a private in-memory database with migrations applied.
///
/// Every call returns an isolated store. The pool holds exactly one connection
/// that is never recycled, since an in-memory database lives only as long as
/// its connection.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the connection or a migration fails.
pub async fn create_memory_pool() -> Result<SqlitePool, RepositoryError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;
    Ok(pool)
}

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if a migration fails.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), RepositoryError> {
    MIGRATOR.run(pool).await.map_err(sqlx::Error::from)?;
    Ok(())
}

/// Map a unique-constraint violation to `RepositoryError::Conflict`.
fn conflict_on_unique(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(err)
}
