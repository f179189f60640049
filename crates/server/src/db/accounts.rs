//! Account repository: the credential store.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use pinmark_core::{AccountId, Username};

use super::{RepositoryError, conflict_on_unique};
use crate::models::Account;

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for account queries.
#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: AccountId,
    username: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = RepositoryError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            username,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Account row joined with its password hash, used only for login.
#[derive(Debug, sqlx::FromRow)]
struct AccountWithHashRow {
    #[sqlx(flatten)]
    account: AccountRow,
    password_hash: String,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for account database operations.
pub struct AccountRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AccountRepository<'a> {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new account with a password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<Account, RepositoryError> {
        let now = Utc::now();

        let row = sqlx::query_as::<_, AccountRow>(
            r"
            INSERT INTO account (username, password_hash, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            RETURNING id, username, created_at, updated_at
            ",
        )
        .bind(username.as_str())
        .bind(password_hash)
        .bind(now)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "username"))?;

        row.try_into()
    }

    /// Get an account and its password hash by username.
    ///
    /// Returns `None` if no account has that username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        username: &Username,
    ) -> Result<Option<(Account, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountWithHashRow>(
            r"
            SELECT id, username, created_at, updated_at, password_hash
            FROM account
            WHERE username = ?1
            ",
        )
        .bind(username.as_str())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let account = Account::try_from(row.account)?;
        Ok(Some((account, row.password_hash)))
    }
}
