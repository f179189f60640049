//! Account domain types.

use chrono::{DateTime, Utc};

use pinmark_core::{AccountId, Username};

/// A registered account (domain type).
///
/// Carries no password hash; the hash only leaves the repository
/// through [`crate::db::AccountRepository::get_password_hash`].
#[derive(Debug, Clone)]
pub struct Account {
    /// Unique account ID.
    pub id: AccountId,
    /// Login name, unique and immutable.
    pub username: Username,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}
