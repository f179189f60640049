//! Token-bound identity.

use serde::{Deserialize, Serialize};

use pinmark_core::{AccountId, Username};

use super::Account;

/// The account a request is acting as.
///
/// Produced by login and by token validation, and serialized as the public
/// account info (`{"id", "username"}`). Every bookmark operation uses `id` as
/// its owner filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAccount {
    pub id: AccountId,
    pub username: Username,
}

impl From<&Account> for CurrentAccount {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
        }
    }
}
