//! Bookmark repository.
//!
//! Every statement carries `user_id = ?` next to the bookmark id, so a caller
//! can never observe or modify another account's rows. A mismatched owner
//! looks exactly like a missing row.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use pinmark_core::{AccountId, BookmarkChanges, BookmarkId};

use super::RepositoryError;
use crate::models::Bookmark;

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for bookmark queries.
#[derive(Debug, sqlx::FromRow)]
struct BookmarkRow {
    id: BookmarkId,
    user_id: AccountId,
    title: String,
    url: String,
    note: String,
    sort_order: i64,
    is_pinned: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BookmarkRow> for Bookmark {
    fn from(row: BookmarkRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.user_id,
            title: row.title,
            url: row.url,
            note: row.note,
            order: row.sort_order,
            pinned: row.is_pinned,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const BOOKMARK_COLUMNS: &str =
    "id, user_id, title, url, note, sort_order, is_pinned, created_at, updated_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for owner-scoped bookmark operations.
pub struct BookmarkRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> BookmarkRepository<'a> {
    /// Create a new bookmark repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// All bookmarks belonging to `owner`, in storage order.
    ///
    /// Display ordering is applied by the caller.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_owner(&self, owner: AccountId) -> Result<Vec<Bookmark>, RepositoryError> {
        let rows = sqlx::query_as::<_, BookmarkRow>(&format!(
            "SELECT {BOOKMARK_COLUMNS} FROM bookmark WHERE user_id = ?1"
        ))
        .bind(owner)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Bookmark::from).collect())
    }

    /// IDs of all bookmarks belonging to `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_ids_for_owner(
        &self,
        owner: AccountId,
    ) -> Result<Vec<BookmarkId>, RepositoryError> {
        let ids: Vec<(BookmarkId,)> =
            sqlx::query_as("SELECT id FROM bookmark WHERE user_id = ?1 ORDER BY id")
                .bind(owner)
                .fetch_all(self.pool)
                .await?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    /// Get one bookmark by id, only if `owner` owns it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        owner: AccountId,
        id: BookmarkId,
    ) -> Result<Option<Bookmark>, RepositoryError> {
        let row = sqlx::query_as::<_, BookmarkRow>(&format!(
            "SELECT {BOOKMARK_COLUMNS} FROM bookmark WHERE id = ?1 AND user_id = ?2"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Bookmark::from))
    }

    /// Insert a bookmark at the top of the owner's unpinned tier.
    ///
    /// The new order is one above the owner's current maximum (or 1 for the
    /// first bookmark). Computing it inside the `INSERT` keeps the read and the
    /// write one atomic statement, so concurrent inserts for the same owner
    /// never pick the same value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        owner: AccountId,
        title: &str,
        url: &str,
        note: &str,
    ) -> Result<Bookmark, RepositoryError> {
        let row = sqlx::query_as::<_, BookmarkRow>(&format!(
            r"
            INSERT INTO bookmark (user_id, title, url, note, sort_order, is_pinned, created_at, updated_at)
            SELECT ?1, ?2, ?3, ?4, COALESCE(MAX(sort_order), 0) + 1, FALSE, ?5, ?5
            FROM bookmark
            WHERE user_id = ?1
            RETURNING {BOOKMARK_COLUMNS}
            "
        ))
        .bind(owner)
        .bind(title)
        .bind(url)
        .bind(note)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Apply resolved changes to an owned bookmark.
    ///
    /// `None` fields keep their stored value. Returns `None` if the owner has no
    /// bookmark with this id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        owner: AccountId,
        id: BookmarkId,
        changes: &BookmarkChanges,
    ) -> Result<Option<Bookmark>, RepositoryError> {
        let row = sqlx::query_as::<_, BookmarkRow>(&format!(
            r"
            UPDATE bookmark
            SET title = COALESCE(?1, title),
                url = COALESCE(?2, url),
                note = COALESCE(?3, note),
                updated_at = ?4
            WHERE id = ?5 AND user_id = ?6
            RETURNING {BOOKMARK_COLUMNS}
            "
        ))
        .bind(changes.title.as_deref())
        .bind(changes.url.as_deref())
        .bind(changes.note.as_deref())
        .bind(Utc::now())
        .bind(id)
        .bind(owner)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Bookmark::from))
    }

    /// Delete an owned bookmark.
    ///
    /// Remaining bookmarks keep their order values.
    ///
    /// # Returns
    ///
    /// Returns `true` if the bookmark was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, owner: AccountId, id: BookmarkId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM bookmark WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(owner)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Flip the pin flag of an owned bookmark. `sort_order` is untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn toggle_pin(
        &self,
        owner: AccountId,
        id: BookmarkId,
    ) -> Result<Option<Bookmark>, RepositoryError> {
        let row = sqlx::query_as::<_, BookmarkRow>(&format!(
            r"
            UPDATE bookmark
            SET is_pinned = NOT is_pinned,
                updated_at = ?1
            WHERE id = ?2 AND user_id = ?3
            RETURNING {BOOKMARK_COLUMNS}
            "
        ))
        .bind(Utc::now())
        .bind(id)
        .bind(owner)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Bookmark::from))
    }

    /// Set the order value of one owned bookmark.
    ///
    /// # Returns
    ///
    /// Returns `true` if a row was updated, `false` if the owner has no
    /// bookmark with this id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_order(
        &self,
        owner: AccountId,
        id: BookmarkId,
        order: i64,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE bookmark SET sort_order = ?1, updated_at = ?2 WHERE id = ?3 AND user_id = ?4",
        )
        .bind(order)
        .bind(Utc::now())
        .bind(id)
        .bind(owner)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
