//! Bookmark service.
//!
//! Owner-scoped CRUD, pin toggling and explicit reordering on top of
//! [`BookmarkRepository`]. Every method takes the owner id from the validated
//! session; there is no way to address a bookmark without one.

use sqlx::SqlitePool;
use thiserror::Error;

use pinmark_core::{AccountId, BookmarkId, BookmarkPatch, ReorderError, ReorderPlan, sort_for_display};

use crate::db::{BookmarkRepository, RepositoryError};
use crate::models::{Bookmark, NewBookmark};

/// Errors from bookmark operations.
#[derive(Debug, Error)]
pub enum BookmarkError {
    /// Input failed validation.
    #[error("{0}")]
    Validation(String),

    /// Bookmark does not exist or belongs to someone else.
    #[error("bookmark not found")]
    NotFound,

    /// Strict reorder rejected the submitted id list.
    #[error("invalid order: {0}")]
    InvalidOrder(#[from] ReorderError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Outcome of a reorder request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReorderSummary {
    /// Ids submitted.
    pub requested: usize,
    /// Rows actually updated (foreign or unknown ids match nothing).
    pub applied: usize,
}

/// Bookmark service.
pub struct BookmarkService<'a> {
    bookmarks: BookmarkRepository<'a>,
    strict_reorder: bool,
}

impl<'a> BookmarkService<'a> {
    /// Create a new bookmark service.
    ///
    /// With `strict_reorder`, a reorder must name every owned bookmark
    /// exactly once.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool, strict_reorder: bool) -> Self {
        Self {
            bookmarks: BookmarkRepository::new(pool),
            strict_reorder,
        }
    }

    /// All of the owner's bookmarks in display order.
    ///
    /// # Errors
    ///
    /// Returns `BookmarkError::Repository` if the store is unavailable.
    pub async fn list(&self, owner: AccountId) -> Result<Vec<Bookmark>, BookmarkError> {
        let mut bookmarks = self.bookmarks.list_for_owner(owner).await?;
        sort_for_display(&mut bookmarks);
        Ok(bookmarks)
    }

    /// Create a bookmark at the top of the owner's unpinned tier.
    ///
    /// # Errors
    ///
    /// Returns `BookmarkError::Validation` if title or url is empty.
    pub async fn create(
        &self,
        owner: AccountId,
        input: NewBookmark,
    ) -> Result<Bookmark, BookmarkError> {
        if input.title.is_empty() {
            return Err(BookmarkError::Validation("title is required".to_string()));
        }
        if input.url.is_empty() {
            return Err(BookmarkError::Validation("url is required".to_string()));
        }

        let note = input.note.unwrap_or_default();
        let bookmark = self
            .bookmarks
            .create(owner, &input.title, &input.url, &note)
            .await?;

        tracing::debug!(
            account_id = %owner,
            bookmark_id = %bookmark.id,
            order = bookmark.order,
            "bookmark created"
        );
        Ok(bookmark)
    }

    /// Apply a partial edit.
    ///
    /// Empty title or url leaves the stored value; the note is always
    /// overwritten (absent means empty).
    ///
    /// # Errors
    ///
    /// Returns `BookmarkError::NotFound` if the owner has no such bookmark.
    pub async fn update(
        &self,
        owner: AccountId,
        id: BookmarkId,
        patch: BookmarkPatch,
    ) -> Result<Bookmark, BookmarkError> {
        let changes = patch.into_changes();
        self.bookmarks
            .update(owner, id, &changes)
            .await?
            .ok_or(BookmarkError::NotFound)
    }

    /// Delete a bookmark. Other bookmarks keep their order values.
    ///
    /// # Errors
    ///
    /// Returns `BookmarkError::NotFound` if the owner has no such bookmark.
    pub async fn delete(&self, owner: AccountId, id: BookmarkId) -> Result<(), BookmarkError> {
        if self.bookmarks.delete(owner, id).await? {
            tracing::debug!(account_id = %owner, bookmark_id = %id, "bookmark deleted");
            Ok(())
        } else {
            Err(BookmarkError::NotFound)
        }
    }

    /// Flip the pinned flag. The order value is untouched.
    ///
    /// # Errors
    ///
    /// Returns `BookmarkError::NotFound` if the owner has no such bookmark.
    pub async fn toggle_pin(
        &self,
        owner: AccountId,
        id: BookmarkId,
    ) -> Result<Bookmark, BookmarkError> {
        self.bookmarks
            .toggle_pin(owner, id)
            .await?
            .ok_or(BookmarkError::NotFound)
    }

    /// Rewrite order values from an explicit id sequence.
    ///
    /// Each id gets its 1-based position. Updates are independent
    /// single-row writes; ids the owner does not have are skipped silently
    /// unless strict mode is on.
    ///
    /// # Errors
    ///
    /// Returns `BookmarkError::InvalidOrder` in strict mode when the list is
    /// not exactly the owner's id set. Nothing is written in that case.
    pub async fn reorder(
        &self,
        owner: AccountId,
        ids: &[BookmarkId],
    ) -> Result<ReorderSummary, BookmarkError> {
        let plan = ReorderPlan::new(ids);

        if self.strict_reorder {
            let owned = self.bookmarks.list_ids_for_owner(owner).await?;
            plan.check_complete(&owned)?;
        }

        let mut applied = 0;
        for &(id, order) in plan.assignments() {
            if self.bookmarks.set_order(owner, id, order).await? {
                applied += 1;
            }
        }

        let summary = ReorderSummary {
            requested: plan.len(),
            applied,
        };
        if summary.applied < summary.requested {
            tracing::debug!(
                account_id = %owner,
                requested = summary.requested,
                applied = summary.applied,
                "reorder skipped ids the account does not own"
            );
        }
        Ok(summary)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::db::{AccountRepository, create_memory_pool};
    use pinmark_core::Username;

    async fn setup() -> (SqlitePool, AccountId, AccountId) {
        let pool = create_memory_pool().await.unwrap();
        let accounts = AccountRepository::new(&pool);
        let alice = accounts
            .create(&Username::parse("alice").unwrap(), "h")
            .await
            .unwrap();
        let bob = accounts
            .create(&Username::parse("bob").unwrap(), "h")
            .await
            .unwrap();
        (pool, alice.id, bob.id)
    }

    fn new(title: &str) -> NewBookmark {
        NewBookmark {
            title: title.to_string(),
            url: format!("https://{title}.example"),
            note: None,
        }
    }

    fn titles(bookmarks: &[Bookmark]) -> Vec<&str> {
        bookmarks.iter().map(|b| b.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_newest_listed_first() {
        let (pool, alice, _) = setup().await;
        let service = BookmarkService::new(&pool, false);

        service.create(alice, new("b1")).await.unwrap();
        service.create(alice, new("b2")).await.unwrap();

        let list = service.list(alice).await.unwrap();
        assert_eq!(titles(&list), vec!["b2", "b1"]);
    }

    #[tokio::test]
    async fn test_pinning_older_moves_it_ahead() {
        let (pool, alice, _) = setup().await;
        let service = BookmarkService::new(&pool, false);

        let b1 = service.create(alice, new("b1")).await.unwrap();
        service.create(alice, new("b2")).await.unwrap();

        let pinned = service.toggle_pin(alice, b1.id).await.unwrap();
        assert!(pinned.pinned);
        assert_eq!(pinned.order, b1.order);

        let list = service.list(alice).await.unwrap();
        assert_eq!(titles(&list), vec!["b1", "b2"]);

        let unpinned = service.toggle_pin(alice, b1.id).await.unwrap();
        assert!(!unpinned.pinned);
        assert_eq!(titles(&service.list(alice).await.unwrap()), vec!["b2", "b1"]);
    }

    #[tokio::test]
    async fn test_create_requires_title_and_url() {
        let (pool, alice, _) = setup().await;
        let service = BookmarkService::new(&pool, false);

        let mut input = new("x");
        input.title = String::new();
        assert!(matches!(
            service.create(alice, input).await.unwrap_err(),
            BookmarkError::Validation(_)
        ));

        let mut input = new("x");
        input.url = String::new();
        assert!(matches!(
            service.create(alice, input).await.unwrap_err(),
            BookmarkError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_create_defaults_note() {
        let (pool, alice, _) = setup().await;
        let service = BookmarkService::new(&pool, false);

        let created = service.create(alice, new("x")).await.unwrap();
        assert_eq!(created.note, "");
        assert!(!created.pinned);
        assert_eq!(created.order, 1);
    }

    #[tokio::test]
    async fn test_reorder_assigns_positions() {
        let (pool, alice, _) = setup().await;
        let service = BookmarkService::new(&pool, false);

        let b1 = service.create(alice, new("b1")).await.unwrap();
        let b2 = service.create(alice, new("b2")).await.unwrap();
        let b3 = service.create(alice, new("b3")).await.unwrap();

        let summary = service.reorder(alice, &[b3.id, b1.id, b2.id]).await.unwrap();
        assert_eq!(summary, ReorderSummary { requested: 3, applied: 3 });

        let list = service.list(alice).await.unwrap();
        assert_eq!(titles(&list), vec!["b2", "b1", "b3"]);
        let orders: Vec<(BookmarkId, i64)> = list.iter().map(|b| (b.id, b.order)).collect();
        assert_eq!(orders, vec![(b2.id, 3), (b1.id, 2), (b3.id, 1)]);
    }

    #[tokio::test]
    async fn test_reorder_with_foreign_id_succeeds_and_skips_it() {
        let (pool, alice, bob) = setup().await;
        let service = BookmarkService::new(&pool, false);

        let mine = service.create(alice, new("mine")).await.unwrap();
        let theirs = service.create(bob, new("theirs")).await.unwrap();

        let summary = service.reorder(alice, &[theirs.id, mine.id]).await.unwrap();
        assert_eq!(summary, ReorderSummary { requested: 2, applied: 1 });

        let bob_list = service.list(bob).await.unwrap();
        assert_eq!(bob_list[0].order, theirs.order);
        assert_eq!(bob_list[0].updated_at, theirs.updated_at);
    }

    #[tokio::test]
    async fn test_strict_reorder_rejects_partial_list() {
        let (pool, alice, _) = setup().await;
        let service = BookmarkService::new(&pool, true);

        let b1 = service.create(alice, new("b1")).await.unwrap();
        let b2 = service.create(alice, new("b2")).await.unwrap();

        let err = service.reorder(alice, &[b1.id]).await.unwrap_err();
        assert!(matches!(
            err,
            BookmarkError::InvalidOrder(ReorderError::Missing(id)) if id == b2.id
        ));

        // Nothing written.
        let list = service.list(alice).await.unwrap();
        assert_eq!(titles(&list), vec!["b2", "b1"]);

        assert!(service.reorder(alice, &[b2.id, b1.id]).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_field_policies() {
        let (pool, alice, _) = setup().await;
        let service = BookmarkService::new(&pool, false);

        let created = service
            .create(
                alice,
                NewBookmark {
                    title: "Rust".to_string(),
                    url: "https://rust-lang.org".to_string(),
                    note: Some("lang".to_string()),
                },
            )
            .await
            .unwrap();

        let patch = BookmarkPatch {
            title: Some(String::new()),
            url: Some("https://www.rust-lang.org".to_string()),
            note: Some(String::new()),
        };
        let updated = service.update(alice, created.id, patch).await.unwrap();

        assert_eq!(updated.title, "Rust");
        assert_eq!(updated.url, "https://www.rust-lang.org");
        assert_eq!(updated.note, "");
        assert_eq!(updated.order, created.order);
    }

    #[tokio::test]
    async fn test_non_owner_gets_not_found() {
        let (pool, alice, bob) = setup().await;
        let service = BookmarkService::new(&pool, false);

        let created = service.create(alice, new("private")).await.unwrap();

        assert!(matches!(
            service.delete(bob, created.id).await.unwrap_err(),
            BookmarkError::NotFound
        ));
        assert!(matches!(
            service
                .update(bob, created.id, BookmarkPatch::default())
                .await
                .unwrap_err(),
            BookmarkError::NotFound
        ));
        assert!(matches!(
            service.toggle_pin(bob, created.id).await.unwrap_err(),
            BookmarkError::NotFound
        ));

        let list = service.list(alice).await.unwrap();
        assert_eq!(list, vec![created]);
        assert!(service.list(bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_leaves_other_orders() {
        let (pool, alice, _) = setup().await;
        let service = BookmarkService::new(&pool, false);

        let b1 = service.create(alice, new("b1")).await.unwrap();
        let b2 = service.create(alice, new("b2")).await.unwrap();
        let b3 = service.create(alice, new("b3")).await.unwrap();

        service.delete(alice, b2.id).await.unwrap();
        let list = service.list(alice).await.unwrap();
        let orders: Vec<i64> = list.iter().map(|b| b.order).collect();
        assert_eq!(orders, vec![b3.order, b1.order]);

        assert!(matches!(
            service.delete(alice, b2.id).await.unwrap_err(),
            BookmarkError::NotFound
        ));
    }
}
