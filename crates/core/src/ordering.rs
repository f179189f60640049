//! Bookmark ordering rules.
//!
//! Every bookmark carries an integer `order`. Listings show pinned bookmarks
//! first, then sort each tier by `order` descending, with the id descending as
//! the final tie-break. Only relative values matter: gaps and absolute
//! magnitudes are meaningless.
//!
//! - Insert: a new bookmark gets the owner's maximum order plus one (1 when
//!   the owner has none), so it lands at the top of the unpinned tier without
//!   touching any other row. The store computes this inside its `INSERT`.
//! - Reorder: the client sends ids in the sequence it wants and each id gets its
//!   1-based position as its new `order`.
//! - Pin: toggling a pin never changes `order`.

use std::cmp::Reverse;
use std::collections::HashSet;

use thiserror::Error;

use crate::types::BookmarkId;

/// Sort key for listings. Larger keys are shown first.
///
/// Field order matters: the derived `Ord` compares `pinned`, then `order`,
/// then `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DisplayKey {
    pub pinned: bool,
    pub order: i64,
    pub id: BookmarkId,
}

/// Anything that can be placed in a bookmark listing.
pub trait Ranked {
    fn display_key(&self) -> DisplayKey;
}

/// Sort items into display order (pinned first, then order and id descending).
pub fn sort_for_display<T: Ranked>(items: &mut [T]) {
    items.sort_by_key(|item| Reverse(item.display_key()));
}

/// Errors raised by strict reorder validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReorderError {
    #[error("bookmark {0} appears more than once")]
    Duplicate(BookmarkId),
    #[error("bookmark {0} does not exist")]
    Unknown(BookmarkId),
    #[error("bookmark {0} is missing from the new order")]
    Missing(BookmarkId),
}

/// New order values for an explicit client reorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderPlan {
    assignments: Vec<(BookmarkId, i64)>,
}

impl ReorderPlan {
    /// Assign `position + 1` to each id, in sequence order.
    ///
    /// Duplicates are kept as-is; applying the plan in order means the last
    /// position wins for a repeated id.
    #[must_use]
    pub fn new(ids: &[BookmarkId]) -> Self {
        let assignments = (1_i64..)
            .zip(ids.iter().copied())
            .map(|(position, id)| (id, position))
            .collect();
        Self { assignments }
    }

    /// `(id, order)` pairs in the order they should be written.
    #[must_use]
    pub fn assignments(&self) -> &[(BookmarkId, i64)] {
        &self.assignments
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Check that the plan covers exactly `owned`, each id once.
    ///
    /// # Errors
    ///
    /// Returns the first foreign, repeated, or omitted id found.
    pub fn check_complete(&self, owned: &[BookmarkId]) -> Result<(), ReorderError> {
        let owned_set: HashSet<BookmarkId> = owned.iter().copied().collect();
        let mut seen = HashSet::with_capacity(self.assignments.len());

        for &(id, _) in &self.assignments {
            if !owned_set.contains(&id) {
                return Err(ReorderError::Unknown(id));
            }
            if !seen.insert(id) {
                return Err(ReorderError::Duplicate(id));
            }
        }

        match owned.iter().find(|id| !seen.contains(id)) {
            Some(&missing) => Err(ReorderError::Missing(missing)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Item {
        id: i64,
        order: i64,
        pinned: bool,
    }

    impl Ranked for Item {
        fn display_key(&self) -> DisplayKey {
            DisplayKey {
                pinned: self.pinned,
                order: self.order,
                id: BookmarkId::new(self.id),
            }
        }
    }

    fn ids(items: &[Item]) -> Vec<i64> {
        items.iter().map(|i| i.id).collect()
    }

    #[test]
    fn test_newer_bookmark_listed_first() {
        let mut items = vec![
            Item { id: 1, order: 1, pinned: false },
            Item { id: 2, order: 2, pinned: false },
        ];
        sort_for_display(&mut items);
        assert_eq!(ids(&items), vec![2, 1]);
    }

    #[test]
    fn test_pinned_tier_beats_order() {
        let mut items = vec![
            Item { id: 1, order: 1, pinned: true },
            Item { id: 2, order: 50, pinned: false },
            Item { id: 3, order: 2, pinned: true },
        ];
        sort_for_display(&mut items);
        assert_eq!(ids(&items), vec![3, 1, 2]);
    }

    #[test]
    fn test_id_breaks_ties() {
        let mut items = vec![
            Item { id: 4, order: 1, pinned: false },
            Item { id: 9, order: 1, pinned: false },
            Item { id: 6, order: 1, pinned: false },
        ];
        sort_for_display(&mut items);
        assert_eq!(ids(&items), vec![9, 6, 4]);
    }

    #[test]
    fn test_reorder_assigns_one_based_positions() {
        let plan = ReorderPlan::new(&[BookmarkId::new(3), BookmarkId::new(1), BookmarkId::new(2)]);
        assert_eq!(
            plan.assignments(),
            &[
                (BookmarkId::new(3), 1),
                (BookmarkId::new(1), 2),
                (BookmarkId::new(2), 3),
            ]
        );
    }

    #[test]
    fn test_reorder_then_list_is_reversed_submission() {
        let plan = ReorderPlan::new(&[BookmarkId::new(3), BookmarkId::new(1), BookmarkId::new(2)]);
        let mut items: Vec<Item> = plan
            .assignments()
            .iter()
            .map(|&(id, order)| Item { id: id.as_i64(), order, pinned: false })
            .collect();
        sort_for_display(&mut items);
        assert_eq!(ids(&items), vec![2, 1, 3]);
    }

    #[test]
    fn test_empty_plan() {
        let plan = ReorderPlan::new(&[]);
        assert!(plan.is_empty());
        assert_eq!(plan.len(), 0);
        assert!(plan.check_complete(&[]).is_ok());
    }

    #[test]
    fn test_check_complete_accepts_permutation() {
        let owned = [BookmarkId::new(1), BookmarkId::new(2), BookmarkId::new(3)];
        let plan = ReorderPlan::new(&[BookmarkId::new(2), BookmarkId::new(3), BookmarkId::new(1)]);
        assert!(plan.check_complete(&owned).is_ok());
    }

    #[test]
    fn test_check_complete_rejects_duplicate() {
        let owned = [BookmarkId::new(1), BookmarkId::new(2)];
        let plan = ReorderPlan::new(&[BookmarkId::new(1), BookmarkId::new(1), BookmarkId::new(2)]);
        assert_eq!(
            plan.check_complete(&owned),
            Err(ReorderError::Duplicate(BookmarkId::new(1)))
        );
    }

    #[test]
    fn test_check_complete_rejects_foreign_id() {
        let owned = [BookmarkId::new(1)];
        let plan = ReorderPlan::new(&[BookmarkId::new(1), BookmarkId::new(99)]);
        assert_eq!(
            plan.check_complete(&owned),
            Err(ReorderError::Unknown(BookmarkId::new(99)))
        );
    }

    #[test]
    fn test_check_complete_rejects_partial_list() {
        let owned = [BookmarkId::new(1), BookmarkId::new(2)];
        let plan = ReorderPlan::new(&[BookmarkId::new(2)]);
        assert_eq!(
            plan.check_complete(&owned),
            Err(ReorderError::Missing(BookmarkId::new(1)))
        );
    }
}
