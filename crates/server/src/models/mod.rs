//! Domain models for the bookmark API.
//!
//! These types are validated domain objects, separate from the database row
//! types in [`crate::db`].

pub mod account;
pub mod bookmark;
pub mod session;

pub use account::Account;
pub use bookmark::{Bookmark, NewBookmark};
pub use session::CurrentAccount;
