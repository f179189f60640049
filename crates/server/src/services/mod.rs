//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Registration, login and session tokens
//! - `bookmarks` - Owner-scoped bookmark operations and ordering

pub mod auth;
pub mod bookmarks;

pub use auth::{AuthError, AuthService, LoginSession, TokenService, hash_password};
pub use bookmarks::{BookmarkError, BookmarkService, ReorderSummary};
