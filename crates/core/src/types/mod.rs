//! Core types for Pinmark.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod patch;
pub mod username;

pub use id::*;
pub use patch::{BookmarkChanges, BookmarkPatch, FieldPolicy};
pub use username::{Username, UsernameError};
