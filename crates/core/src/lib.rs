//! Pinmark Core - Shared types library.
//!
//! This crate provides the types and rules shared by all Pinmark components:
//! - `server` - The bookmark REST API
//! - `cli` - Command-line tools for migrations and account management
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP. This keeps it lightweight and allows the ordering rules to
//! be tested without a store.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs and usernames, plus the bookmark patch
//! - [`ordering`] - Insert, reorder and display ordering for bookmark lists

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod ordering;
pub mod types;

pub use ordering::{DisplayKey, Ranked, ReorderError, ReorderPlan, sort_for_display};
pub use types::*;
