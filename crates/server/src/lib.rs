//! Pinmark server library.
//!
//! The bookmark REST API as a library, so the binary, the CLI and the
//! integration tests share one router and one store layer.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::app;
pub use state::AppState;
