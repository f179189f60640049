//! Database migration command.
//!
//! Applies the migrations embedded in `pinmark-server`
//! (`crates/server/migrations/`). Already-applied migrations are skipped.

use pinmark_server::db::{self, RepositoryError};

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the database cannot be reached or a migration fails.
pub async fn run() -> Result<(), RepositoryError> {
    let pool = super::connect().await?;

    tracing::info!("Running migrations...");
    db::run_migrations(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
