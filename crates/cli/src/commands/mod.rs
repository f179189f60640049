//! CLI subcommands.

pub mod account;
pub mod migrate;

use pinmark_server::config::database_url_from_env;
use pinmark_server::db;
use sqlx::SqlitePool;

/// Connect to the configured database.
async fn connect() -> Result<SqlitePool, sqlx::Error> {
    let database_url = database_url_from_env();
    tracing::info!("Connecting to database...");
    db::create_pool(&database_url).await
}
