//! CLI subcommands.

pub mod migrate;
pub mod user;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// Errors shared by the commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Neither database variable is set.
    #[error("Missing environment variable: PVZ_DATABASE_URL (or DATABASE_URL)")]
    MissingDatabaseUrl,

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Account creation rejected.
    #[error(transparent)]
    Auth(#[from] pvz_server::auth::AuthError),
}

/// Connect using `PVZ_DATABASE_URL`, falling back to `DATABASE_URL`.
async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("PVZ_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingDatabaseUrl)?;

    tracing::info!("Connecting to database...");
    Ok(pvz_server::db::create_pool(&database_url, 2).await?)
}
