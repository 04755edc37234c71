//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! sl-cli migrate storefront
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string for storefront
//!   (falls back to `DATABASE_URL`)
//!
//! Migrations live in `crates/storefront/migrations/` and are embedded at
//! compile time.

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run storefront database migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the URL is missing, the database is
/// unreachable, or a migration fails.
pub async fn storefront() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = database_url(
        std::env::var("STOREFRONT_DATABASE_URL").ok(),
        std::env::var("DATABASE_URL").ok(),
    )?;

    tracing::info!("Connecting to storefront database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Running storefront migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Storefront migrations complete!");
    Ok(())
}

fn database_url(
    primary: Option<String>,
    fallback: Option<String>,
) -> Result<SecretString, MigrationError> {
    primary
        .or(fallback)
        .map(SecretString::from)
        .ok_or(MigrationError::MissingEnvVar("STOREFRONT_DATABASE_URL"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_database_url_prefers_storefront_variable() {
        let url = database_url(
            Some("postgres://localhost/storefront".to_string()),
            Some("postgres://localhost/other".to_string()),
        )
        .unwrap();
        assert_eq!(url.expose_secret(), "postgres://localhost/storefront");

        let url = database_url(None, Some("postgres://localhost/other".to_string())).unwrap();
        assert_eq!(url.expose_secret(), "postgres://localhost/other");
    }

    #[test]
    fn test_database_url_missing() {
        assert!(matches!(
            database_url(None, None),
            Err(MigrationError::MissingEnvVar("STOREFRONT_DATABASE_URL"))
        ));
    }
}
