//! Embedded schema migrations applied at startup.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use crate::domain::ports::DocumentStoreError;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Apply pending migrations on a dedicated blocking connection.
///
/// # Errors
/// Returns [`DocumentStoreError::Connection`] when the database cannot be
/// reached and [`DocumentStoreError::Query`] when a migration fails.
pub async fn run_migrations(database_url: &str) -> Result<(), DocumentStoreError> {
    let url = database_url.to_owned();
    tokio::task::spawn_blocking(move || {
        let mut conn = PgConnection::establish(&url)
            .map_err(|err| DocumentStoreError::connection(err.to_string()))?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|err| DocumentStoreError::query(format!("migration: {err}")))?;
        info!(count = applied.len(), "database migrations applied");
        Ok(())
    })
    .await
    .map_err(|err| DocumentStoreError::query(format!("migration task failed: {err}")))?
}
