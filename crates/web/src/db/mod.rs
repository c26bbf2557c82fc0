//! Session storage database.
//!
//! # Database: `SQLite`
//!
//! The web client keeps no domain data of its own; the backend is the source
//! of truth. The only table is the tower-sessions record table, created on
//! startup by [`SqliteStore::migrate`] and swept of expired records by
//! [`spawn_expired_session_cleanup`].

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tokio::task::JoinHandle;
use tower_sessions::session_store::ExpiredDeletion;
use tower_sessions_sqlx_store::SqliteStore;

/// How often expired session records are deleted.
pub const SESSION_CLEANUP_PERIOD: Duration = Duration::from_secs(60 * 60);

/// Create a `SQLite` connection pool for the session store.
///
/// # Errors
///
/// Returns `sqlx::Error` if the database cannot be opened.
pub async fn create_pool(database_url: &SecretString) -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Create the session store and its table.
///
/// # Errors
///
/// Returns `sqlx::Error` if the session table cannot be created.
pub async fn create_session_store(pool: SqlitePool) -> Result<SqliteStore, sqlx::Error> {
    let store = SqliteStore::new(pool);
    store.migrate().await?;
    Ok(store)
}

/// Delete expired session records every `period` until the task is aborted.
#[must_use]
pub fn spawn_expired_session_cleanup(store: SqliteStore, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = store.continuously_delete_expired(period).await {
            tracing::error!(error = %e, "Expired session cleanup stopped");
        }
    })
}
