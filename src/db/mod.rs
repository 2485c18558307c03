pub mod pool;
pub mod schema;

pub use pool::create_pool;

use sqlx::SqlitePool;
use std::path::Path;

/// Database handle type (the pool is internally reference counted)
pub type Db = SqlitePool;

/// Open or create the SQLite database at the given path
///
/// Creates all required tables on first run.
pub async fn open_database(path: impl AsRef<Path>) -> Result<Db, sqlx::Error> {
    let path = path.as_ref();
    tracing::info!("Opening database at: {:?}", path);

    // Create parent directory if it doesn't exist
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                tracing::error!("Failed to create database directory: {}", e);
                sqlx::Error::Io(e)
            })?;
        }
    }

    let pool = create_pool(path).await?;
    init_schema(&pool).await?;

    tracing::info!("Database initialized successfully");

    Ok(pool)
}

/// Create tables if they don't exist
pub async fn init_schema(pool: &Db) -> Result<(), sqlx::Error> {
    for statement in schema::ALL {
        sqlx::query(*statement).execute(pool).await?;
    }
    Ok(())
}
