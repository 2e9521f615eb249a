//! # Database Store
//!
//! Database connection pool, schema migrations and repository implementations.

// region: --- Modules
pub mod models;
pub mod user_repository;
pub mod message_store;
// endregion: --- Modules

// region: --- Re-exports
pub use models::{MessageRow, User};
pub use user_repository::UserRepository;
pub use message_store::MessageStore;
// endregion: --- Re-exports

// region: --- Types and Functions
use sqlx::{SqlitePool, sqlite::{SqliteConnectOptions, SqlitePoolOptions}};

/// Type alias for SQLite connection pool.
pub type DbPool = SqlitePool;

/// Primary key of a user row. Doubles as the room key for chat fan-out.
pub type UserId = i64;

/// Create a new SQLite connection pool, creating the database file if needed.
pub async fn create_pool(database_url: &str) -> anyhow::Result<DbPool> {
    let options = database_url
        .parse::<SqliteConnectOptions>()?
        .create_if_missing(true);

    let pool = SqlitePool::connect_with(options).await?;

    Ok(pool)
}

/// Apply the embedded schema migrations.
pub async fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    sqlx::migrate!("../../../migrations").run(pool).await?;
    Ok(())
}

/// Single-connection in-memory database with the schema applied.
///
/// Every connection to `sqlite::memory:` opens its own database, so the pool is
/// capped at one connection.
pub async fn memory_pool() -> anyhow::Result<DbPool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}
// endregion: --- Types and Functions
