use anyhow::Result;
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::time::Duration;
use tracing::info;

use crate::config::Config;

pub mod entity_store;
pub mod role_store;
pub mod user_store;

pub use entity_store::{Entity, EntityStore};
pub use role_store::RoleStore;
pub use user_store::UserStore;

pub type DbPool = Pool<Sqlite>;

/// Initialize the database connection pool
pub async fn init_db_pool(config: &Config) -> Result<DbPool> {
    connect(
        &config.database_url,
        config.max_pool_size,
        Duration::from_secs(config.acquire_timeout_secs),
    )
    .await
}

/// Open (creating if needed) the database at `database_url` and make sure the
/// schema exists.
pub async fn connect(database_url: &str, max_connections: u32, acquire_timeout: Duration) -> Result<DbPool> {
    // Create the database if it doesn't exist
    if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
        Sqlite::create_database(database_url).await?;
    }

    // Create connection pool; sqlx turns on foreign key enforcement per connection
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(database_url)
        .await?;

    setup_database(&pool).await?;

    info!("Database ready at {}", database_url);
    Ok(pool)
}

/// Set up the database schema
async fn setup_database(pool: &DbPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS roles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            login TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            first_name TEXT,
            last_name TEXT,
            birthday TEXT,
            role_id INTEGER REFERENCES roles(id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_role ON users(role_id);")
        .execute(pool)
        .await?;

    Ok(())
}
