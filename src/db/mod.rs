use anyhow::Result;
use sqlx::{
    Sqlite,
    migrate::MigrateDatabase,
    mysql::{MySqlConnectOptions, MySqlPoolOptions},
    sqlite::SqlitePoolOptions,
};
use std::{str::FromStr, sync::Arc, time::Duration};

use crate::config::DatabaseConfig;

pub mod user_store;

pub use user_store::{MySqlUserStore, SqliteUserStore, UserStore};

/// sqlx always bounds pool acquisition; this puts the bound far enough out that a request
/// queued behind busy connections waits for one instead of failing.
const UNBOUNDED_ACQUIRE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Open the configured database and wrap it in the matching user store
pub async fn connect(config: &DatabaseConfig, max_connections: u32) -> Result<Arc<dyn UserStore>> {
    match config.url.as_deref() {
        Some(url) if config.is_sqlite() => {
            tracing::info!("Using embedded SQLite database at {}", url);
            Ok(Arc::new(connect_sqlite(url, max_connections).await?))
        }
        _ => {
            if config.url.is_none() {
                if config.default_password {
                    tracing::warn!("MYSQL_PASSWORD is not set, falling back to the built-in default");
                }
                tracing::info!(
                    host = %config.host,
                    user = %config.user,
                    database = %config.name,
                    "Connecting to MySQL"
                );
            } else {
                tracing::info!("Connecting to MySQL using DATABASE_URL");
            }
            Ok(Arc::new(connect_mysql(config, max_connections).await?))
        }
    }
}

/// Initialize the MySQL connection pool
pub async fn connect_mysql(config: &DatabaseConfig, max_connections: u32) -> Result<MySqlUserStore> {
    let options = match config.url.as_deref() {
        Some(url) => MySqlConnectOptions::from_str(url)?,
        None => MySqlConnectOptions::new()
            .host(&config.host)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name),
    };

    let pool = MySqlPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(UNBOUNDED_ACQUIRE)
        .connect_with(options)
        .await?;

    Ok(MySqlUserStore::new(pool))
}

/// Initialize the SQLite connection pool, creating the database and table when missing
pub async fn connect_sqlite(database_url: &str, max_connections: u32) -> Result<SqliteUserStore> {
    // Create the database if it doesn't exist
    if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
        Sqlite::create_database(database_url).await?;
    }

    let mut options = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(UNBOUNDED_ACQUIRE);

    // An in-memory database lives only as long as its connection
    if database_url.contains(":memory:") {
        options = options.idle_timeout(None).max_lifetime(None);
    }

    let pool = options.connect(database_url).await?;

    setup_database(&pool).await?;

    Ok(SqliteUserStore::new(pool))
}

/// Set up the embedded database schema
async fn setup_database(pool: &sqlx::SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            designation TEXT,
            email TEXT,
            first_name TEXT,
            is_admin BOOLEAN,
            last_name TEXT,
            middle_name TEXT,
            phone_number TEXT,
            previous_exp TEXT
        );
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
