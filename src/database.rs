use std::str::FromStr;

use sqlx::migrate::MigrateError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
pub use sqlx::Error as DbError;
pub use sqlx::SqlitePool as Pool;

use crate::configuration::Settings;

/// Build the SQLite connection pool, creating the database file if needed
pub async fn init_connection_pool(settings: &Settings) -> Result<Pool, DbError> {
    let options = SqliteConnectOptions::from_str(&settings.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(settings.database_max_connections)
        .connect_with(options)
        .await
}

/// Bring the schema up to date
pub async fn run_migrations(db: &Pool) -> Result<(), MigrateError> {
    sqlx::migrate!("./migrations").run(db).await
}
