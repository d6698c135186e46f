use migration::{ Migrator, MigratorTrait };
use sea_orm::{ ConnectOptions, Database, DatabaseConnection };

use crate::error::Result;

pub mod entity;

mod favorite_repository;
pub use favorite_repository::{ FavoriteRepository, FavoriteStore };

/// Open the database and bring the schema up to date.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url.to_string());
    options.sqlx_logging(false);

    // Every pooled connection to an in-memory database would get its own copy
    if database_url.contains(":memory:") {
        options.max_connections(1).min_connections(1);
    }

    let db = Database::connect(options).await?;
    Migrator::up(&db, None).await?;

    tracing::info!("Database ready at {}", database_url);
    Ok(db)
}
