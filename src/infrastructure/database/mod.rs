pub mod entities;
pub mod migrator;
pub mod repositories;

pub use repositories::SeaOrmTariffRepository;

use std::path::Path;

use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use migrator::Migrator;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://./railway.db?mode=rwc")
    pub url: String,
}

impl DatabaseConfig {
    /// Create config for a SQLite file, created on first use
    pub fn sqlite(path: impl AsRef<Path>) -> Self {
        Self {
            url: format!("sqlite://{}?mode=rwc", path.as_ref().display()),
        }
    }
}

/// Initialize database connection
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, sea_orm::DbErr> {
    info!("Connecting to database: {}", config.url);
    let db = Database::connect(&config.url).await?;
    info!("Database connected successfully");
    Ok(db)
}

/// Connect and bring the schema up to date.
pub async fn connect_and_migrate(
    config: &DatabaseConfig,
) -> Result<DatabaseConnection, sea_orm::DbErr> {
    let db = init_database(config).await?;
    info!("Running database migrations...");
    Migrator::up(&db, None).await?;
    info!("Migrations completed");
    Ok(db)
}
