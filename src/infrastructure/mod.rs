//! Infrastructure layer - storage backends

pub mod database;
pub mod storage;

pub use database::{connect_and_migrate, init_database, DatabaseConfig, SeaOrmTariffRepository};
pub use storage::InMemoryTariffRepository;
