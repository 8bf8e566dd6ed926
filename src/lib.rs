//! # Railway Tariffs
//!
//! Catalogue of railway tariffs (direction, base price, discount rule) with
//! cheapest-direction queries.
//!
//! ## Architecture
//!
//! - **domain**: `Tariff`, discount rules, the `Station` collection and the
//!   `TariffRepository` contract
//! - **infrastructure**: in-memory and SeaORM/SQLite repositories
//! - **application**: catalogue service (sorting, import/export, seeding)
//! - **support**: flat-file tariff format
//! - **bootstrap**: tracing setup and one-time backend selection

pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;
pub mod support;

pub use config::{default_config_path, AppConfig};

// Re-export the repository types for easy access
pub use domain::{DomainError, DomainResult, Tariff, TariffRepository};
pub use infrastructure::{InMemoryTariffRepository, SeaOrmTariffRepository};

pub use application::TariffCatalogService;
pub use bootstrap::{select_repository, BackendKind, SelectedBackend};
