//! Database repository implementations

pub mod tariff_repository;

pub use tariff_repository::SeaOrmTariffRepository;
