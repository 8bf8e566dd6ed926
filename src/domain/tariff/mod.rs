//! Tariff aggregate
//!
//! Contains the Tariff entity, its discount rules, and the repository contract.

pub mod model;
pub mod repository;

pub use model::{DiscountPercent, DiscountStrategy, Tariff};
pub use repository::{directions_match, TariffRepository};
