pub mod station;
pub mod tariff;

// Re-export commonly used types
pub use station::{normalize_direction, Station, MIN_COST_EPSILON};
pub use tariff::{DiscountPercent, DiscountStrategy, Tariff, TariffRepository};

pub use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
