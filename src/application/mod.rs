pub mod services;

// Re-export key types for convenience
pub use services::{tariff_from_input, CheapestSummary, SortColumn, SortOrder, TariffCatalogService};
