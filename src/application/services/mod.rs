//! Application services

mod tariff_catalog;

pub use tariff_catalog::{
    sample_tariffs, sort_tariffs, tariff_from_input, CheapestSummary, SortColumn, SortOrder,
    TariffCatalogService, MAX_BASE_COST, MIN_BASE_COST,
};
