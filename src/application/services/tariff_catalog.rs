//! Catalogue service: the operations the front end performs on tariffs

use std::cmp::Ordering;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{
    DiscountStrategy, DomainError, DomainResult, Station, Tariff, TariffRepository,
};
use crate::support::tariff_file::{self, ImportReport};

/// Column the tariff list can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    #[default]
    Direction,
    BaseCost,
    FinalCost,
    /// Percent for percentage discounts, 0 otherwise
    Discount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Result of the "cheapest direction" query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheapestSummary {
    Single(String),
    Tied(Vec<String>),
}

impl CheapestSummary {
    fn from_directions(mut directions: Vec<String>) -> DomainResult<Self> {
        match directions.len() {
            0 => Err(DomainError::EmptyCollection),
            1 => Ok(Self::Single(directions.remove(0))),
            _ => Ok(Self::Tied(directions)),
        }
    }

    pub fn directions(&self) -> Vec<&str> {
        match self {
            Self::Single(d) => vec![d.as_str()],
            Self::Tied(ds) => ds.iter().map(String::as_str).collect(),
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Single(d) => format!("Cheapest direction:\n{}", d),
            Self::Tied(ds) => format!(
                "Cheapest directions ({} in total):\n{}",
                ds.len(),
                ds.join("\n")
            ),
        }
    }
}

/// Accepted range for a base cost entered by a user.
pub const MIN_BASE_COST: f64 = 1.0;
pub const MAX_BASE_COST: f64 = 10_000_000.0;

/// Build a tariff from user input.
///
/// Stricter than `Tariff::new`: the direction is trimmed and must not be
/// blank, and the base cost must lie in `MIN_BASE_COST..=MAX_BASE_COST`.
pub fn tariff_from_input(
    direction: &str,
    base_cost: f64,
    discount: Option<i32>,
) -> DomainResult<Tariff> {
    let direction = direction.trim();
    if direction.is_empty() {
        return Err(DomainError::invalid("direction must not be empty"));
    }
    if !(MIN_BASE_COST..=MAX_BASE_COST).contains(&base_cost) {
        return Err(DomainError::invalid(format!(
            "base cost must be between {} and {}, got {}",
            MIN_BASE_COST, MAX_BASE_COST, base_cost
        )));
    }
    let strategy = match discount {
        Some(percent) => DiscountStrategy::percentage(percent)?,
        None => DiscountStrategy::NoDiscount,
    };
    Tariff::new(direction, base_cost, strategy)
}

/// Sample catalogue used when starting with no data.
pub fn sample_tariffs() -> DomainResult<Vec<Tariff>> {
    Ok(vec![
        Tariff::without_discount("Москва", 5000.0)?,
        Tariff::with_percent("Санкт-Петербург", 3000.0, 10)?,
        Tariff::with_percent("Казань", 2000.0, 5)?,
    ])
}

/// Service for catalogue operations over a single repository
pub struct TariffCatalogService {
    repository: Arc<dyn TariffRepository>,
}

impl TariffCatalogService {
    pub fn new(repository: Arc<dyn TariffRepository>) -> Self {
        Self { repository }
    }

    /// All tariffs, optionally sorted. Sorting is stable, so equal keys
    /// keep storage order.
    pub async fn list(&self, sort: Option<(SortColumn, SortOrder)>) -> DomainResult<Vec<Tariff>> {
        let mut tariffs = self.repository.get_all_tariffs().await?;
        if let Some((column, order)) = sort {
            sort_tariffs(&mut tariffs, column, order);
        }
        Ok(tariffs)
    }

    pub async fn add(&self, tariff: Tariff) -> DomainResult<()> {
        let direction = tariff.direction().to_string();
        self.repository.add_tariff(tariff).await?;
        info!("Tariff added: {}", direction);
        Ok(())
    }

    pub async fn remove(&self, direction: &str) -> DomainResult<()> {
        self.repository.remove_tariff(direction).await
    }

    pub async fn update(&self, old_direction: &str, tariff: Tariff) -> DomainResult<()> {
        self.repository.update_tariff(old_direction, tariff).await
    }

    pub async fn clear(&self) -> DomainResult<()> {
        self.repository.clear().await
    }

    pub async fn cheapest(&self) -> DomainResult<CheapestSummary> {
        let directions = self.repository.find_min_cost_directions().await?;
        CheapestSummary::from_directions(directions)
    }

    /// Add the sample tariffs when the catalogue is empty.
    ///
    /// Returns whether anything was added.
    pub async fn seed_sample_data(&self) -> DomainResult<bool> {
        if !self.repository.get_all_tariffs().await?.is_empty() {
            return Ok(false);
        }
        for tariff in sample_tariffs()? {
            self.repository.add_tariff(tariff).await?;
        }
        info!("Sample tariffs added");
        Ok(true)
    }

    pub async fn export_to_file(&self, path: &Path) -> DomainResult<usize> {
        let tariffs = self.repository.get_all_tariffs().await?;
        tariff_file::save_to_file(&tariffs, path).await?;
        Ok(tariffs.len())
    }

    /// Replace the catalogue with the contents of a flat file.
    ///
    /// The file is parsed completely before the repository is touched, so
    /// a missing or malformed file leaves the catalogue as it was.
    pub async fn import_from_file(&self, path: &Path) -> DomainResult<ImportReport> {
        let mut scratch = Station::new();
        let mut report = tariff_file::load_from_file(&mut scratch, path).await?;

        self.repository.clear().await?;
        for tariff in scratch.tariffs() {
            match self.repository.add_tariff(tariff.clone()).await {
                Ok(()) => {}
                Err(DomainError::DuplicateDirection(direction)) => {
                    warn!("Import: direction '{}' already present, skipped", direction);
                    report.imported -= 1;
                    report.skipped_duplicates += 1;
                }
                Err(e) => return Err(e),
            }
        }

        info!("Imported {} tariffs from {}", report.imported, path.display());
        Ok(report)
    }
}

pub fn sort_tariffs(tariffs: &mut [Tariff], column: SortColumn, order: SortOrder) {
    let compare = |a: &Tariff, b: &Tariff| -> Ordering {
        match column {
            SortColumn::Direction => a
                .direction()
                .to_lowercase()
                .cmp(&b.direction().to_lowercase())
                .then_with(|| a.direction().cmp(b.direction())),
            SortColumn::BaseCost => a.base_cost().total_cmp(&b.base_cost()),
            SortColumn::FinalCost => a.final_cost().total_cmp(&b.final_cost()),
            SortColumn::Discount => a
                .discount_percent_for_sorting()
                .cmp(&b.discount_percent_for_sorting()),
        }
    };

    match order {
        SortOrder::Ascending => tariffs.sort_by(compare),
        SortOrder::Descending => tariffs.sort_by(|a, b| compare(b, a)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::InMemoryTariffRepository;

    fn service() -> TariffCatalogService {
        TariffCatalogService::new(Arc::new(InMemoryTariffRepository::new()))
    }

    fn directions(tariffs: &[Tariff]) -> Vec<&str> {
        tariffs.iter().map(|t| t.direction()).collect()
    }

    #[tokio::test]
    async fn test_seed_only_when_empty() {
        let svc = service();
        assert!(svc.seed_sample_data().await.unwrap());
        assert!(!svc.seed_sample_data().await.unwrap());
        assert_eq!(svc.list(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_list_sorted() {
        let svc = service();
        svc.seed_sample_data().await.unwrap();

        let by_final = svc
            .list(Some((SortColumn::FinalCost, SortOrder::Ascending)))
            .await
            .unwrap();
        assert_eq!(directions(&by_final), ["Казань", "Санкт-Петербург", "Москва"]);

        let by_discount = svc
            .list(Some((SortColumn::Discount, SortOrder::Descending)))
            .await
            .unwrap();
        assert_eq!(directions(&by_discount), ["Санкт-Петербург", "Казань", "Москва"]);

        let by_name = svc
            .list(Some((SortColumn::Direction, SortOrder::Ascending)))
            .await
            .unwrap();
        assert_eq!(directions(&by_name), ["Казань", "Москва", "Санкт-Петербург"]);
    }

    #[tokio::test]
    async fn test_cheapest_summary() {
        let svc = service();
        svc.seed_sample_data().await.unwrap();
        let summary = svc.cheapest().await.unwrap();
        assert_eq!(summary, CheapestSummary::Single("Казань".into()));
        assert_eq!(summary.message(), "Cheapest direction:\nКазань");

        svc.add(Tariff::without_discount("Тула", 1900.0).unwrap())
            .await
            .unwrap();
        let summary = svc.cheapest().await.unwrap();
        assert_eq!(summary.directions(), ["Казань", "Тула"]);
        assert!(summary.message().starts_with("Cheapest directions (2 in total)"));
    }

    #[tokio::test]
    async fn test_cheapest_on_empty_catalogue() {
        let svc = service();
        assert!(matches!(svc.cheapest().await, Err(DomainError::EmptyCollection)));
    }

    #[tokio::test]
    async fn test_export_import_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tariffs.txt");

        let svc = service();
        svc.seed_sample_data().await.unwrap();
        assert_eq!(svc.export_to_file(&path).await.unwrap(), 3);

        let other = service();
        other
            .add(Tariff::without_discount("Старое", 1.0).unwrap())
            .await
            .unwrap();
        let report = other.import_from_file(&path).await.unwrap();
        assert_eq!(report.imported, 3);
        assert_eq!(
            other.list(None).await.unwrap(),
            svc.list(None).await.unwrap()
        );
    }

    type Row = (String, f64, &'static str, Option<u8>);

    fn rows_as_set(tariffs: &[Tariff]) -> Vec<Row> {
        let mut rows: Vec<Row> = tariffs
            .iter()
            .map(|t| {
                let s = t.strategy();
                (t.direction().to_string(), t.base_cost(), s.tag(), s.percent())
            })
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows
    }

    #[tokio::test]
    async fn test_import_ignores_line_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tariffs.txt");

        let svc = service();
        svc.seed_sample_data().await.unwrap();
        svc.add(Tariff::with_percent("Тверь", 1234.5, 100).unwrap())
            .await
            .unwrap();
        svc.export_to_file(&path).await.unwrap();

        let text = tokio::fs::read_to_string(&path).await.unwrap();
        let reversed: Vec<&str> = text.lines().rev().collect();
        let reversed_path = dir.path().join("reversed.txt");
        tokio::fs::write(&reversed_path, reversed.join("\n")).await.unwrap();

        let other = service();
        let report = other.import_from_file(&reversed_path).await.unwrap();
        assert_eq!(report.imported, 4);

        let imported = other.list(None).await.unwrap();
        assert_eq!(directions(&imported)[0], "Тверь");
        assert_eq!(
            rows_as_set(&imported),
            rows_as_set(&svc.list(None).await.unwrap())
        );
    }

    #[test]
    fn test_input_rejects_blank_direction() {
        for blank in ["", "   ", "\t"] {
            assert!(matches!(
                tariff_from_input(blank, 100.0, None),
                Err(DomainError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_input_base_cost_range() {
        assert!(tariff_from_input("Тула", MIN_BASE_COST, None).is_ok());
        assert!(tariff_from_input("Тула", MAX_BASE_COST, Some(10)).is_ok());
        for cost in [0.5, MAX_BASE_COST + 1.0, f64::NAN] {
            assert!(matches!(
                tariff_from_input("Тула", cost, None),
                Err(DomainError::InvalidArgument(_))
            ));
        }
        assert!(tariff_from_input("Тула", 100.0, Some(101)).is_err());
    }

    #[tokio::test]
    async fn test_input_direction_is_stored_trimmed() {
        let svc = service();
        let t = tariff_from_input(" Москва ", 100.0, Some(0)).unwrap();
        assert_eq!(t.direction(), "Москва");
        assert_eq!(t.strategy(), DiscountStrategy::NoDiscount);
        svc.add(t).await.unwrap();

        let all = svc.list(None).await.unwrap();
        assert_eq!(directions(&all), ["Москва"]);
    }

    #[tokio::test]
    async fn test_failed_import_keeps_catalogue() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.txt");
        tokio::fs::write(&path, "Москва|дорого|NoDiscount|\n").await.unwrap();

        let svc = service();
        svc.seed_sample_data().await.unwrap();
        assert!(matches!(
            svc.import_from_file(&path).await,
            Err(DomainError::InvalidArgument(_))
        ));
        assert!(matches!(
            svc.import_from_file(&dir.path().join("missing.txt")).await,
            Err(DomainError::FileNotFound(_))
        ));
        assert_eq!(svc.list(None).await.unwrap().len(), 3);
    }
}
