//! Flat-file tariff format
//!
//! One tariff per line:
//!
//! - `direction|baseCost|NoDiscount|`
//! - `direction|baseCost|PercentageDiscount|<percent>`
//!
//! The discount is identified by its type tag, never by its display label.

use std::path::Path;

use tracing::{debug, info};

use crate::domain::{DiscountStrategy, DomainError, DomainResult, Station, Tariff};

const FIELD_SEPARATOR: char = '|';
const MIN_FIELDS: usize = 3;

// ── Summary ────────────────────────────────────────────────────

/// Outcome of loading a file into a [`Station`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    /// Rows whose direction was already taken by an earlier row.
    pub skipped_duplicates: usize,
    /// Non-blank rows with fewer than three fields.
    pub skipped_short: usize,
}

// ── Encoding ───────────────────────────────────────────────────

/// Render one tariff as a line, without the trailing newline.
pub fn format_line(tariff: &Tariff) -> DomainResult<String> {
    let direction = tariff.direction();
    if direction.contains(FIELD_SEPARATOR) || direction.contains(['\n', '\r']) {
        return Err(DomainError::invalid(format!(
            "direction '{}' cannot be written to a flat file",
            direction
        )));
    }

    let strategy = tariff.strategy();
    let value = strategy.percent().map(|p| p.to_string()).unwrap_or_default();
    Ok(format!(
        "{}{sep}{}{sep}{}{sep}{}",
        direction,
        tariff.base_cost(),
        strategy.tag(),
        value,
        sep = FIELD_SEPARATOR
    ))
}

pub fn format_all(tariffs: &[Tariff]) -> DomainResult<String> {
    let mut out = String::new();
    for tariff in tariffs {
        out.push_str(&format_line(tariff)?);
        out.push('\n');
    }
    Ok(out)
}

// ── Decoding ───────────────────────────────────────────────────

/// Parse one line. Blank lines and lines with fewer than three fields
/// yield `None`.
///
/// A malformed base cost or an out-of-range percent is an error; an
/// unknown tag or an unparsable percent falls back to no discount.
pub fn parse_line(line: &str) -> DomainResult<Option<Tariff>> {
    if line.trim().is_empty() {
        return Ok(None);
    }

    let parts: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    if parts.len() < MIN_FIELDS {
        return Ok(None);
    }

    let direction = parts[0];
    let base_cost: f64 = parts[1].trim().parse().map_err(|_| {
        DomainError::invalid(format!("malformed base cost '{}' for '{}'", parts[1], direction))
    })?;
    let percent = parts
        .get(3)
        .and_then(|v| v.trim().parse::<i32>().ok());
    let strategy = DiscountStrategy::from_tag(parts[2].trim(), percent)?;

    Tariff::new(direction, base_cost, strategy).map(Some)
}

/// Replace the station's contents with the tariffs in `text`.
///
/// Rows whose direction duplicates an earlier row are skipped; any other
/// failure aborts the whole load.
pub fn load_into_station(station: &mut Station, text: &str) -> DomainResult<ImportReport> {
    station.clear();
    let mut report = ImportReport::default();

    for (number, line) in text.lines().enumerate() {
        let tariff = match parse_line(line) {
            Ok(Some(tariff)) => tariff,
            Ok(None) => {
                if !line.trim().is_empty() {
                    report.skipped_short += 1;
                }
                continue;
            }
            Err(DomainError::InvalidArgument(msg)) => {
                return Err(DomainError::InvalidArgument(format!("line {}: {}", number + 1, msg)));
            }
            Err(e) => return Err(e),
        };

        match station.push(tariff) {
            Ok(()) => report.imported += 1,
            Err(DomainError::DuplicateDirection(direction)) => {
                debug!(line = number + 1, %direction, "skipping duplicate direction");
                report.skipped_duplicates += 1;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(report)
}

// ── Files ──────────────────────────────────────────────────────

pub async fn save_to_file(tariffs: &[Tariff], path: &Path) -> DomainResult<()> {
    let text = format_all(tariffs)?;
    tokio::fs::write(path, text).await?;
    info!("Saved {} tariffs to {}", tariffs.len(), path.display());
    Ok(())
}

/// Fails with `FileNotFound` when `path` does not exist; the station is
/// left untouched in that case.
pub async fn load_from_file(station: &mut Station, path: &Path) -> DomainResult<ImportReport> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(DomainError::FileNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    let report = load_into_station(station, &text)?;
    info!(
        imported = report.imported,
        skipped_duplicates = report.skipped_duplicates,
        "Loaded tariffs from {}",
        path.display()
    );
    Ok(report)
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_no_discount_has_empty_value() {
        let t = Tariff::without_discount("Москва", 5000.0).unwrap();
        assert_eq!(format_line(&t).unwrap(), "Москва|5000|NoDiscount|");
    }

    #[test]
    fn format_percentage_discount() {
        let t = Tariff::with_percent("Казань", 2000.5, 5).unwrap();
        assert_eq!(format_line(&t).unwrap(), "Казань|2000.5|PercentageDiscount|5");
    }

    #[test]
    fn format_rejects_separator_in_direction() {
        let t = Tariff::without_discount("A|B", 10.0).unwrap();
        assert!(matches!(format_line(&t), Err(DomainError::InvalidArgument(_))));
    }

    #[test]
    fn parse_skips_blank_and_short_lines() {
        assert!(parse_line("").unwrap().is_none());
        assert!(parse_line("   ").unwrap().is_none());
        assert!(parse_line("Москва|5000").unwrap().is_none());
    }

    #[test]
    fn parse_three_field_line() {
        let t = parse_line("Москва|5000|NoDiscount").unwrap().unwrap();
        assert_eq!(t.direction(), "Москва");
        assert_eq!(t.base_cost(), 5000.0);
        assert_eq!(t.strategy(), DiscountStrategy::NoDiscount);
    }

    #[test]
    fn parse_strategy_fallbacks() {
        let zero = parse_line("A|10|PercentageDiscount|0").unwrap().unwrap();
        assert_eq!(zero.strategy(), DiscountStrategy::NoDiscount);

        let unknown = parse_line("A|10|Coupon|15").unwrap().unwrap();
        assert_eq!(unknown.strategy(), DiscountStrategy::NoDiscount);

        let garbage = parse_line("A|10|PercentageDiscount|abc").unwrap().unwrap();
        assert_eq!(garbage.strategy(), DiscountStrategy::NoDiscount);

        let ok = parse_line("A|10|PercentageDiscount|15").unwrap().unwrap();
        assert_eq!(ok.strategy().percent(), Some(15));
    }

    #[test]
    fn parse_rejects_malformed_numbers() {
        assert!(matches!(
            parse_line("A|cheap|NoDiscount|"),
            Err(DomainError::InvalidArgument(_))
        ));
        assert!(matches!(
            parse_line("A|10|PercentageDiscount|150"),
            Err(DomainError::InvalidArgument(_))
        ));
        assert!(matches!(
            parse_line("A|0|NoDiscount|"),
            Err(DomainError::InvalidArgument(_))
        ));
    }

    #[test]
    fn load_skips_duplicates_and_clears_first() {
        let mut station = Station::new();
        station.add_tariff_without_discount("Старое", 1.0).unwrap();

        let text = "Москва|5000|NoDiscount|\n\
                    \n\
                    короткая|строка\n\
                    Казань|2000|PercentageDiscount|5\n\
                    МОСКВА |100|NoDiscount|\n";
        let report = load_into_station(&mut station, text).unwrap();

        assert_eq!(
            report,
            ImportReport {
                imported: 2,
                skipped_duplicates: 1,
                skipped_short: 1,
            }
        );
        let directions: Vec<_> = station.tariffs().iter().map(|t| t.direction()).collect();
        assert_eq!(directions, ["Москва", "Казань"]);
    }

    #[test]
    fn load_fails_whole_file_on_bad_number() {
        let mut station = Station::new();
        let err = load_into_station(&mut station, "A|10|NoDiscount|\nB|x|NoDiscount|\n").unwrap_err();
        match err {
            DomainError::InvalidArgument(msg) => assert!(msg.starts_with("line 2:")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut station = Station::new();
        station.add_tariff_without_discount("Москва", 1.0).unwrap();

        let err = load_from_file(&mut station, &dir.path().join("missing.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::FileNotFound(_)));
        assert_eq!(station.len(), 1);
    }

    #[tokio::test]
    async fn save_then_load_reproduces_tariffs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tariffs.txt");

        let tariffs = vec![
            Tariff::without_discount("Москва", 5000.0).unwrap(),
            Tariff::with_percent("Санкт-Петербург", 3000.0, 10).unwrap(),
            Tariff::with_percent("Казань", 1999.99, 5).unwrap(),
        ];
        save_to_file(&tariffs, &path).await.unwrap();

        let mut station = Station::new();
        let report = load_from_file(&mut station, &path).await.unwrap();
        assert_eq!(report.imported, 3);
        assert_eq!(station.tariffs(), tariffs.as_slice());
    }

    #[test]
    fn reordered_lines_load_the_same_tariffs() {
        let tariffs = vec![
            Tariff::without_discount("Москва", 5000.0).unwrap(),
            Tariff::with_percent("Санкт-Петербург", 3000.0, 10).unwrap(),
            Tariff::with_percent("Казань", 1999.99, 5).unwrap(),
        ];
        let text = format_all(&tariffs).unwrap();
        let reversed: String = text.lines().rev().map(|l| format!("{l}\n")).collect();

        let mut station = Station::new();
        load_into_station(&mut station, &reversed).unwrap();

        let mut loaded = station.tariffs().to_vec();
        let mut expected = tariffs;
        loaded.sort_by(|a, b| a.direction().cmp(b.direction()));
        expected.sort_by(|a, b| a.direction().cmp(b.direction()));
        assert_eq!(loaded, expected);
        assert_eq!(station.tariffs()[0].direction(), "Казань");
    }
}
