//! Station: an ordered, direction-unique tariff collection

use std::collections::HashSet;

use crate::domain::tariff::{directions_match, DiscountStrategy, Tariff};
use crate::domain::{DomainError, DomainResult};

/// Two final costs closer than this are treated as tied by
/// [`Station::find_all_min_cost_directions`].
pub const MIN_COST_EPSILON: f64 = 0.01;

/// Key used for direction uniqueness: trimmed and case-folded.
pub fn normalize_direction(direction: &str) -> String {
    direction.trim().to_lowercase()
}

/// In-memory tariff collection.
///
/// Keeps tariffs in insertion order next to the set of their normalized
/// directions. Every mutation updates both, so the set always matches the
/// sequence.
#[derive(Debug, Default, Clone)]
pub struct Station {
    tariffs: Vec<Tariff>,
    used_directions: HashSet<String>,
}

impl Station {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_tariff(
        &mut self,
        direction: &str,
        base_cost: f64,
        strategy: DiscountStrategy,
    ) -> DomainResult<()> {
        let normalized = normalize_direction(direction);
        if self.used_directions.contains(&normalized) {
            return Err(DomainError::DuplicateDirection(direction.to_string()));
        }

        self.tariffs.push(Tariff::new(direction, base_cost, strategy)?);
        self.used_directions.insert(normalized);
        Ok(())
    }

    pub fn add_tariff_with_percent(
        &mut self,
        direction: &str,
        base_cost: f64,
        percent: i32,
    ) -> DomainResult<()> {
        self.add_tariff(direction, base_cost, DiscountStrategy::percentage(percent)?)
    }

    pub fn add_tariff_without_discount(&mut self, direction: &str, base_cost: f64) -> DomainResult<()> {
        self.add_tariff(direction, base_cost, DiscountStrategy::NoDiscount)
    }

    /// Append an already validated tariff.
    pub fn push(&mut self, tariff: Tariff) -> DomainResult<()> {
        self.add_tariff(tariff.direction(), tariff.base_cost(), tariff.strategy())
    }

    pub fn tariffs(&self) -> &[Tariff] {
        &self.tariffs
    }

    pub fn len(&self) -> usize {
        self.tariffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tariffs.is_empty()
    }

    pub fn contains_direction(&self, direction: &str) -> bool {
        self.used_directions.contains(&normalize_direction(direction))
    }

    /// Index of the first tariff whose direction equals `direction`
    /// ignoring case.
    pub fn position(&self, direction: &str) -> Option<usize> {
        self.tariffs
            .iter()
            .position(|t| directions_match(t.direction(), direction))
    }

    pub fn remove_at(&mut self, index: usize) -> DomainResult<Tariff> {
        self.check_index(index)?;
        let removed = self.tariffs.remove(index);
        self.used_directions
            .remove(&normalize_direction(removed.direction()));
        Ok(removed)
    }

    /// Rename the tariff at `index`.
    ///
    /// Returns `Ok(false)` without changing anything when the new direction
    /// belongs to a different tariff.
    pub fn change_direction(&mut self, index: usize, new_direction: &str) -> DomainResult<bool> {
        self.check_index(index)?;

        let old_normalized = normalize_direction(self.tariffs[index].direction());
        let new_normalized = normalize_direction(new_direction);

        if old_normalized == new_normalized {
            self.tariffs[index].set_direction(new_direction);
            return Ok(true);
        }

        if self.used_directions.contains(&new_normalized) {
            return Ok(false);
        }

        self.used_directions.remove(&old_normalized);
        self.tariffs[index].set_direction(new_direction);
        self.used_directions.insert(new_normalized);
        Ok(true)
    }

    /// Replace price and discount of the tariff at `index`.
    pub fn update_at(
        &mut self,
        index: usize,
        base_cost: f64,
        strategy: DiscountStrategy,
    ) -> DomainResult<()> {
        self.check_index(index)?;
        let tariff = &mut self.tariffs[index];
        tariff.set_base_cost(base_cost)?;
        tariff.set_strategy(Some(strategy));
        Ok(())
    }

    pub fn find_min_cost_direction(&self) -> DomainResult<String> {
        self.find_all_min_cost_directions()?
            .into_iter()
            .next()
            .ok_or(DomainError::EmptyCollection)
    }

    /// Directions whose final cost is within [`MIN_COST_EPSILON`] of the
    /// minimum, in insertion order.
    pub fn find_all_min_cost_directions(&self) -> DomainResult<Vec<String>> {
        let min_cost = self
            .tariffs
            .iter()
            .map(Tariff::final_cost)
            .min_by(f64::total_cmp)
            .ok_or(DomainError::EmptyCollection)?;

        Ok(self
            .tariffs
            .iter()
            .filter(|t| (t.final_cost() - min_cost).abs() < MIN_COST_EPSILON)
            .map(|t| t.direction().to_string())
            .collect())
    }

    pub fn clear(&mut self) {
        self.tariffs.clear();
        self.used_directions.clear();
    }

    fn check_index(&self, index: usize) -> DomainResult<()> {
        if index >= self.tariffs.len() {
            return Err(DomainError::IndexOutOfRange {
                index,
                len: self.tariffs.len(),
            });
        }
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────
