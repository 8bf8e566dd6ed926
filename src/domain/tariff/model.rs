//! Tariff domain entity

use serde::Serialize;

use crate::domain::{DomainError, DomainResult};

/// Discount percentage, guaranteed to lie in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DiscountPercent(u8);

impl DiscountPercent {
    pub const MAX: u8 = 100;

    pub fn new(percent: i32) -> DomainResult<Self> {
        if !(0..=Self::MAX as i32).contains(&percent) {
            return Err(DomainError::invalid(format!(
                "discount must be between 0 and 100%, got {}",
                percent
            )));
        }
        Ok(Self(percent as u8))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for DiscountPercent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Rule turning a base price into the price the passenger pays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "type", content = "percent")]
pub enum DiscountStrategy {
    #[default]
    NoDiscount,
    #[serde(rename = "PercentageDiscount")]
    Percentage(DiscountPercent),
}

impl DiscountStrategy {
    pub const NO_DISCOUNT_TAG: &'static str = "NoDiscount";
    pub const PERCENTAGE_TAG: &'static str = "PercentageDiscount";

    /// Percentage discount; fails with `InvalidArgument` outside `0..=100`.
    pub fn percentage(percent: i32) -> DomainResult<Self> {
        Ok(Self::Percentage(DiscountPercent::new(percent)?))
    }

    /// Rebuild a strategy from its stored tag and optional percent.
    ///
    /// Unknown tags and a percentage tag without a value fall back to
    /// `NoDiscount`. A zero percent collapses to `NoDiscount` as well.
    pub fn from_tag(tag: &str, percent: Option<i32>) -> DomainResult<Self> {
        match (tag, percent) {
            (Self::PERCENTAGE_TAG, Some(p)) => Ok(Self::percentage(p)?.normalized()),
            _ => Ok(Self::NoDiscount),
        }
    }

    pub fn compute(&self, base_cost: f64) -> f64 {
        match self {
            Self::NoDiscount => base_cost,
            Self::Percentage(p) => base_cost * (1.0 - f64::from(p.value()) / 100.0),
        }
    }

    /// Human-readable label; not used for round-tripping.
    pub fn describe(&self) -> String {
        match self {
            Self::NoDiscount => "no discount".to_string(),
            Self::Percentage(p) => format!("{} discount", p),
        }
    }

    /// Stable type tag shared by the flat-file format and the database.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::NoDiscount => Self::NO_DISCOUNT_TAG,
            Self::Percentage(_) => Self::PERCENTAGE_TAG,
        }
    }

    pub fn percent(&self) -> Option<u8> {
        match self {
            Self::NoDiscount => None,
            Self::Percentage(p) => Some(p.value()),
        }
    }

    /// A 0% discount is stored as `NoDiscount`.
    pub fn normalized(self) -> Self {
        match self {
            Self::Percentage(p) if p.value() == 0 => Self::NoDiscount,
            other => other,
        }
    }
}

impl std::fmt::Display for DiscountStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Priced direction with its discount rule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tariff {
    direction: String,
    base_cost: f64,
    strategy: DiscountStrategy,
}

impl Tariff {
    pub fn new(
        direction: impl Into<String>,
        base_cost: f64,
        strategy: DiscountStrategy,
    ) -> DomainResult<Self> {
        validate_base_cost(base_cost)?;
        Ok(Self {
            direction: direction.into(),
            base_cost,
            strategy: strategy.normalized(),
        })
    }

    pub fn without_discount(direction: impl Into<String>, base_cost: f64) -> DomainResult<Self> {
        Self::new(direction, base_cost, DiscountStrategy::NoDiscount)
    }

    pub fn with_percent(
        direction: impl Into<String>,
        base_cost: f64,
        percent: i32,
    ) -> DomainResult<Self> {
        Self::new(direction, base_cost, DiscountStrategy::percentage(percent)?)
    }

    pub fn direction(&self) -> &str {
        &self.direction
    }

    pub fn set_direction(&mut self, direction: impl Into<String>) {
        self.direction = direction.into();
    }

    pub fn base_cost(&self) -> f64 {
        self.base_cost
    }

    pub fn set_base_cost(&mut self, base_cost: f64) -> DomainResult<()> {
        validate_base_cost(base_cost)?;
        self.base_cost = base_cost;
        Ok(())
    }

    pub fn strategy(&self) -> DiscountStrategy {
        self.strategy
    }

    /// Replace the discount rule. `None` means no discount.
    pub fn set_strategy(&mut self, strategy: Option<DiscountStrategy>) {
        self.strategy = strategy.unwrap_or_default().normalized();
    }

    pub fn final_cost(&self) -> f64 {
        self.strategy.compute(self.base_cost)
    }

    pub fn discount_label(&self) -> String {
        self.strategy.describe()
    }

    /// Sort key for the discount column.
    pub fn discount_percent_for_sorting(&self) -> u8 {
        self.strategy.percent().unwrap_or(0)
    }
}

fn validate_base_cost(base_cost: f64) -> DomainResult<()> {
    if !base_cost.is_finite() || base_cost <= 0.0 {
        return Err(DomainError::invalid(format!(
            "base cost must be a positive number, got {}",
            base_cost
        )));
    }
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────
