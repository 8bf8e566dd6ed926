//! Tariff repository interface

use async_trait::async_trait;

use super::model::Tariff;
use crate::domain::DomainResult;

/// Storage-agnostic access to the tariff catalogue.
///
/// Both backends match directions for `remove` and `update` by
/// case-insensitive equality. Returned tariffs are owned snapshots;
/// mutating them never touches the store.
#[async_trait]
pub trait TariffRepository: Send + Sync {
    async fn get_all_tariffs(&self) -> DomainResult<Vec<Tariff>>;

    /// Fails with `DuplicateDirection` when the direction is already taken.
    async fn add_tariff(&self, tariff: Tariff) -> DomainResult<()>;

    /// Removing a direction that does not exist is a no-op.
    async fn remove_tariff(&self, direction: &str) -> DomainResult<()>;

    /// Replace the tariff stored under `old_direction`.
    ///
    /// Fails with `DirectionNotFound` when nothing matches and with
    /// `DuplicateDirection` when the new direction belongs to another entry.
    async fn update_tariff(&self, old_direction: &str, tariff: Tariff) -> DomainResult<()>;

    async fn clear(&self) -> DomainResult<()>;

    /// First direction with the lowest final cost.
    async fn find_min_cost_direction(&self) -> DomainResult<String>;

    /// Every direction tied for the lowest final cost. The tie rule is
    /// backend specific, see the implementations.
    async fn find_min_cost_directions(&self) -> DomainResult<Vec<String>>;
}

/// Case-insensitive direction equality used by both backends.
pub fn directions_match(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directions_match_ignores_case_only() {
        assert!(directions_match("Москва", "МОСКВА"));
        assert!(directions_match("Kazan", "kazan"));
        assert!(!directions_match("Москва", " москва "));
    }
}
