//! In-memory tariff repository

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::{DomainError, DomainResult, Station, Tariff, TariffRepository};

/// Transient backend over a [`Station`] owned by this repository.
///
/// Min-cost ties follow the station's epsilon policy: costs within
/// [`crate::domain::MIN_COST_EPSILON`] of the minimum count as tied.
#[derive(Debug, Default)]
pub struct InMemoryTariffRepository {
    station: RwLock<Station>,
}

impl InMemoryTariffRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> DomainResult<RwLockReadGuard<'_, Station>> {
        self.station
            .read()
            .map_err(|_| DomainError::Storage("station lock poisoned".to_string()))
    }

    fn write(&self) -> DomainResult<RwLockWriteGuard<'_, Station>> {
        self.station
            .write()
            .map_err(|_| DomainError::Storage("station lock poisoned".to_string()))
    }
}

#[async_trait]
impl TariffRepository for InMemoryTariffRepository {
    async fn get_all_tariffs(&self) -> DomainResult<Vec<Tariff>> {
        Ok(self.read()?.tariffs().to_vec())
    }

    async fn add_tariff(&self, tariff: Tariff) -> DomainResult<()> {
        self.write()?.push(tariff)
    }

    async fn remove_tariff(&self, direction: &str) -> DomainResult<()> {
        let mut station = self.write()?;
        match station.position(direction) {
            Some(index) => {
                station.remove_at(index)?;
            }
            None => debug!(direction, "remove: no matching tariff"),
        }
        Ok(())
    }

    async fn update_tariff(&self, old_direction: &str, tariff: Tariff) -> DomainResult<()> {
        let mut station = self.write()?;
        let index = station
            .position(old_direction)
            .ok_or_else(|| DomainError::DirectionNotFound(old_direction.to_string()))?;

        if !station.change_direction(index, tariff.direction())? {
            return Err(DomainError::DuplicateDirection(tariff.direction().to_string()));
        }
        station.update_at(index, tariff.base_cost(), tariff.strategy())
    }

    async fn clear(&self) -> DomainResult<()> {
        self.write()?.clear();
        Ok(())
    }

    async fn find_min_cost_direction(&self) -> DomainResult<String> {
        self.read()?.find_min_cost_direction()
    }

    async fn find_min_cost_directions(&self) -> DomainResult<Vec<String>> {
        self.read()?.find_all_min_cost_directions()
    }
}
