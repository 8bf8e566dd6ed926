//! SeaORM implementation of TariffRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, NotSet, QueryOrder,
    Set, SqlErr, Statement, TransactionTrait,
};
use tracing::{debug, info};

use crate::domain::tariff::{directions_match, DiscountStrategy, Tariff, TariffRepository};
use crate::domain::{normalize_direction, DomainError, DomainResult, MIN_COST_EPSILON};
use crate::infrastructure::database::entities::tariff::{self, DiscountType};

/// Discounted cost computed by the store, mirroring `DiscountStrategy::compute`.
const DISCOUNTED_COST_SQL: &str = "CASE discount_type \
     WHEN 'PercentageDiscount' THEN base_cost * (1 - CAST(discount_percent AS REAL) / 100) \
     ELSE base_cost END";

// ── Conversion helpers ──────────────────────────────────────────

fn db_err(e: DbErr) -> DomainError {
    DomainError::Storage(e.to_string())
}

/// Unique constraint violations surface as `DuplicateDirection`.
fn write_err(e: DbErr, direction: &str) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            DomainError::DuplicateDirection(direction.to_string())
        }
        _ => db_err(e),
    }
}

fn entity_to_domain(m: tariff::Model) -> DomainResult<Tariff> {
    let strategy = match (m.discount_type, m.discount_percent) {
        (DiscountType::PercentageDiscount, Some(p)) => DiscountStrategy::percentage(p)?,
        _ => DiscountStrategy::NoDiscount,
    };
    Tariff::new(m.direction, m.base_cost, strategy)
}

fn domain_to_active(t: &Tariff) -> tariff::ActiveModel {
    let (discount_type, discount_percent) = match t.strategy() {
        DiscountStrategy::NoDiscount => (DiscountType::NoDiscount, None),
        DiscountStrategy::Percentage(p) => (DiscountType::PercentageDiscount, Some(i32::from(p.value()))),
    };
    tariff::ActiveModel {
        id: NotSet,
        direction: Set(t.direction().to_string()),
        direction_key: Set(normalize_direction(t.direction())),
        base_cost: Set(t.base_cost()),
        discount_type: Set(discount_type),
        discount_percent: Set(discount_percent),
    }
}

/// Fails when `direction` collides with a row other than `except_id`.
fn ensure_direction_free(
    rows: &[tariff::Model],
    direction: &str,
    except_id: Option<i32>,
) -> DomainResult<()> {
    let normalized = normalize_direction(direction);
    let taken = rows
        .iter()
        .filter(|r| Some(r.id) != except_id)
        .any(|r| normalize_direction(&r.direction) == normalized);
    if taken {
        return Err(DomainError::DuplicateDirection(direction.to_string()));
    }
    Ok(())
}

async fn fetch_all<C: ConnectionTrait>(conn: &C) -> DomainResult<Vec<tariff::Model>> {
    tariff::Entity::find()
        .order_by_asc(tariff::Column::Id)
        .all(conn)
        .await
        .map_err(db_err)
}

// ── SeaOrmTariffRepository ──────────────────────────────────────

/// Persistent backend.
///
/// Every call runs in its own transaction. `find_min_cost_directions`
/// compares store-computed costs for exact equality, unlike the in-memory
/// backend which tolerates differences below [`MIN_COST_EPSILON`].
pub struct SeaOrmTariffRepository {
    db: DatabaseConnection,
}

impl SeaOrmTariffRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TariffRepository for SeaOrmTariffRepository {
    async fn get_all_tariffs(&self) -> DomainResult<Vec<Tariff>> {
        fetch_all(&self.db)
            .await?
            .into_iter()
            .map(entity_to_domain)
            .collect()
    }

    async fn add_tariff(&self, t: Tariff) -> DomainResult<()> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let rows = fetch_all(&txn).await?;
        ensure_direction_free(&rows, t.direction(), None)?;

        domain_to_active(&t)
            .insert(&txn)
            .await
            .map_err(|e| write_err(e, t.direction()))?;
        txn.commit().await.map_err(|e| write_err(e, t.direction()))?;

        info!("Tariff saved: {}", t.direction());
        Ok(())
    }

    async fn remove_tariff(&self, direction: &str) -> DomainResult<()> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let rows = fetch_all(&txn).await?;
        let Some(row) = rows.iter().find(|r| directions_match(&r.direction, direction)) else {
            debug!(direction, "remove: no matching tariff");
            return Ok(());
        };

        tariff::Entity::delete_by_id(row.id)
            .exec(&txn)
            .await
            .map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;

        info!("Tariff removed: {}", row.direction);
        Ok(())
    }

    async fn update_tariff(&self, old_direction: &str, t: Tariff) -> DomainResult<()> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let rows = fetch_all(&txn).await?;
        let old = rows
            .iter()
            .find(|r| directions_match(&r.direction, old_direction))
            .ok_or_else(|| DomainError::DirectionNotFound(old_direction.to_string()))?;
        ensure_direction_free(&rows, t.direction(), Some(old.id))?;

        // Delete then re-insert under the same id so iteration order holds.
        // Dropping `txn` on any error below rolls both statements back.
        tariff::Entity::delete_by_id(old.id)
            .exec(&txn)
            .await
            .map_err(db_err)?;

        let mut model = domain_to_active(&t);
        model.id = Set(old.id);
        model
            .insert(&txn)
            .await
            .map_err(|e| write_err(e, t.direction()))?;
        txn.commit().await.map_err(|e| write_err(e, t.direction()))?;

        info!("Tariff updated: {} -> {}", old.direction, t.direction());
        Ok(())
    }

    async fn clear(&self) -> DomainResult<()> {
        let result = tariff::Entity::delete_many()
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        info!("Tariffs cleared: {} rows", result.rows_affected);
        Ok(())
    }

    /// Minimum is computed client-side; the first row within
    /// [`MIN_COST_EPSILON`] of it in storage order wins.
    async fn find_min_cost_direction(&self) -> DomainResult<String> {
        let all = self.get_all_tariffs().await?;
        let min_cost = all
            .iter()
            .map(Tariff::final_cost)
            .min_by(f64::total_cmp)
            .ok_or(DomainError::EmptyCollection)?;

        all.into_iter()
            .find(|t| (t.final_cost() - min_cost).abs() < MIN_COST_EPSILON)
            .map(|t| t.direction().to_string())
            .ok_or(DomainError::EmptyCollection)
    }

    /// Both the minimum and the matching rows are computed by the store;
    /// only rows whose cost equals the minimum exactly are returned.
    async fn find_min_cost_directions(&self) -> DomainResult<Vec<String>> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let backend = txn.get_database_backend();

        let min_row = txn
            .query_one(Statement::from_string(
                backend,
                format!("SELECT MIN({}) AS min_cost FROM tariffs", DISCOUNTED_COST_SQL),
            ))
            .await
            .map_err(db_err)?;
        let min_cost = match min_row {
            Some(row) => row.try_get::<Option<f64>>("", "min_cost").map_err(db_err)?,
            None => None,
        }
        .ok_or(DomainError::EmptyCollection)?;

        let rows = txn
            .query_all(Statement::from_sql_and_values(
                backend,
                format!(
                    "SELECT direction FROM tariffs WHERE {} = ? ORDER BY id",
                    DISCOUNTED_COST_SQL
                ),
                [min_cost.into()],
            ))
            .await
            .map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;

        rows.iter()
            .map(|row| row.try_get::<String>("", "direction").map_err(db_err))
            .collect()
    }
}

// ── Tests ──────────────────────────────────────────────────────
