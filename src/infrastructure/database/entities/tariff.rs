//! Tariff entity

use sea_orm::entity::prelude::*;

/// Stored discount type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum DiscountType {
    #[sea_orm(string_value = "NoDiscount")]
    NoDiscount,
    #[sea_orm(string_value = "PercentageDiscount")]
    PercentageDiscount,
}

/// One tariff row. `discount_percent` is null iff the type is `NoDiscount`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tariffs")]
pub struct Model {
    /// Only fixes iteration order
    #[sea_orm(primary_key)]
    pub id: i32,

    pub direction: String,

    /// Trimmed, lowercased direction; backs uniqueness in the store.
    #[sea_orm(unique)]
    pub direction_key: String,

    #[sea_orm(column_type = "Double")]
    pub base_cost: f64,

    pub discount_type: DiscountType,

    pub discount_percent: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
