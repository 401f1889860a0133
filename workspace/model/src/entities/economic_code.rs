use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

/// A budget classification category with a fixed ceiling and a running
/// distributed total.
///
/// `distributed_budget` starts at zero and is only ever incremented by
/// distribution operations; it never exceeds `total_budget`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "economic_codes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub economic_code: String,
    pub code_title: String,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub total_budget: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub distributed_budget: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
