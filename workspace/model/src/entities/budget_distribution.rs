use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

/// An allocation of funds from an economic code's remaining budget to a
/// specific upazila, held by a specific user.
///
/// The `economic_code` and `upazila_id` references are plain values, not
/// foreign keys: a distribution outlives later deletion of the record it
/// points at.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "budget_distributions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub upazila_id: i32,
    /// The uid of the user the funds were distributed to.
    pub user_uid: String,
    pub economic_code: String,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub distributed_budget: Decimal,
    /// Running total of expenses recorded against this distribution.
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub expense_budget: Decimal,
    /// Import key carried by rows loaded from a CSV upload; used for
    /// de-duplication.
    #[sea_orm(unique)]
    pub serial_code: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
