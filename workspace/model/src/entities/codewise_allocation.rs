use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

/// One `(economic_code, amount)` entry inside an upazila's codewise ledger.
/// At most one row exists per `(budget_id, economic_code)` pair; repeated
/// allocations increment `amount` in place.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "codewise_allocations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub budget_id: i32,
    pub economic_code: String,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub amount: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::codewise_budget::Entity",
        from = "Column::BudgetId",
        to = "super::codewise_budget::Column::Id",
        on_delete = "Cascade"
    )]
    CodewiseBudget,
}

impl Related<super::codewise_budget::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CodewiseBudget.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
