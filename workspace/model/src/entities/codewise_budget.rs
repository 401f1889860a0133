use sea_orm::entity::prelude::*;

/// Per-upazila allocation ledger, created lazily on the first allocation.
/// The individual per-code entries live in `codewise_allocation`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "codewise_budgets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub upazila_id: i32,
    pub upazila_name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::codewise_allocation::Entity")]
    CodewiseAllocation,
}

impl Related<super::codewise_allocation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CodewiseAllocation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
