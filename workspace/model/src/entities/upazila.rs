use sea_orm::entity::prelude::*;

/// Directory entry for an administrative subdivision (upazila) office.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "upazilas")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub upazila_name: String,
    pub institute_code: String,
    pub field_office_code: String,
    /// Concatenation of `institute_code` and `field_office_code`, set on insert.
    pub full_office_code: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
