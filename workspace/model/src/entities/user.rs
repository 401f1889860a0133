use sea_orm::entity::prelude::*;

/// Represents a user of the system.
/// Identity comes from an external auth provider; `uid` is its opaque key.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub uid: String,
    pub name: String,
    pub email: String,
    /// Either "admin" or "user".
    #[sea_orm(default_value = "user")]
    pub role: String,
    pub photo_url: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
