//! Organization subtype entity model

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Organization subtype lookup row, optionally attached to a parent type
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "organization_subtypes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub name: String,

    pub name_ar: Option<String>,

    /// Parent organization type (optional)
    pub type_id: Option<Uuid>,

    pub is_active: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organization_type::Entity",
        from = "Column::TypeId",
        to = "super::organization_type::Column::Id"
    )]
    OrganizationType,
}

impl Related<super::organization_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrganizationType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
