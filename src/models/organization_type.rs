//! Organization type entity model

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Organization type lookup row (e.g. "Non-Profit Organization")
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "organization_types")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub name: String,

    pub name_ar: Option<String>,

    pub is_active: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::organization_subtype::Entity")]
    Subtypes,
}

impl Related<super::organization_subtype::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subtypes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
