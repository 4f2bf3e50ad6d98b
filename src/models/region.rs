//! Region entity model
//!
//! Administrative regions of the Kingdom used to place organizations.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Region lookup row
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "regions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// English display name (unique)
    #[sea_orm(unique)]
    pub name: String,

    /// Arabic display name
    pub name_ar: Option<String>,

    /// Inactive rows are hidden from the public lists and rejected by submissions
    pub is_active: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
