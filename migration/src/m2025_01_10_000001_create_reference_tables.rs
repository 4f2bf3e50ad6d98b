//! Migration to create the reference lookup tables.
//!
//! Regions, organization types, organization subtypes and services share the
//! same bilingual, soft-activatable shape: a unique English name, an optional
//! Arabic name and an `is_active` flag.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Regions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Regions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Regions::Name).text().not_null().unique_key())
                    .col(ColumnDef::new(Regions::NameAr).text().null())
                    .col(
                        ColumnDef::new(Regions::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Regions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrganizationTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrganizationTypes::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OrganizationTypes::Name)
                            .text()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(OrganizationTypes::NameAr).text().null())
                    .col(
                        ColumnDef::new(OrganizationTypes::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(OrganizationTypes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrganizationSubtypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrganizationSubtypes::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OrganizationSubtypes::Name)
                            .text()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(OrganizationSubtypes::NameAr).text().null())
                    .col(ColumnDef::new(OrganizationSubtypes::TypeId).uuid().null())
                    .col(
                        ColumnDef::new(OrganizationSubtypes::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(OrganizationSubtypes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organization_subtypes_type_id")
                            .from(OrganizationSubtypes::Table, OrganizationSubtypes::TypeId)
                            .to(OrganizationTypes::Table, OrganizationTypes::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Services::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Services::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Services::Name).text().not_null().unique_key())
                    .col(ColumnDef::new(Services::NameAr).text().null())
                    .col(ColumnDef::new(Services::Description).text().null())
                    .col(
                        ColumnDef::new(Services::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Services::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Services::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OrganizationSubtypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OrganizationTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Regions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Regions {
    Table,
    Id,
    Name,
    NameAr,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum OrganizationTypes {
    Table,
    Id,
    Name,
    NameAr,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum OrganizationSubtypes {
    Table,
    Id,
    Name,
    NameAr,
    TypeId,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Services {
    Table,
    Id,
    Name,
    NameAr,
    Description,
    IsActive,
    CreatedAt,
}
