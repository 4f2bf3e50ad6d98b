//! Migration to create the organizations table.
//!
//! Organizations are the public directory entries. They are created by
//! administrators directly or materialized from an approved submission, in
//! which case `source_submission_id` records where they came from.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Organizations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Organizations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Organizations::Name).text().not_null())
                    .col(ColumnDef::new(Organizations::NameAr).text().null())
                    .col(ColumnDef::new(Organizations::Type).text().not_null())
                    .col(ColumnDef::new(Organizations::SubType).text().null())
                    .col(ColumnDef::new(Organizations::Description).text().not_null())
                    .col(ColumnDef::new(Organizations::DescriptionAr).text().null())
                    .col(ColumnDef::new(Organizations::LogoUrl).text().null())
                    .col(ColumnDef::new(Organizations::Website).text().null())
                    .col(ColumnDef::new(Organizations::LinkedinUrl).text().null())
                    .col(ColumnDef::new(Organizations::ContactEmail).text().null())
                    .col(ColumnDef::new(Organizations::Region).text().not_null())
                    .col(ColumnDef::new(Organizations::SectorFocus).json_binary().null())
                    .col(ColumnDef::new(Organizations::SdgFocus).json_binary().null())
                    .col(ColumnDef::new(Organizations::Services).json_binary().null())
                    .col(ColumnDef::new(Organizations::Status).text().null())
                    .col(
                        ColumnDef::new(Organizations::SourceSubmissionId)
                            .uuid()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Organizations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one organization per originating submission
        manager
            .create_index(
                Index::create()
                    .name("idx_organizations_source_submission_id")
                    .table(Organizations::Table)
                    .col(Organizations::SourceSubmissionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_organizations_region")
                    .table(Organizations::Table)
                    .col(Organizations::Region)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_organizations_source_submission_id")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(Index::drop().name("idx_organizations_region").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Organizations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Organizations {
    Table,
    Id,
    Name,
    NameAr,
    Type,
    SubType,
    Description,
    DescriptionAr,
    LogoUrl,
    Website,
    LinkedinUrl,
    ContactEmail,
    Region,
    SectorFocus,
    SdgFocus,
    Services,
    Status,
    SourceSubmissionId,
    CreatedAt,
}
