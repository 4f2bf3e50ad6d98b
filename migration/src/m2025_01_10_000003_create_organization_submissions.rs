//! Migration to create the organization_submissions table.
//!
//! Submissions are user-proposed organizations awaiting review. Rows are
//! retained after review as an audit record.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OrganizationSubmissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrganizationSubmissions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OrganizationSubmissions::SubmittedBy)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OrganizationSubmissions::Name).text().not_null())
                    .col(ColumnDef::new(OrganizationSubmissions::NameAr).text().null())
                    .col(ColumnDef::new(OrganizationSubmissions::Type).text().not_null())
                    .col(ColumnDef::new(OrganizationSubmissions::SubType).text().null())
                    .col(
                        ColumnDef::new(OrganizationSubmissions::Description)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrganizationSubmissions::DescriptionAr)
                            .text()
                            .null(),
                    )
                    .col(ColumnDef::new(OrganizationSubmissions::LogoUrl).text().null())
                    .col(ColumnDef::new(OrganizationSubmissions::Website).text().null())
                    .col(
                        ColumnDef::new(OrganizationSubmissions::LinkedinUrl)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(OrganizationSubmissions::ContactEmail)
                            .text()
                            .null(),
                    )
                    .col(ColumnDef::new(OrganizationSubmissions::Region).text().not_null())
                    .col(
                        ColumnDef::new(OrganizationSubmissions::SectorFocus)
                            .json_binary()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(OrganizationSubmissions::SdgFocus)
                            .json_binary()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(OrganizationSubmissions::Services)
                            .json_binary()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(OrganizationSubmissions::Status)
                            .text()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(OrganizationSubmissions::SubmittedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(OrganizationSubmissions::ReviewedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(OrganizationSubmissions::ReviewedBy)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(OrganizationSubmissions::RejectionReason)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(OrganizationSubmissions::OrganizationId)
                            .uuid()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Review queue: pending rows, newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_organization_submissions_status_submitted_at")
                    .table(OrganizationSubmissions::Table)
                    .col(OrganizationSubmissions::Status)
                    .col(OrganizationSubmissions::SubmittedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_organization_submissions_submitted_by")
                    .table(OrganizationSubmissions::Table)
                    .col(OrganizationSubmissions::SubmittedBy)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_organization_submissions_status_submitted_at")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_organization_submissions_submitted_by")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(OrganizationSubmissions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum OrganizationSubmissions {
    Table,
    Id,
    SubmittedBy,
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
    SubmittedAt,
    ReviewedAt,
    ReviewedBy,
    RejectionReason,
    OrganizationId,
}
