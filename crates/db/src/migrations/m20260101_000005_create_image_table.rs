//! Create image table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Image::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Image::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Image::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Image::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Image::Slug).string_len(200).not_null())
                    .col(
                        ColumnDef::new(Image::SourceUrl)
                            .string_len(2048)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Image::FileKey).string_len(1024).not_null())
                    .col(ColumnDef::new(Image::Description).text())
                    .col(
                        ColumnDef::new(Image::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_image_owner")
                            .from(Image::Table, Image::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: user_id (owner listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_image_user_id")
                    .table(Image::Table)
                    .col(Image::UserId)
                    .to_owned(),
            )
            .await?;

        // Index: created_at (listing order)
        manager
            .create_index(
                Index::create()
                    .name("idx_image_created_at")
                    .table(Image::Table)
                    .col(Image::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Image::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Image {
    Table,
    Id,
    UserId,
    Title,
    Slug,
    SourceUrl,
    FileKey,
    Description,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
