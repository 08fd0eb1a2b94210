//! Create image like table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ImageLike::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ImageLike::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ImageLike::ImageId).string_len(32).not_null())
                    .col(ColumnDef::new(ImageLike::UserId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(ImageLike::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_image_like_image")
                            .from(ImageLike::Table, ImageLike::ImageId)
                            .to(Image::Table, Image::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_image_like_user")
                            .from(ImageLike::Table, ImageLike::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (image_id, user_id) - set semantics for likes
        manager
            .create_index(
                Index::create()
                    .name("idx_image_like_image_user")
                    .table(ImageLike::Table)
                    .col(ImageLike::ImageId)
                    .col(ImageLike::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ImageLike::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ImageLike {
    Table,
    Id,
    ImageId,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum Image {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
