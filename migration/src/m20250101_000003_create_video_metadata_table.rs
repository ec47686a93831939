use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VideoMetadata::Table)
                    .if_not_exists()
                    .col(string(VideoMetadata::VideoId).primary_key())
                    .col(string(VideoMetadata::Title))
                    .col(string(VideoMetadata::ChannelId))
                    .col(string(VideoMetadata::ChannelTitle))
                    .col(timestamp_with_time_zone(VideoMetadata::PublishedAt))
                    .col(integer(VideoMetadata::DurationSeconds))
                    .col(string_null(VideoMetadata::Category))
                    .col(json_binary(VideoMetadata::DescriptionKeywords))
                    .col(string_null(VideoMetadata::ThumbnailUrl))
                    .col(big_integer(VideoMetadata::ViewCount).default(0))
                    .col(big_integer(VideoMetadata::LikeCount).default(0))
                    .col(timestamp_with_time_zone(VideoMetadata::FetchedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VideoMetadata::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum VideoMetadata {
    Table,
    VideoId,
    Title,
    ChannelId,
    ChannelTitle,
    PublishedAt,
    DurationSeconds,
    Category,
    DescriptionKeywords,
    ThumbnailUrl,
    ViewCount,
    LikeCount,
    FetchedAt,
}
