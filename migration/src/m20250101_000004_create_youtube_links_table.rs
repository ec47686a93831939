use sea_orm_migration::{prelude::*, schema::*};

use super::m20250101_000001_create_users_table::Users;
use super::m20250101_000002_create_emails_table::Emails;
use super::m20250101_000003_create_video_metadata_table::VideoMetadata;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(YoutubeLinks::Table)
                    .if_not_exists()
                    .col(uuid(YoutubeLinks::Id).primary_key())
                    .col(uuid(YoutubeLinks::UserId))
                    .col(uuid(YoutubeLinks::EmailId))
                    .col(string(YoutubeLinks::VideoId))
                    .col(string(YoutubeLinks::CanonicalUrl))
                    .col(string_null(YoutubeLinks::PlaylistId))
                    .col(timestamp_with_time_zone(YoutubeLinks::ExtractedAt))
                    .col(boolean(YoutubeLinks::IsDuplicate).default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-youtube_links-user_id")
                            .from(YoutubeLinks::Table, YoutubeLinks::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-youtube_links-email_id")
                            .from(YoutubeLinks::Table, YoutubeLinks::EmailId)
                            .to(Emails::Table, Emails::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-youtube_links-video_id")
                            .from(YoutubeLinks::Table, YoutubeLinks::VideoId)
                            .to(VideoMetadata::Table, VideoMetadata::VideoId)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-youtube_links-user_email_video")
                    .unique()
                    .table(YoutubeLinks::Table)
                    .col(YoutubeLinks::UserId)
                    .col(YoutubeLinks::EmailId)
                    .col(YoutubeLinks::VideoId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-youtube_links-user_video")
                    .table(YoutubeLinks::Table)
                    .col(YoutubeLinks::UserId)
                    .col(YoutubeLinks::VideoId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(YoutubeLinks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum YoutubeLinks {
    Table,
    Id,
    UserId,
    EmailId,
    VideoId,
    CanonicalUrl,
    PlaylistId,
    ExtractedAt,
    IsDuplicate,
}
