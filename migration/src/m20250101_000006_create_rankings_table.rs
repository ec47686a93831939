use sea_orm_migration::{prelude::*, schema::*};

use super::m20250101_000001_create_users_table::Users;
use super::m20250101_000004_create_youtube_links_table::YoutubeLinks;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Rankings::Table)
                    .if_not_exists()
                    .col(uuid(Rankings::Id).primary_key())
                    .col(uuid(Rankings::UserId))
                    .col(uuid(Rankings::LinkId))
                    .col(timestamp_with_time_zone(Rankings::RankedAt))
                    .col(double(Rankings::SenderScore))
                    .col(double(Rankings::ThreadScore))
                    .col(double(Rankings::FreshnessScore))
                    .col(double(Rankings::TopicMatchScore))
                    .col(double(Rankings::NoisePenalty))
                    .col(double(Rankings::FinalScore))
                    .col(string(Rankings::Classification))
                    .col(text(Rankings::Explanation))
                    .col(json_binary(Rankings::TopicTags))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-rankings-user_id")
                            .from(Rankings::Table, Rankings::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-rankings-link_id")
                            .from(Rankings::Table, Rankings::LinkId)
                            .to(YoutubeLinks::Table, YoutubeLinks::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-rankings-user_link_ranked_at")
                    .unique()
                    .table(Rankings::Table)
                    .col(Rankings::UserId)
                    .col(Rankings::LinkId)
                    .col(Rankings::RankedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-rankings-user_score")
                    .table(Rankings::Table)
                    .col(Rankings::UserId)
                    .col(Rankings::FinalScore)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Rankings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Rankings {
    Table,
    Id,
    UserId,
    LinkId,
    RankedAt,
    SenderScore,
    ThreadScore,
    FreshnessScore,
    TopicMatchScore,
    NoisePenalty,
    FinalScore,
    Classification,
    Explanation,
    TopicTags,
}
