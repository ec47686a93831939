use sea_orm_migration::{prelude::*, schema::*};

use super::m20250101_000001_create_users_table::Users;
use super::m20250101_000004_create_youtube_links_table::YoutubeLinks;
use super::m20250101_000006_create_rankings_table::Rankings;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Feedback::Table)
                    .if_not_exists()
                    .col(uuid(Feedback::Id).primary_key())
                    .col(uuid(Feedback::UserId))
                    .col(uuid(Feedback::LinkId))
                    .col(uuid_null(Feedback::RankingId))
                    .col(string(Feedback::Action))
                    .col(string_null(Feedback::RelevanceLabel))
                    .col(timestamp_with_time_zone(Feedback::ProvidedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-feedback-user_id")
                            .from(Feedback::Table, Feedback::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-feedback-link_id")
                            .from(Feedback::Table, Feedback::LinkId)
                            .to(YoutubeLinks::Table, YoutubeLinks::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-feedback-ranking_id")
                            .from(Feedback::Table, Feedback::RankingId)
                            .to(Rankings::Table, Rankings::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-feedback-user_link")
                    .table(Feedback::Table)
                    .col(Feedback::UserId)
                    .col(Feedback::LinkId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Feedback::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Feedback {
    Table,
    Id,
    UserId,
    LinkId,
    RankingId,
    Action,
    RelevanceLabel,
    ProvidedAt,
}
