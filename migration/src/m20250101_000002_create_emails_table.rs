use sea_orm_migration::{prelude::*, schema::*};

use super::m20250101_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Emails::Table)
                    .if_not_exists()
                    .col(uuid(Emails::Id).primary_key())
                    .col(uuid(Emails::UserId))
                    .col(string(Emails::ExternalMessageId))
                    .col(string(Emails::ThreadId))
                    .col(string(Emails::SenderAddress))
                    .col(string_null(Emails::SenderDisplayName))
                    .col(string_null(Emails::Subject))
                    .col(timestamp_with_time_zone(Emails::ReceivedAt))
                    .col(string(Emails::PreviewSnippet))
                    .col(json_binary(Emails::Labels))
                    .col(integer(Emails::ThreadReplyCount).default(0))
                    .col(boolean(Emails::IsThreadReply).default(false))
                    .col(
                        timestamp_with_time_zone(Emails::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-emails-user_id")
                            .from(Emails::Table, Emails::UserId)
                            .to(Users::Table, Users::Id)
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
                    .name("idx-emails-user_id-external_message_id")
                    .unique()
                    .table(Emails::Table)
                    .col(Emails::UserId)
                    .col(Emails::ExternalMessageId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Emails::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Emails {
    Table,
    Id,
    UserId,
    ExternalMessageId,
    ThreadId,
    SenderAddress,
    SenderDisplayName,
    Subject,
    ReceivedAt,
    PreviewSnippet,
    Labels,
    ThreadReplyCount,
    IsThreadReply,
    CreatedAt,
}
