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
                    .table(SenderStats::Table)
                    .if_not_exists()
                    .col(uuid(SenderStats::Id).primary_key())
                    .col(uuid(SenderStats::UserId))
                    .col(string(SenderStats::SenderAddress))
                    .col(integer(SenderStats::EmailCount).default(0))
                    .col(timestamp_with_time_zone(SenderStats::LastEmailAt))
                    .col(boolean(SenderStats::InContacts).default(false))
                    .col(
                        timestamp_with_time_zone(SenderStats::UpdatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sender_stats-user_id")
                            .from(SenderStats::Table, SenderStats::UserId)
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
                    .name("idx-sender_stats-user_sender")
                    .unique()
                    .table(SenderStats::Table)
                    .col(SenderStats::UserId)
                    .col(SenderStats::SenderAddress)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SenderStats::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum SenderStats {
    Table,
    Id,
    UserId,
    SenderAddress,
    EmailCount,
    LastEmailAt,
    InContacts,
    UpdatedAt,
}
