use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(JobTracking::Table)
                    .if_not_exists()
                    .col(uuid(JobTracking::Id).primary_key())
                    .col(string(JobTracking::QueueName))
                    .col(json_binary(JobTracking::Payload))
                    .col(string_null(JobTracking::IdempotencyKey))
                    .col(string(JobTracking::Status).default("queued"))
                    .col(integer(JobTracking::Attempt).default(0))
                    .col(integer(JobTracking::MaxAttempts).default(5))
                    .col(timestamp_with_time_zone(JobTracking::NextVisibleAt))
                    .col(string_null(JobTracking::LockedBy))
                    .col(timestamp_with_time_zone_null(JobTracking::LockedUntil))
                    .col(
                        timestamp_with_time_zone(JobTracking::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .col(timestamp_with_time_zone_null(JobTracking::CompletedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-job_tracking-queue_idempotency")
                    .unique()
                    .table(JobTracking::Table)
                    .col(JobTracking::QueueName)
                    .col(JobTracking::IdempotencyKey)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-job_tracking-queue_status_visible")
                    .table(JobTracking::Table)
                    .col(JobTracking::QueueName)
                    .col(JobTracking::Status)
                    .col(JobTracking::NextVisibleAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JobTracking::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum JobTracking {
    Table,
    Id,
    QueueName,
    Payload,
    IdempotencyKey,
    Status,
    Attempt,
    MaxAttempts,
    NextVisibleAt,
    LockedBy,
    LockedUntil,
    CreatedAt,
    CompletedAt,
}
