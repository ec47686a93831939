use chrono::{DateTime, Utc};
use sea_orm::{sea_query::OnConflict, ConnectionTrait, TransactionTrait};
use uuid::Uuid;

use crate::{db_core::prelude::*, error::AppResult};

pub struct JobRecordCtrl;

impl JobRecordCtrl {
    /// `ON CONFLICT (queue_name, idempotency_key) DO NOTHING` — repeated enqueues within the
    /// dedup window collapse to the first job (SPEC_FULL §4.6).
    pub async fn enqueue(
        conn: &DatabaseConnection,
        id: Uuid,
        queue_name: &str,
        payload: serde_json::Value,
        idempotency_key: Option<String>,
        max_attempts: i32,
    ) -> AppResult<()> {
        let active = job_record::ActiveModel {
            id: Set(id),
            queue_name: Set(queue_name.to_string()),
            payload: Set(payload),
            idempotency_key: Set(idempotency_key),
            status: Set(JobStatus::Queued),
            attempt: Set(0),
            max_attempts: Set(max_attempts),
            next_visible_at: Set(Utc::now().into()),
            locked_by: Set(None),
            locked_until: Set(None),
            created_at: Set(Utc::now().into()),
            completed_at: Set(None),
        };

        JobRecord::insert(active)
            .on_conflict(
                OnConflict::columns([
                    job_record::Column::QueueName,
                    job_record::Column::IdempotencyKey,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;

        Ok(())
    }

    /// Claims the oldest visible job on `queue_name` and marks it `Running`, owned by
    /// `worker_id` until `now + lease`. Uses `FOR UPDATE SKIP LOCKED` so concurrent pollers on
    /// the same queue never double-claim (SPEC_FULL §4.6, §5).
    pub async fn claim_next(
        conn: &DatabaseConnection,
        queue_name: &str,
        worker_id: &str,
        lease: chrono::Duration,
    ) -> AppResult<Option<job_record::Model>> {
        let txn = conn.begin().await?;

        let stmt = sea_orm::Statement::from_sql_and_values(
            txn.get_database_backend(),
            r#"
            SELECT id FROM job_tracking
            WHERE queue_name = $1 AND status = 'queued' AND next_visible_at <= now()
            ORDER BY next_visible_at ASC
            LIMIT 1
            FOR UPDATE SKIP LOCKED
            "#,
            [queue_name.into()],
        );

        let candidate = txn.query_one(stmt).await?;
        let Some(row) = candidate else {
            txn.commit().await?;
            return Ok(None);
        };
        let job_id: Uuid = row.try_get("", "id")?;

        let locked_until = Utc::now() + lease;
        job_record::ActiveModel {
            id: Set(job_id),
            status: Set(JobStatus::Running),
            locked_by: Set(Some(worker_id.to_string())),
            locked_until: Set(Some(locked_until.into())),
            ..Default::default()
        }
        .update(&txn)
        .await?;

        let job = JobRecord::find_by_id(job_id).one(&txn).await?;
        txn.commit().await?;

        Ok(job)
    }

    pub async fn complete(conn: &DatabaseConnection, job_id: Uuid) -> AppResult<()> {
        job_record::ActiveModel {
            id: Set(job_id),
            status: Set(JobStatus::Succeeded),
            completed_at: Set(Some(Utc::now().into())),
            locked_by: Set(None),
            locked_until: Set(None),
            ..Default::default()
        }
        .update(conn)
        .await?;

        Ok(())
    }

    /// On failure, either reschedules with exponential backoff or marks the job terminally
    /// `Failed` once `max_attempts` is reached (SPEC_FULL §4.6).
    pub async fn fail_or_retry(
        conn: &DatabaseConnection,
        job: &job_record::Model,
        backoff_base_secs: i64,
    ) -> AppResult<()> {
        let next_attempt = job.attempt + 1;

        if next_attempt >= job.max_attempts {
            job_record::ActiveModel {
                id: Set(job.id),
                status: Set(JobStatus::Failed),
                attempt: Set(next_attempt),
                completed_at: Set(Some(Utc::now().into())),
                locked_by: Set(None),
                locked_until: Set(None),
                ..Default::default()
            }
            .update(conn)
            .await?;
        } else {
            let delay_secs = backoff_base_secs * 2i64.pow(next_attempt as u32);
            let next_visible_at = Utc::now() + chrono::Duration::seconds(delay_secs);
            job_record::ActiveModel {
                id: Set(job.id),
                status: Set(JobStatus::Queued),
                attempt: Set(next_attempt),
                next_visible_at: Set(next_visible_at.into()),
                locked_by: Set(None),
                locked_until: Set(None),
                ..Default::default()
            }
            .update(conn)
            .await?;
        }

        Ok(())
    }

    /// Returns expired leases (`locked_until` in the past, still `Running`) to `Queued` so a
    /// worker that died mid-job gets redelivered (SPEC_FULL §5 cancellation & timeouts).
    pub async fn reclaim_expired_leases(conn: &DatabaseConnection) -> AppResult<u64> {
        let expired = JobRecord::find()
            .filter(job_record::Column::Status.eq(JobStatus::Running))
            .filter(job_record::Column::LockedUntil.lt(Utc::now()))
            .all(conn)
            .await?;

        let count = expired.len() as u64;
        for job in expired {
            job_record::ActiveModel {
                id: Set(job.id),
                status: Set(JobStatus::Queued),
                locked_by: Set(None),
                locked_until: Set(None),
                ..Default::default()
            }
            .update(conn)
            .await?;
        }

        Ok(count)
    }

    /// Terminal retention sweep: completed jobs kept <=24h, failed jobs kept <=7d
    /// (SPEC_FULL §4.6).
    pub async fn cleanup_terminal(conn: &DatabaseConnection) -> AppResult<u64> {
        let now = Utc::now();
        let completed_cutoff: DateTime<Utc> = now - chrono::Duration::hours(24);
        let failed_cutoff: DateTime<Utc> = now - chrono::Duration::days(7);

        let deleted_completed = JobRecord::delete_many()
            .filter(job_record::Column::Status.eq(JobStatus::Succeeded))
            .filter(job_record::Column::CompletedAt.lt(completed_cutoff))
            .exec(conn)
            .await?;

        let deleted_failed = JobRecord::delete_many()
            .filter(job_record::Column::Status.eq(JobStatus::Failed))
            .filter(job_record::Column::CompletedAt.lt(failed_cutoff))
            .exec(conn)
            .await?;

        Ok(deleted_completed.rows_affected + deleted_failed.rows_affected)
    }
}
