use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    model::ctrl::job_record_ctrl::JobRecordCtrl, model::payloads::JobPayload,
    server_config::cfg, state::ServerState,
};

use super::dispatch::dispatch;

/// How long a claimed job may run before its lease is eligible for reclaim by another worker
/// (SPEC_FULL §5 cancellation & timeouts; reclaim sweep lives in the cron scheduler).
const JOB_LEASE: chrono::Duration = chrono::Duration::minutes(5);
/// Poll cadence when a queue is empty.
const IDLE_POLL: Duration = Duration::from_millis(500);

/// One `tokio::spawn`ed poller per concurrency slot, generalized from the teacher's
/// per-processor task pattern into a reusable per-queue pool (SPEC_FULL §4.6).
pub struct QueueWorkerPool {
    handles: Vec<JoinHandle<()>>,
    shutdown: CancellationToken,
}

impl QueueWorkerPool {
    /// Spawns `concurrency` workers for `queue_name`, each polling `JobRecordCtrl::claim_next`
    /// independently. `worker_id_prefix` disambiguates lease ownership across processes.
    pub fn spawn(
        state: ServerState,
        queue_name: &'static str,
        concurrency: usize,
        worker_id_prefix: &str,
    ) -> Self {
        let shutdown = CancellationToken::new();
        let mut handles = Vec::with_capacity(concurrency);

        for slot in 0..concurrency {
            let state = state.clone();
            let shutdown = shutdown.clone();
            let worker_id = format!("{worker_id_prefix}:{queue_name}:{slot}");

            handles.push(tokio::spawn(async move {
                worker_loop(state, queue_name, worker_id, shutdown).await;
            }));
        }

        Self { handles, shutdown }
    }

    /// Stops pollers from claiming new jobs and waits up to `cfg.queue.drain_deadline_ms` for
    /// in-flight jobs to finish; anything still running past the deadline is abandoned to its
    /// lease expiry, which the reclaim sweep returns to `Queued` (SPEC_FULL §5).
    pub async fn shutdown(self) {
        self.shutdown.cancel();

        let drain = tokio::time::timeout(
            Duration::from_millis(cfg.queue.drain_deadline_ms),
            futures::future::join_all(self.handles),
        );

        if drain.await.is_err() {
            tracing::warn!("queue worker drain deadline elapsed; abandoning in-flight jobs to lease reclaim");
        }
    }
}

async fn worker_loop(
    state: ServerState,
    queue_name: &'static str,
    worker_id: String,
    shutdown: CancellationToken,
) {
    loop {
        if shutdown.is_cancelled() {
            return;
        }

        let claimed = tokio::select! {
            _ = shutdown.cancelled() => return,
            result = JobRecordCtrl::claim_next(&state.conn, queue_name, &worker_id, JOB_LEASE) => result,
        };

        let job = match claimed {
            Ok(Some(job)) => job,
            Ok(None) => {
                tokio::time::sleep(IDLE_POLL).await;
                continue;
            }
            Err(e) => {
                tracing::error!(queue = queue_name, worker = %worker_id, error = ?e, "failed to claim job");
                tokio::time::sleep(IDLE_POLL).await;
                continue;
            }
        };

        run_one(&state, &worker_id, job).await;
    }
}

async fn run_one(state: &ServerState, worker_id: &str, job: entity::job_record::Model) {
    let payload: Result<JobPayload, _> = serde_json::from_value(job.payload.clone());
    let outcome = match payload {
        Ok(payload) => dispatch(state, payload).await,
        Err(e) => Err(crate::error::AppError::Internal(anyhow::anyhow!(e))),
    };

    match outcome {
        Ok(()) => {
            if let Err(e) = JobRecordCtrl::complete(&state.conn, job.id).await {
                tracing::error!(worker = worker_id, job_id = %job.id, error = ?e, "failed to mark job complete");
            }
        }
        Err(e) if e.is_integrity_violation() => {
            tracing::debug!(worker = worker_id, job_id = %job.id, "job hit a unique conflict; treating as already applied");
            if let Err(e) = JobRecordCtrl::complete(&state.conn, job.id).await {
                tracing::error!(worker = worker_id, job_id = %job.id, error = ?e, "failed to mark job complete");
            }
        }
        Err(e) => {
            tracing::warn!(worker = worker_id, job_id = %job.id, queue = %job.queue_name, error = ?e, "job failed");
            if let Err(e) =
                JobRecordCtrl::fail_or_retry(&state.conn, &job, cfg.queue.backoff_base_secs).await
            {
                tracing::error!(worker = worker_id, job_id = %job.id, error = ?e, "failed to record job failure");
            }
        }
    }
}

/// Convenience bundle of the three queue pools the server runs (SPEC_FULL §6 queue concurrency
/// defaults).
pub struct QueuePools {
    email_process: QueueWorkerPool,
    enrich: QueueWorkerPool,
    rank_compute: QueueWorkerPool,
}

impl QueuePools {
    pub fn spawn_all(state: ServerState, worker_id_prefix: &str) -> Self {
        Self {
            email_process: QueueWorkerPool::spawn(
                state.clone(),
                "email_process",
                cfg.queue.email_process_concurrency,
                worker_id_prefix,
            ),
            enrich: QueueWorkerPool::spawn(
                state.clone(),
                "enrich",
                cfg.queue.enrich_concurrency,
                worker_id_prefix,
            ),
            rank_compute: QueueWorkerPool::spawn(
                state,
                "rank_compute",
                cfg.queue.rank_compute_concurrency,
                worker_id_prefix,
            ),
        }
    }

    pub async fn shutdown_all(self) {
        self.email_process.shutdown().await;
        self.enrich.shutdown().await;
        self.rank_compute.shutdown().await;
    }
}
