use uuid::Uuid;

use crate::{
    email_proc::processor::EmailProcessor,
    error::{AppError, AppResult},
    inbox_sync::{client::GmailInboxClient, client::InboxClient},
    model::{ctrl::user_ctrl::UserCtrl, ctrl::youtube_link_ctrl::YoutubeLinkCtrl, payloads::JobPayload},
    ranking::Ranker,
    server_config::cfg,
    state::ServerState,
};

/// Runs one job's handler to completion. Idempotent per SPEC_FULL §4.2/§4.3/§4.5 — the queue's
/// at-least-once delivery relies on every branch here being safe to repeat.
pub async fn dispatch(state: &ServerState, payload: JobPayload) -> AppResult<()> {
    match payload {
        JobPayload::EmailProcess { user_id, message_id } => {
            dispatch_email_process(state, user_id, &message_id).await
        }
        JobPayload::Enrich { video_ids } => dispatch_enrich(state, video_ids).await,
        JobPayload::RankCompute { user_id, link_id } => {
            Ranker::rank_and_persist_by_link(&state.conn, user_id, link_id).await
        }
    }
}

async fn dispatch_email_process(
    state: &ServerState,
    user_id: Uuid,
    message_id: &str,
) -> AppResult<()> {
    let user = UserCtrl::get_by_id(&state.conn, user_id).await?;
    if user.needs_reauthorization {
        return Ok(());
    }

    let Some(access_token) = state
        .inbox_credentials
        .resolve_access_token(&state.conn, &user)
        .await?
    else {
        return Ok(());
    };

    let client = GmailInboxClient::new(state.http_client.clone(), access_token);
    EmailProcessor::process(&state.conn, &client as &dyn InboxClient, user_id, message_id).await
}

/// Fetches metadata for every video id in the batch, then fans each newly-enriched video out
/// into one Rank-Compute job per link pointing at it (SPEC_FULL §5 per-link ordering).
async fn dispatch_enrich(state: &ServerState, video_ids: Vec<String>) -> AppResult<()> {
    if video_ids.is_empty() {
        return Err(AppError::BadRequest("enrich job with no video ids".into()));
    }

    state
        .youtube_client
        .get_metadata(&state.conn, &video_ids)
        .await?;

    for video_id in &video_ids {
        let links = YoutubeLinkCtrl::links_by_video_id(&state.conn, video_id).await?;
        for (user_id, link_id) in links {
            crate::model::ctrl::job_record_ctrl::JobRecordCtrl::enqueue(
                &state.conn,
                Uuid::new_v4(),
                "rank_compute",
                serde_json::to_value(JobPayload::RankCompute { user_id, link_id })?,
                Some(format!("{user_id}:{link_id}")),
                cfg.queue.default_max_attempts,
            )
            .await?;
        }
    }

    Ok(())
}
