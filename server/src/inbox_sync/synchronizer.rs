use uuid::Uuid;

use crate::{
    db_core::prelude::user,
    error::{AppError, AppResult},
    model::{ctrl::job_record_ctrl::JobRecordCtrl, ctrl::user_ctrl::UserCtrl, payloads::JobPayload},
    server_config::cfg,
    state::ServerState,
};

use super::client::InboxClient;

/// Target platform's domains, coarse pre-filter for the bounded initial sync
/// (SPEC_FULL §4.1 step 2).
const INITIAL_SYNC_FILTER: &str = "youtube.com OR youtu.be";
/// Matches the teacher's `fetch_email_ids` page-collection cap.
const INITIAL_SYNC_MAX_MESSAGES: usize = 500;

pub struct InboxSynchronizer;

impl InboxSynchronizer {
    /// Advances `user` from its stored cursor to the current head of the inbox, enqueueing one
    /// Email-Process job per newly observed message. Either the whole pass commits a new cursor
    /// or the cursor is left untouched for a clean re-run (SPEC_FULL §4.1).
    pub async fn sync_user(
        state: &ServerState,
        user: &user::Model,
        client: &dyn InboxClient,
    ) -> AppResult<()> {
        if user.needs_reauthorization {
            return Ok(());
        }

        let message_ids = match &user.sync_cursor {
            Some(cursor) => match Self::collect_history(client, cursor).await {
                Ok(ids) => ids,
                Err(AppError::Conflict(_)) => {
                    tracing::warn!(
                        user_id = %user.id,
                        "history cursor expired, falling back to bounded initial sync"
                    );
                    Self::collect_initial(client).await?
                }
                Err(e) => return Err(e),
            },
            None => Self::collect_initial(client).await?,
        };

        for message_id in &message_ids {
            JobRecordCtrl::enqueue(
                &state.conn,
                Uuid::new_v4(),
                "email_process",
                serde_json::to_value(JobPayload::EmailProcess {
                    user_id: user.id,
                    message_id: message_id.clone(),
                })?,
                Some(format!("{}:{}", user.id, message_id)),
                cfg.queue.default_max_attempts,
            )
            .await?;
        }

        let profile = client.get_profile().await?;
        UserCtrl::advance_sync_cursor(&state.conn, user.id, profile.history_id).await?;

        Ok(())
    }

    async fn collect_history(client: &dyn InboxClient, cursor: &str) -> AppResult<Vec<String>> {
        let mut message_ids = Vec::new();
        let mut page_token = None;

        loop {
            let page = client.list_history(cursor, page_token).await?;
            message_ids.extend(page.message_ids);
            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        Ok(message_ids)
    }

    async fn collect_initial(client: &dyn InboxClient) -> AppResult<Vec<String>> {
        let mut message_ids = Vec::new();
        let mut page_token = None;

        loop {
            let page = client
                .list_messages(INITIAL_SYNC_FILTER, page_token)
                .await?;
            message_ids.extend(page.message_ids);
            page_token = page.next_page_token;
            if page_token.is_none() || message_ids.len() >= INITIAL_SYNC_MAX_MESSAGES {
                break;
            }
        }

        message_ids.truncate(INITIAL_SYNC_MAX_MESSAGES);

        Ok(message_ids)
    }
}
