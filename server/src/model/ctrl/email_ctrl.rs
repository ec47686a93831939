use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use uuid::Uuid;

use crate::{db_core::prelude::*, error::AppResult};

pub struct EmailCtrl;

impl EmailCtrl {
    pub async fn find_existing(
        conn: &DatabaseConnection,
        user_id: Uuid,
        external_message_id: &str,
    ) -> AppResult<Option<email::Model>> {
        let row = Email::find()
            .filter(email::Column::UserId.eq(user_id))
            .filter(email::Column::ExternalMessageId.eq(external_message_id))
            .one(conn)
            .await?;

        Ok(row)
    }

    /// Idempotent insert: `ON CONFLICT DO NOTHING` on `(user_id, external_message_id)`
    /// (SPEC_FULL §3 Email invariant). Returns the row regardless of whether this call created it.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_idempotent<C>(
        db: &C,
        id: Uuid,
        user_id: Uuid,
        external_message_id: String,
        thread_id: String,
        sender_address: String,
        sender_display_name: Option<String>,
        subject: Option<String>,
        received_at: DateTime<Utc>,
        preview_snippet: String,
        labels: Vec<String>,
        thread_reply_count: i32,
        is_thread_reply: bool,
    ) -> AppResult<email::Model>
    where
        C: sea_orm::ConnectionTrait,
    {
        let active = email::ActiveModel {
            id: Set(id),
            user_id: Set(user_id),
            external_message_id: Set(external_message_id.clone()),
            thread_id: Set(thread_id),
            sender_address: Set(sender_address),
            sender_display_name: Set(sender_display_name),
            subject: Set(subject),
            received_at: Set(received_at.into()),
            preview_snippet: Set(preview_snippet.chars().take(200).collect()),
            labels: Set(serde_json::json!(labels)),
            thread_reply_count: Set(thread_reply_count),
            is_thread_reply: Set(is_thread_reply),
            created_at: Set(Utc::now().into()),
        };

        Email::insert(active)
            .on_conflict(
                OnConflict::columns([email::Column::UserId, email::Column::ExternalMessageId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;

        let row = Email::find()
            .filter(email::Column::UserId.eq(user_id))
            .filter(email::Column::ExternalMessageId.eq(external_message_id))
            .one(db)
            .await?
            .ok_or_else(|| {
                crate::error::AppError::Internal(anyhow::anyhow!(
                    "email row missing immediately after upsert"
                ))
            })?;

        Ok(row)
    }
}
