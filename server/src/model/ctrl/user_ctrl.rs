use anyhow::Context;
use chrono::Utc;
use uuid::Uuid;

use crate::{db_core::prelude::*, error::AppResult};

pub struct UserCtrl;

impl UserCtrl {
    pub async fn get_by_id(conn: &DatabaseConnection, user_id: Uuid) -> AppResult<user::Model> {
        User::find_by_id(user_id)
            .one(conn)
            .await
            .context("Error fetching user by id")?
            .ok_or_else(|| crate::error::AppError::NotFound("User not found".to_string()))
            .map_err(Into::into)
    }

    pub async fn get_all_syncable(conn: &DatabaseConnection) -> AppResult<Vec<user::Model>> {
        let users = User::find()
            .filter(user::Column::NeedsReauthorization.eq(false))
            .all(conn)
            .await?;

        Ok(users)
    }

    /// Persists the new change cursor. Called only after a sync pass fully enqueues its page
    /// of Email-Process jobs (SPEC_FULL §4.1: "either the whole listing pass commits a new
    /// cursor, or the cursor remains unchanged").
    pub async fn advance_sync_cursor(
        conn: &DatabaseConnection,
        user_id: Uuid,
        cursor: String,
    ) -> AppResult<()> {
        user::ActiveModel {
            id: Set(user_id),
            sync_cursor: Set(Some(cursor)),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .update(conn)
        .await?;

        Ok(())
    }

    /// Persists a refreshed access token (and its new expiry) after a successful credential
    /// refresh (SPEC_FULL §4.1 step 1, `InboxCredentials`).
    pub async fn update_access_token(
        conn: &DatabaseConnection,
        user_id: Uuid,
        encrypted_access_token: String,
        expires_at: chrono::DateTime<Utc>,
    ) -> AppResult<()> {
        user::ActiveModel {
            id: Set(user_id),
            access_token: Set(encrypted_access_token),
            token_expires_at: Set(expires_at.into()),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .update(conn)
        .await?;

        Ok(())
    }

    pub async fn mark_needs_reauthorization(
        conn: &DatabaseConnection,
        user_id: Uuid,
    ) -> AppResult<()> {
        user::ActiveModel {
            id: Set(user_id),
            needs_reauthorization: Set(true),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .update(conn)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore]
    async fn get_by_id_returns_not_found_for_unknown_user() {
        let conn = crate::db_core::test::setup_conn().await;
        let result = UserCtrl::get_by_id(&conn, Uuid::new_v4()).await;
        assert!(result.is_err());
    }
}
