use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, Statement};
use uuid::Uuid;

use crate::{db_core::prelude::*, error::AppResult};

pub struct SenderStatsCtrl;

impl SenderStatsCtrl {
    pub async fn get<C>(
        db: &C,
        user_id: Uuid,
        sender_address: &str,
    ) -> AppResult<Option<sender_stats::Model>>
    where
        C: ConnectionTrait,
    {
        let row = SenderStats::find()
            .filter(sender_stats::Column::UserId.eq(user_id))
            .filter(sender_stats::Column::SenderAddress.eq(sender_address))
            .one(db)
            .await?;

        Ok(row)
    }

    /// `email_count ← email_count + 1`, `last_email_at ← max(existing, received_at)`
    /// (SPEC_FULL §3 SenderStats invariant). Raw SQL upsert since sea-orm's `OnConflict`
    /// builder cannot express `GREATEST(...)` in the update clause.
    pub async fn upsert_on_new_email<C>(
        db: &C,
        id: Uuid,
        user_id: Uuid,
        sender_address: &str,
        received_at: DateTime<Utc>,
    ) -> AppResult<()>
    where
        C: ConnectionTrait,
    {
        let backend = db.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            r#"
            INSERT INTO sender_stats (id, user_id, sender_address, email_count, last_email_at, in_contacts, updated_at)
            VALUES ($1, $2, $3, 1, $4, false, now())
            ON CONFLICT (user_id, sender_address) DO UPDATE
            SET email_count = sender_stats.email_count + 1,
                last_email_at = GREATEST(sender_stats.last_email_at, EXCLUDED.last_email_at),
                updated_at = now()
            "#,
            [
                id.into(),
                user_id.into(),
                sender_address.into(),
                received_at.into(),
            ],
        );

        db.execute(stmt).await?;

        Ok(())
    }
}
