use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{db_core::prelude::*, error::AppResult};

pub struct FeedbackCtrl;

impl FeedbackCtrl {
    pub async fn insert(
        conn: &DatabaseConnection,
        id: Uuid,
        user_id: Uuid,
        link_id: Uuid,
        ranking_id: Option<Uuid>,
        action: FeedbackAction,
        relevance_label: Option<Classification>,
    ) -> AppResult<()> {
        let active = feedback::ActiveModel {
            id: Set(id),
            user_id: Set(user_id),
            link_id: Set(link_id),
            ranking_id: Set(ranking_id),
            action: Set(action),
            relevance_label: Set(relevance_label),
            provided_at: Set(Utc::now().into()),
        };

        Feedback::insert(active).exec(conn).await?;

        Ok(())
    }

    /// Feedback in `[start, end)`, used by the evaluation harness to build the relevance map
    /// (SPEC_FULL §4.7: relevant iff action is `Watched` or label is `WatchNow`).
    pub async fn in_range(
        conn: &DatabaseConnection,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<feedback::Model>> {
        let rows = Feedback::find()
            .filter(feedback::Column::UserId.eq(user_id))
            .filter(feedback::Column::ProvidedAt.gte(start))
            .filter(feedback::Column::ProvidedAt.lt(end))
            .all(conn)
            .await?;

        Ok(rows)
    }
}
