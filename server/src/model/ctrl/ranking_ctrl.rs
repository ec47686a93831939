use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, FromQueryResult, Statement};
use uuid::Uuid;

use crate::{db_core::prelude::*, error::AppResult};

pub struct RankingCtrl;

/// Everything `Ranker::rank_and_persist_with_weights` needs to score one `(user_id, link_id)`, gathered in a
/// single join across Email, YoutubeLink, VideoMetadata and User (SPEC_FULL §4.4 `RankingContext`).
#[derive(Debug, Clone, FromQueryResult)]
pub struct RankInputRow {
    pub sender_address: String,
    pub email_received_at: DateTime<Utc>,
    pub thread_reply_count: i32,
    pub video_published_at: DateTime<Utc>,
    pub video_title: String,
    pub description_keywords: serde_json::Value,
    pub preferences: serde_json::Value,
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct RankingChannelRow {
    pub link_id: Uuid,
    pub channel_id: String,
    pub ranked_at: DateTime<Utc>,
    pub final_score: f64,
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct FeedRow {
    pub link_id: Uuid,
    pub video_id: String,
    pub canonical_url: String,
    pub title: String,
    pub channel_title: String,
    pub final_score: f64,
    pub classification: Classification,
    pub explanation: String,
    pub topic_tags: serde_json::Value,
    pub ranked_at: DateTime<Utc>,
}

impl RankingCtrl {
    /// One row per `(user_id, link_id, ranked_at)`; on conflict within the same second, updates
    /// score/classification/explanation/tags in place (SPEC_FULL §4.5, §3 Ranking lifecycle).
    #[allow(clippy::too_many_arguments)]
    pub async fn upsert<C>(
        db: &C,
        id: Uuid,
        user_id: Uuid,
        link_id: Uuid,
        ranked_at: DateTime<Utc>,
        sender_score: f64,
        thread_score: f64,
        freshness_score: f64,
        topic_match_score: f64,
        noise_penalty: f64,
        final_score: f64,
        classification: Classification,
        explanation: String,
        topic_tags: Vec<String>,
    ) -> AppResult<()>
    where
        C: ConnectionTrait,
    {
        let active = ranking::ActiveModel {
            id: Set(id),
            user_id: Set(user_id),
            link_id: Set(link_id),
            ranked_at: Set(ranked_at.into()),
            sender_score: Set(sender_score),
            thread_score: Set(thread_score),
            freshness_score: Set(freshness_score),
            topic_match_score: Set(topic_match_score),
            noise_penalty: Set(noise_penalty),
            final_score: Set(final_score),
            classification: Set(classification),
            explanation: Set(explanation),
            topic_tags: Set(serde_json::json!(topic_tags)),
        };

        Ranking::insert(active)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    ranking::Column::UserId,
                    ranking::Column::LinkId,
                    ranking::Column::RankedAt,
                ])
                .update_columns([
                    ranking::Column::SenderScore,
                    ranking::Column::ThreadScore,
                    ranking::Column::FreshnessScore,
                    ranking::Column::TopicMatchScore,
                    ranking::Column::NoisePenalty,
                    ranking::Column::FinalScore,
                    ranking::Column::Classification,
                    ranking::Column::Explanation,
                    ranking::Column::TopicTags,
                ])
                .to_owned(),
            )
            .exec(db)
            .await?;

        Ok(())
    }

    /// Latest Ranking per Link for a user, joined with VideoMetadata, ordered by `final_score`
    /// desc (SPEC_FULL §6 `GET /users/:id/feed`).
    pub async fn latest_feed(
        conn: &DatabaseConnection,
        user_id: Uuid,
        limit: u64,
    ) -> AppResult<Vec<FeedRow>> {
        let stmt = Statement::from_sql_and_values(
            conn.get_database_backend(),
            r#"
            SELECT DISTINCT ON (r.link_id)
                r.link_id, l.video_id, l.canonical_url, v.title, v.channel_title,
                r.final_score, r.classification, r.explanation, r.topic_tags, r.ranked_at
            FROM rankings r
            JOIN youtube_links l ON l.id = r.link_id
            JOIN video_metadata v ON v.video_id = l.video_id
            WHERE r.user_id = $1
            ORDER BY r.link_id, r.ranked_at DESC
            "#,
            [user_id.into()],
        );

        let mut rows = FeedRow::find_by_statement(stmt).all(conn).await?;
        rows.sort_by(|a, b| b.final_score.partial_cmp(&a.final_score).unwrap());
        rows.truncate(limit as usize);

        Ok(rows)
    }

    pub async fn rankings_in_range(
        conn: &DatabaseConnection,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<ranking::Model>> {
        let rows = Ranking::find()
            .filter(ranking::Column::UserId.eq(user_id))
            .filter(ranking::Column::RankedAt.gte(start))
            .filter(ranking::Column::RankedAt.lt(end))
            .order_by_desc(ranking::Column::FinalScore)
            .order_by_desc(ranking::Column::RankedAt)
            .all(conn)
            .await?;

        Ok(rows)
    }

    /// Same range query as [`Self::rankings_in_range`], joined out to the video's channel id —
    /// used by the evaluation harness's novelty metric (SPEC_FULL §4.7).
    pub async fn rankings_in_range_with_channel(
        conn: &DatabaseConnection,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<RankingChannelRow>> {
        let stmt = Statement::from_sql_and_values(
            conn.get_database_backend(),
            r#"
            SELECT r.link_id, v.channel_id, r.ranked_at, r.final_score
            FROM rankings r
            JOIN youtube_links l ON l.id = r.link_id
            JOIN video_metadata v ON v.video_id = l.video_id
            WHERE r.user_id = $1 AND r.ranked_at >= $2 AND r.ranked_at < $3
            ORDER BY r.final_score DESC, r.ranked_at DESC
            "#,
            [user_id.into(), start.into(), end.into()],
        );

        let rows = RankingChannelRow::find_by_statement(stmt).all(conn).await?;

        Ok(rows)
    }

    /// Loads the join the rank-compute worker needs to build a `RankingContext` for one link
    /// (SPEC_FULL §4.4).
    pub async fn load_rank_input(
        conn: &DatabaseConnection,
        user_id: Uuid,
        link_id: Uuid,
    ) -> AppResult<Option<RankInputRow>> {
        let stmt = Statement::from_sql_and_values(
            conn.get_database_backend(),
            r#"
            SELECT
                e.sender_address, e.received_at AS email_received_at, e.thread_reply_count,
                v.published_at AS video_published_at, v.title AS video_title,
                v.description_keywords, u.preferences
            FROM youtube_links l
            JOIN emails e ON e.id = l.email_id
            JOIN video_metadata v ON v.video_id = l.video_id
            JOIN users u ON u.id = l.user_id
            WHERE l.id = $1 AND l.user_id = $2
            "#,
            [link_id.into(), user_id.into()],
        );

        let row = RankInputRow::find_by_statement(stmt).one(conn).await?;

        Ok(row)
    }
}
