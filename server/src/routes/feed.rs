use axum::{extract::{Path, Query, State}, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::AppJsonResult,
    model::api::{FeedItem, FeedResponse},
    model::ctrl::ranking_ctrl::RankingCtrl,
    state::ServerState,
};

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 {
    20
}

/// `GET /users/:id/feed?limit=` — latest Ranking per Link, joined with VideoMetadata, ordered
/// by `final_score` desc (SPEC_FULL §6).
pub async fn handler_feed(
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<FeedQuery>,
) -> AppJsonResult<FeedResponse> {
    let rows = RankingCtrl::latest_feed(&state.conn, user_id, query.limit).await?;

    let items = rows
        .into_iter()
        .map(|row| FeedItem {
            link_id: row.link_id,
            video_id: row.video_id,
            canonical_url: row.canonical_url,
            title: row.title,
            channel_title: row.channel_title,
            final_score: row.final_score,
            classification: row.classification,
            explanation: row.explanation,
            topic_tags: serde_json::from_value(row.topic_tags).unwrap_or_default(),
            ranked_at: row.ranked_at,
        })
        .collect();

    Ok(Json(FeedResponse { items }))
}
